//! UploadThing credential derivation.
//!
//! The provider token is base64-encoded JSON carrying `apiKey` and `appId`.
//! Tokens copied from different dashboards and CI systems disagree on padding
//! and alphabet, so every common base64 flavour is tried in turn.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use serde::Deserialize;

use super::error::StorageError;

/// Credentials decoded from an UploadThing token.
///
/// Immutable once built and shared read-only by every request.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadThingCredentials {
    api_key: String,
    app_id: String,
}

impl std::fmt::Debug for UploadThingCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadThingCredentials")
            .field("api_key", &"[hidden]")
            .field("app_id", &self.app_id)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPayload {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    app_id: String,
}

impl UploadThingCredentials {
    /// Build credentials from already-known values.
    #[must_use]
    pub fn new(api_key: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_id: app_id.into(),
        }
    }

    /// Decode an opaque provider token.
    ///
    /// Tries standard, unpadded standard, url-safe and unpadded url-safe
    /// alphabets in that order. The first variant that decodes into JSON with a
    /// non-empty `apiKey` and `appId` wins.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] when no variant yields both fields.
    pub fn from_token(token: &str) -> Result<Self, StorageError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(StorageError::configuration("UPLOADTHING_TOKEN is required"));
        }

        let engines = [&STANDARD, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD];

        let mut last_err = String::from("no decoding variant matched");
        for engine in engines {
            let decoded = match engine.decode(token) {
                Ok(bytes) => bytes,
                Err(e) => {
                    last_err = e.to_string();
                    continue;
                }
            };
            let payload: TokenPayload = match serde_json::from_slice(&decoded) {
                Ok(payload) => payload,
                Err(e) => {
                    last_err = e.to_string();
                    continue;
                }
            };
            let api_key = payload.api_key.trim();
            let app_id = payload.app_id.trim();
            if api_key.is_empty() || app_id.is_empty() {
                last_err = "missing UploadThing credentials (apiKey/appId)".to_string();
                continue;
            }
            return Ok(Self::new(api_key, app_id));
        }

        Err(StorageError::configuration(format!(
            "failed to decode UPLOADTHING_TOKEN: {last_err}"
        )))
    }

    /// Provider API key, sent on every request.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Provider application id, used to build public URLs.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PAYLOAD: &str = r#"{"apiKey":"sk_live_abc","appId":"app123","regions":["sea1"]}"#;

    #[rstest]
    #[case(STANDARD.encode(PAYLOAD))]
    #[case(STANDARD_NO_PAD.encode(PAYLOAD))]
    #[case(URL_SAFE.encode(PAYLOAD))]
    #[case(URL_SAFE_NO_PAD.encode(PAYLOAD))]
    fn test_decodes_every_variant(#[case] token: String) {
        let creds = UploadThingCredentials::from_token(&token).unwrap();
        assert_eq!(creds.api_key(), "sk_live_abc");
        assert_eq!(creds.app_id(), "app123");
    }

    #[test]
    fn test_url_alphabet_token() {
        let payload = r#"{"apiKey":"k???","appId":"a"}"#;
        let token = URL_SAFE_NO_PAD.encode(payload);
        assert!(token.contains('_'));
        let creds = UploadThingCredentials::from_token(&token).unwrap();
        assert_eq!(creds.api_key(), "k???");
    }

    #[test]
    fn test_missing_app_id_rejected() {
        let token = STANDARD.encode(r#"{"apiKey":"sk_live_abc"}"#);
        let err = UploadThingCredentials::from_token(&token).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = UploadThingCredentials::from_token("%%%not-base64%%%").unwrap_err();
        assert!(err.to_string().contains("failed to decode UPLOADTHING_TOKEN"));
    }

    #[test]
    fn test_non_json_rejected() {
        let token = STANDARD.encode("plain text");
        assert!(UploadThingCredentials::from_token(&token).is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(UploadThingCredentials::from_token("   ").is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let creds = UploadThingCredentials::new("secret-key", "app");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("app"));
    }
}
