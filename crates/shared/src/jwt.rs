//! Access token verification.
//!
//! Tokens are minted by the account service; this crate only checks the
//! signature and expiry and reads the owner out of `sub`.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use thiserror::Error;

use crate::auth::Claims;

/// Token verification errors.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signature valid but `exp` is in the past.
    #[error("token has expired")]
    Expired,

    /// Malformed, wrongly signed, or missing required claims.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// Signing a token failed.
    #[cfg(any(test, feature = "test-util"))]
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// HS256 bearer token verifier.
#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
    #[cfg(any(test, feature = "test-util"))]
    encoding_key: jsonwebtoken::EncodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("leeway_secs", &self.validation.leeway)
            .field("secret", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Creates a verifier for tokens signed with `secret`.
    ///
    /// `leeway_secs` is the clock skew tolerated on `exp`.
    #[must_use]
    pub fn new(secret: &str, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            #[cfg(any(test, feature = "test-util"))]
            encoding_key: jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` for an expired token and
    /// `JwtError::Invalid` for anything else that fails verification.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }

    /// Signs a token for `user_id` valid for `ttl`. Test fixtures only.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Signing` if encoding fails.
    #[cfg(any(test, feature = "test-util"))]
    pub fn issue_token(&self, user_id: uuid::Uuid, ttl: chrono::Duration) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, chrono::Utc::now() + ttl);
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| JwtError::Signing(e.to_string()))
    }
}
