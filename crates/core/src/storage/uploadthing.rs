//! UploadThing object store client.
//!
//! Uploads are a two-step exchange: `POST /v7/prepareUpload` negotiates a
//! short-lived target and file key, then the bytes are sent to that target as
//! a single multipart `PUT`. Neither step is retried here; a failed upload
//! has to be restarted from the beginning by the caller.
//!
//! Deletion tries `/v6/deleteFiles` first and falls back to `/v7/deleteFiles`,
//! since accounts on older API versions only accept the former.

use std::time::Duration;

use callflow_shared::StorageSettings;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::credentials::UploadThingCredentials;
use super::error::StorageError;
use super::sanitize::sanitize_filename;
use super::store::UploadedImage;

const API_KEY_HEADER: &str = "x-uploadthing-api-key";
const PREPARE_UPLOAD_PATH: &str = "/v7/prepareUpload";
const DELETE_FILES_PATHS: [&str; 2] = ["/v6/deleteFiles", "/v7/deleteFiles"];
const OCTET_STREAM: &str = "application/octet-stream";

/// Endpoint and timeout settings for [`UploadThingClient`].
#[derive(Debug, Clone)]
pub struct UploadThingConfig {
    /// API root, e.g. `https://api.uploadthing.com`.
    pub api_root: String,
    /// CDN domain for public URLs, e.g. `ufs.sh`.
    pub cdn_domain: String,
    /// Timeout for each outbound request.
    pub timeout: Duration,
}

impl From<&StorageSettings> for UploadThingConfig {
    fn from(settings: &StorageSettings) -> Self {
        Self {
            api_root: settings.api_root.trim_end_matches('/').to_string(),
            cdn_domain: settings.cdn_domain.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrepareUploadRequest<'a> {
    file_name: &'a str,
    file_size: usize,
    #[serde(skip_serializing_if = "str::is_empty")]
    file_type: &'a str,
}

#[derive(Deserialize)]
struct PrepareUploadResponse {
    #[serde(default)]
    url: String,
    #[serde(default)]
    key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteFilesRequest<'a> {
    file_keys: [&'a str; 1],
    keys: [&'a str; 1],
    key_type: &'static str,
}

/// Negotiated upload target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpload {
    /// Address the bytes must be sent to.
    pub url: String,
    /// Provider file key for the object.
    pub key: String,
}

/// HTTP client for the UploadThing REST API.
#[derive(Debug, Clone)]
pub struct UploadThingClient {
    credentials: UploadThingCredentials,
    config: UploadThingConfig,
    http: reqwest::Client,
}

impl UploadThingClient {
    /// Create a client from decoded credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        credentials: UploadThingCredentials,
        config: UploadThingConfig,
    ) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            credentials,
            config,
            http,
        })
    }

    /// Create a client from storage settings.
    ///
    /// Returns `Ok(None)` when no token is configured.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] when a token is present but
    /// cannot be decoded.
    pub fn from_settings(settings: &StorageSettings) -> Result<Option<Self>, StorageError> {
        let Some(token) = settings.resolved_token() else {
            return Ok(None);
        };
        let credentials = UploadThingCredentials::from_token(&token)?;
        Self::new(credentials, UploadThingConfig::from(settings)).map(Some)
    }

    /// Public address of a stored object.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.{}/f/{key}",
            self.credentials.app_id(),
            self.config.cdn_domain
        )
    }

    /// Upload an image: negotiate a target, then transfer the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyFile`] for an empty payload, or the error
    /// of whichever step failed.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyFile);
        }

        let file_name = sanitize_filename(filename);
        let prepared = self
            .prepare_upload(&file_name, content_type, bytes.len())
            .await?;
        debug!(key = %prepared.key, file_name = %file_name, "upload target negotiated");

        self.put_file(&prepared.url, &file_name, content_type, bytes)
            .await?;

        Ok(UploadedImage {
            url: self.public_url(&prepared.key),
            key: prepared.key,
        })
    }

    /// Request a short-lived upload target for a file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::RequestFailed`] on a non-2xx response and
    /// [`StorageError::Protocol`] when the body lacks `url` or `key`.
    pub async fn prepare_upload(
        &self,
        file_name: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<PreparedUpload, StorageError> {
        let body = PrepareUploadRequest {
            file_name,
            file_size,
            file_type: content_type.trim(),
        };

        let response = self
            .http
            .post(self.endpoint(PREPARE_UPLOAD_PATH))
            .header(API_KEY_HEADER, self.credentials.api_key())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(StorageError::request_failed("prepare", status.to_string(), &text));
        }

        let prepared: PrepareUploadResponse = serde_json::from_str(&text).map_err(|e| {
            StorageError::protocol(format!("prepare response could not be parsed: {e}"))
        })?;
        if prepared.url.is_empty() || prepared.key.is_empty() {
            return Err(StorageError::protocol("prepare response missing url/key"));
        }

        Ok(PreparedUpload {
            url: prepared.url,
            key: prepared.key,
        })
    }

    /// Send the file to a negotiated target as one multipart part named `file`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::RequestFailed`] on a non-2xx response.
    pub async fn put_file(
        &self,
        target: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        let content_type = match content_type.trim() {
            "" => OCTET_STREAM,
            other => other,
        };
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .put(target)
            .header(API_KEY_HEADER, self.credentials.api_key())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(StorageError::request_failed("upload", status.to_string(), &text))
    }

    /// Delete a stored object by file key.
    ///
    /// A blank key is a no-op. Each versioned endpoint is tried in order and
    /// the first 2xx wins; the last failure is returned if none succeed.
    ///
    /// # Errors
    ///
    /// Returns the error from the last endpoint attempted.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(());
        }

        let body = DeleteFilesRequest {
            file_keys: [key],
            keys: [key],
            key_type: "fileKey",
        };

        let mut last_err = None;
        for path in DELETE_FILES_PATHS {
            match self.try_delete(path, &body).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(path, image_key = %key, error = %e, "delete attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| StorageError::protocol("delete failed")))
    }

    async fn try_delete(
        &self,
        path: &str,
        body: &DeleteFilesRequest<'_>,
    ) -> Result<(), StorageError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .header(API_KEY_HEADER, self.credentials.api_key())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            return Ok(());
        }
        Err(StorageError::request_failed("delete", status.to_string(), &text))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_root)
    }
}
