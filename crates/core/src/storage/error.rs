//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No image store is configured for this process.
    #[error("image upload is not configured")]
    UploadDisabled,

    /// Upload payload was empty.
    #[error("empty file")]
    EmptyFile,

    /// File size exceeds maximum allowed.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// MIME type not allowed.
    #[error("MIME type '{mime_type}' is not allowed")]
    InvalidMimeType {
        /// The rejected MIME type.
        mime_type: String,
    },

    /// Provider credentials could not be derived from configuration.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Provider answered with a body this client cannot use.
    #[error("storage protocol error: {0}")]
    Protocol(String),

    /// Provider answered outside the 2xx range.
    #[error("{operation} failed ({status}): {body}")]
    RequestFailed {
        /// Operation that failed (`prepare`, `upload`, `delete`).
        operation: &'static str,
        /// Status line returned by the provider.
        status: String,
        /// Trimmed response body.
        body: String,
    },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("storage request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl StorageError {
    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create an invalid MIME type error.
    #[must_use]
    pub fn invalid_mime_type(mime_type: impl Into<String>) -> Self {
        Self::InvalidMimeType {
            mime_type: mime_type.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a protocol error.
    #[must_use]
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a request failure from a non-2xx provider response.
    #[must_use]
    pub fn request_failed(
        operation: &'static str,
        status: impl Into<String>,
        body: &str,
    ) -> Self {
        Self::RequestFailed {
            operation,
            status: status.into(),
            body: body.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_trims_body() {
        let err = StorageError::request_failed("delete", "404 Not Found", "  missing \n");
        assert_eq!(err.to_string(), "delete failed (404 Not Found): missing");
    }

    #[test]
    fn test_upload_disabled_message() {
        assert_eq!(
            StorageError::UploadDisabled.to_string(),
            "image upload is not configured"
        );
    }
}
