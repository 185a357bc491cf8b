//! Landing error types.

use callflow_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Landing operation errors.
#[derive(Debug, Error)]
pub enum LandingError {
    /// No landing page saved for this owner.
    #[error("landing page not found for user {0}")]
    NotFound(Uuid),

    /// Image URL is not an absolute https URL with a host.
    #[error("image_url must be a valid https URL")]
    InvalidImageUrl,

    /// A new or changed image URL arrived without its storage key.
    #[error("image_key is required when image_url is set")]
    MissingImageKey,

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl LandingError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Whether the caller sent bad image metadata.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidImageUrl | Self::MissingImageKey)
    }
}

impl From<LandingError> for AppError {
    fn from(err: LandingError) -> Self {
        match err {
            LandingError::NotFound(_) => Self::NotFound(err.to_string()),
            LandingError::InvalidImageUrl | LandingError::MissingImageKey => {
                Self::Validation(err.to_string())
            }
            LandingError::Storage(StorageError::UploadDisabled) => {
                Self::ServiceUnavailable("image upload is not configured".to_string())
            }
            LandingError::Storage(
                ref e @ (StorageError::EmptyFile
                | StorageError::FileTooLarge { .. }
                | StorageError::InvalidMimeType { .. }),
            ) => Self::Validation(e.to_string()),
            LandingError::Storage(StorageError::Configuration(msg)) => Self::Internal(msg),
            LandingError::Storage(e) => Self::ExternalService(e.to_string()),
            LandingError::Repository(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LandingError::NotFound(Uuid::nil()), 404)]
    #[case(LandingError::InvalidImageUrl, 400)]
    #[case(LandingError::MissingImageKey, 400)]
    #[case(LandingError::Storage(StorageError::UploadDisabled), 503)]
    #[case(LandingError::Storage(StorageError::EmptyFile), 400)]
    #[case(LandingError::Storage(StorageError::invalid_mime_type("text/plain")), 400)]
    #[case(LandingError::Storage(StorageError::protocol("missing url")), 500)]
    #[case(LandingError::repository("connection reset"), 500)]
    fn test_app_error_status(#[case] err: LandingError, #[case] status: u16) {
        assert_eq!(AppError::from(err).status_code(), status);
    }

    #[test]
    fn test_validation_message_is_kept() {
        let app = AppError::from(LandingError::MissingImageKey);
        assert_eq!(
            app.to_string(),
            "Validation error: image_key is required when image_url is set"
        );
    }
}
