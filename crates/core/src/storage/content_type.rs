//! Size and type gate applied to landing images before they reach the store.

use super::error::StorageError;

/// Largest accepted image: 5 MiB.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Content types accepted for landing images.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

const OCTET_STREAM: &str = "application/octet-stream";

/// Determine the content type of an uploaded image.
///
/// The declared header (parameters after `;` ignored) is trusted only when it
/// is itself one of [`ALLOWED_IMAGE_TYPES`]. Otherwise the type is sniffed
/// from the leading bytes.
#[must_use]
pub fn detect_image_content_type(declared: &str, bytes: &[u8]) -> &'static str {
    let declared = declared.split(';').next().unwrap_or_default().trim();
    if let Some(allowed) = ALLOWED_IMAGE_TYPES
        .iter()
        .find(|t| t.eq_ignore_ascii_case(declared))
    {
        return *allowed;
    }
    sniff(bytes)
}

fn sniff(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else {
        OCTET_STREAM
    }
}

/// Check an uploaded image against the size and type limits.
///
/// Returns the content type to forward to the store.
///
/// # Errors
///
/// Returns [`StorageError::EmptyFile`], [`StorageError::FileTooLarge`] or
/// [`StorageError::InvalidMimeType`].
pub fn validate_image(declared: &str, bytes: &[u8]) -> Result<&'static str, StorageError> {
    if bytes.is_empty() {
        return Err(StorageError::EmptyFile);
    }

    let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    if size > MAX_IMAGE_BYTES {
        return Err(StorageError::file_too_large(size, MAX_IMAGE_BYTES));
    }

    let content_type = detect_image_content_type(declared, bytes);
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(StorageError::invalid_mime_type(content_type));
    }

    Ok(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";

    #[rstest]
    #[case("image/png", b"anything", "image/png")]
    #[case("image/jpeg; charset=binary", b"anything", "image/jpeg")]
    #[case("IMAGE/WEBP", b"anything", "image/webp")]
    #[case("", PNG, "image/png")]
    #[case("application/octet-stream", JPEG, "image/jpeg")]
    #[case("text/plain", WEBP, "image/webp")]
    #[case("", b"GIF89a....", "image/gif")]
    #[case("", b"hello", "application/octet-stream")]
    fn test_detect_content_type(
        #[case] declared: &str,
        #[case] bytes: &[u8],
        #[case] expected: &str,
    ) {
        assert_eq!(detect_image_content_type(declared, bytes), expected);
    }

    #[test]
    fn test_validate_accepts_sniffed_png() {
        assert_eq!(validate_image("", PNG).unwrap(), "image/png");
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(matches!(validate_image("image/png", &[]), Err(StorageError::EmptyFile)));
    }

    #[test]
    fn test_validate_rejects_gif() {
        let err = validate_image("image/gif", b"GIF89a....").unwrap_err();
        assert!(matches!(err, StorageError::InvalidMimeType { mime_type } if mime_type == "image/gif"));
    }

    #[test]
    fn test_validate_size_limit() {
        let mut at_limit = PNG.to_vec();
        at_limit.resize(usize::try_from(MAX_IMAGE_BYTES).unwrap(), 0);
        assert!(validate_image("image/png", &at_limit).is_ok());

        at_limit.push(0);
        assert!(matches!(
            validate_image("image/png", &at_limit),
            Err(StorageError::FileTooLarge { max: MAX_IMAGE_BYTES, .. })
        ));
    }
}
