//! Filename sanitization for outgoing multipart requests.

/// Name used when nothing usable survives sanitization.
pub const DEFAULT_FILENAME: &str = "image.jpg";

/// Sanitize a client-supplied filename before it reaches the provider.
///
/// Keeps only the last path component, replaces everything outside
/// `[A-Za-z0-9._-]` with `_`, and strips leading/trailing `.`, `_` and `-`.
/// Falls back to [`DEFAULT_FILENAME`] when the result is empty. The output is
/// safe to embed in a `Content-Disposition` header.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches(['/', '\\']);
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or_default().trim();

    let replaced: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let out = replaced.trim_matches(['.', '_', '-']);
    if out.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        out.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.png", "photo.png")]
    #[case("my photo (1).jpg", "my_photo__1_.jpg")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\Users\\me\\hero.webp", "hero.webp")]
    #[case("uploads/dir/", "dir")]
    #[case("日本語.png", "png")]
    #[case("\"evil\"\r\nX-Injected: 1.png", "evil___X-Injected__1.png")]
    #[case("...", DEFAULT_FILENAME)]
    #[case("", DEFAULT_FILENAME)]
    #[case("/", DEFAULT_FILENAME)]
    #[case("   ", DEFAULT_FILENAME)]
    fn test_sanitize_filename(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(input), expected);
    }
}
