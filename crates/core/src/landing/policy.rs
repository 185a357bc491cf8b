//! Reconciliation policy for landing updates.
//!
//! Pure functions: no I/O, so every rule here is covered by property tests.

use url::Url;

use super::error::LandingError;
use super::types::{LandingContent, LandingUpsert};

/// Merge a partial update into the stored content and validate the result.
///
/// Image rules, in order:
/// 1. An unchanged `image_url` with no `image_key` supplied keeps the stored key.
/// 2. No `image_url` means no `image_key`, whatever was sent.
/// 3. A new or changed `image_url` must come with a key.
///
/// `existing` is `None` when the owner has never saved a page.
///
/// # Errors
///
/// Returns [`LandingError::InvalidImageUrl`] or [`LandingError::MissingImageKey`].
pub fn resolve_content(
    existing: Option<&LandingContent>,
    update: LandingUpsert,
) -> Result<LandingContent, LandingError> {
    let update = update.normalized();
    let base = existing.cloned().unwrap_or_default();
    let old_url = existing.and_then(|c| c.image_url.as_deref());

    let supplied_key = update.image_key.as_set().cloned();
    let image_url = update.image_url.apply(base.image_url);
    let image_key = match image_url.as_deref() {
        None => None,
        Some(url) if old_url == Some(url) => supplied_key.or(base.image_key),
        Some(_) => supplied_key,
    };

    if let Some(url) = image_url.as_deref() {
        validate_image_url(url)?;
        if requires_image_key(old_url, url) && image_key.is_none() {
            return Err(LandingError::MissingImageKey);
        }
    }

    Ok(LandingContent {
        headline: update.headline.apply(base.headline),
        description: update.description.apply(base.description),
        image_url,
        image_key,
        whatsapp_url: update.whatsapp_url.apply(base.whatsapp_url),
        facebook_url: update.facebook_url.apply(base.facebook_url),
        instagram_url: update.instagram_url.apply(base.instagram_url),
        youtube_url: update.youtube_url.apply(base.youtube_url),
        email: update.email.apply(base.email),
        website_url: update.website_url.apply(base.website_url),
    })
}

/// A new image (no previous URL, or a different one) must ship with a fresh key.
fn requires_image_key(old_url: Option<&str>, new_url: &str) -> bool {
    old_url != Some(new_url)
}

/// Check that an image URL is absolute, uses https, and names a host.
///
/// # Errors
///
/// Returns [`LandingError::InvalidImageUrl`] otherwise.
pub fn validate_image_url(raw: &str) -> Result<(), LandingError> {
    // The WHATWG parser invents a host for `https:a.png` and friends, so the
    // stored string itself must carry `https://host`.
    if raw_authority_host(raw).is_none_or(str::is_empty) {
        return Err(LandingError::InvalidImageUrl);
    }
    let parsed = Url::parse(raw).map_err(|_| LandingError::InvalidImageUrl)?;
    let has_host = parsed.host_str().is_some_and(|h| !h.is_empty());
    if parsed.scheme() == "https" && has_host {
        Ok(())
    } else {
        Err(LandingError::InvalidImageUrl)
    }
}

/// Host written between `https://` and the first `/`, `?` or `#`, without
/// userinfo or port. `None` if the string does not start with `https://`.
fn raw_authority_host(raw: &str) -> Option<&str> {
    const PREFIX: &str = "https://";
    let (scheme, rest) = raw.split_at_checked(PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = if host_port.starts_with('[') {
        host_port.split_inclusive(']').next().unwrap_or_default()
    } else {
        host_port.split(':').next().unwrap_or_default()
    };
    Some(host)
}

/// Whether the previously stored image is orphaned by the update.
#[must_use]
pub fn should_delete_old_image(old_key: Option<&str>, new_key: Option<&str>) -> bool {
    match (old_key, new_key) {
        (None, _) => false,
        (Some(old), _) if old.is_empty() => false,
        (Some(_), None) => true,
        (Some(_), Some(new)) if new.is_empty() => true,
        (Some(old), Some(new)) => old != new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landing::Patch;
    use rstest::rstest;

    const A: &str = "https://cdn.example/a.png";
    const B: &str = "https://cdn.example/b.png";

    fn stored(url: Option<&str>, key: Option<&str>) -> LandingContent {
        LandingContent {
            headline: Some("old headline".to_string()),
            image_url: url.map(String::from),
            image_key: key.map(String::from),
            ..LandingContent::default()
        }
    }

    fn image_update(url: Patch<&str>, key: Patch<&str>) -> LandingUpsert {
        let own = |p: Patch<&str>| match p {
            Patch::Keep => Patch::Keep,
            Patch::Clear => Patch::Clear,
            Patch::Set(v) => Patch::Set(v.to_string()),
        };
        LandingUpsert {
            image_url: own(url),
            image_key: own(key),
            ..LandingUpsert::default()
        }
    }

    /// (old url, old key, new url, new key) => (resulting key, old key deleted?)
    #[rstest]
    #[case::same_url_no_key(Some(A), Some("k1"), Patch::Set(A), Patch::Keep, Some("k1"), false)]
    #[case::same_url_null_key(Some(A), Some("k1"), Patch::Set(A), Patch::Clear, Some("k1"), false)]
    #[case::same_url_new_key(Some(A), Some("k1"), Patch::Set(A), Patch::Set("k2"), Some("k2"), true)]
    #[case::cleared_url(Some(A), Some("k1"), Patch::Clear, Patch::Set("k9"), None, true)]
    #[case::blank_url(Some(A), Some("k1"), Patch::Set("   "), Patch::Keep, None, true)]
    #[case::changed_url_new_key(Some(A), Some("k1"), Patch::Set(B), Patch::Set("k2"), Some("k2"), true)]
    #[case::first_image(None, None, Patch::Set(A), Patch::Set("k1"), Some("k1"), false)]
    #[case::omitted_url(Some(A), Some("k1"), Patch::Keep, Patch::Keep, Some("k1"), false)]
    fn test_policy_table(
        #[case] old_url: Option<&str>,
        #[case] old_key: Option<&str>,
        #[case] new_url: Patch<&str>,
        #[case] new_key: Patch<&str>,
        #[case] expected_key: Option<&str>,
        #[case] deleted: bool,
    ) {
        let existing = stored(old_url, old_key);
        let content = resolve_content(Some(&existing), image_update(new_url, new_key)).unwrap();

        assert_eq!(content.image_key.as_deref(), expected_key);
        assert_eq!(
            should_delete_old_image(old_key, content.image_key.as_deref()),
            deleted
        );
        assert_eq!(content.headline.as_deref(), Some("old headline"));
    }

    #[rstest]
    #[case::changed_url(Some(A), Some("k1"), B)]
    #[case::no_previous_url(None, None, A)]
    fn test_new_image_requires_key(
        #[case] old_url: Option<&str>,
        #[case] old_key: Option<&str>,
        #[case] new_url: &str,
    ) {
        let existing = stored(old_url, old_key);
        let err = resolve_content(Some(&existing), image_update(Patch::Set(new_url), Patch::Keep))
            .unwrap_err();
        assert!(matches!(err, LandingError::MissingImageKey));
    }

    #[test]
    fn test_no_existing_record_requires_key() {
        let err = resolve_content(None, image_update(Patch::Set(A), Patch::Keep)).unwrap_err();
        assert!(matches!(err, LandingError::MissingImageKey));
    }

    #[test]
    fn test_non_https_rejected_before_key_check() {
        let err = resolve_content(
            None,
            image_update(Patch::Set("http://cdn/a.png"), Patch::Set("k1")),
        )
        .unwrap_err();
        assert!(matches!(err, LandingError::InvalidImageUrl));
    }

    #[rstest]
    #[case("https://cdn.example/a.png", true)]
    #[case("https://cdn/a.png", true)]
    #[case("http://cdn.example/a.png", false)]
    #[case("ftp://cdn.example/a.png", false)]
    #[case("/relative/a.png", false)]
    #[case("https:a.png", false)]
    #[case("https:/a.png", false)]
    #[case("https:///a.png", false)]
    #[case("https:\\\\cdn\\a.png", false)]
    #[case("https://user@/a.png", false)]
    #[case("https://:443/a.png", false)]
    #[case("HTTPS://cdn.example/a.png", true)]
    #[case("https://user@cdn.example:8443/a.png?v=1", true)]
    #[case("https://[::1]/a.png", true)]
    #[case("not a url", false)]
    #[case("data:image/png;base64,AAAA", false)]
    fn test_validate_image_url(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(validate_image_url(raw).is_ok(), valid);
    }

    #[test]
    fn test_metadata_only_update_keeps_image() {
        let existing = stored(Some(A), Some("k1"));
        let update = LandingUpsert {
            headline: Patch::Set("  hi ".to_string()),
            description: Patch::Set("   ".to_string()),
            ..LandingUpsert::default()
        };

        let content = resolve_content(Some(&existing), update).unwrap();

        assert_eq!(content.headline.as_deref(), Some("hi"));
        assert_eq!(content.description, None);
        assert_eq!(content.image_url.as_deref(), Some(A));
        assert_eq!(content.image_key.as_deref(), Some("k1"));
    }

    #[test]
    fn test_explicit_null_clears_text_field() {
        let existing = stored(None, None);
        let update = LandingUpsert {
            headline: Patch::Clear,
            ..LandingUpsert::default()
        };
        let content = resolve_content(Some(&existing), update).unwrap();
        assert_eq!(content.headline, None);
    }

    #[rstest]
    #[case(None, None, false)]
    #[case(None, Some("k2"), false)]
    #[case(Some(""), None, false)]
    #[case(Some("k1"), None, true)]
    #[case(Some("k1"), Some(""), true)]
    #[case(Some("k1"), Some("k1"), false)]
    #[case(Some("k1"), Some("k2"), true)]
    fn test_should_delete_old_image(
        #[case] old: Option<&str>,
        #[case] new: Option<&str>,
        #[case] expected: bool,
    ) {
        assert_eq!(should_delete_old_image(old, new), expected);
    }
}
