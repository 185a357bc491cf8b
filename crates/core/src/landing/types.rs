//! Landing page domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A field in a partial update.
///
/// A field missing from the payload is `Keep`, an explicit `null` is `Clear`,
/// and a value is `Set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Leave the stored value as it is.
    #[default]
    Keep,
    /// Remove the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    /// Resolve against the currently stored value.
    #[must_use]
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }

    /// The supplied value, if any.
    #[must_use]
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Keep | Self::Clear => None,
        }
    }
}

impl Patch<String> {
    /// Trim a supplied string; blank strings become `Clear`.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Set(value) => match value.trim() {
                "" => Self::Clear,
                trimmed if trimmed.len() == value.len() => Self::Set(value),
                trimmed => Self::Set(trimmed.to_string()),
            },
            other => other,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Editable content of a landing page, as persisted.
///
/// `image_key` is present only together with `image_url` and is never
/// serialized to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LandingContent {
    /// Headline text.
    pub headline: Option<String>,
    /// Description text.
    pub description: Option<String>,
    /// Public https URL of the hero image.
    pub image_url: Option<String>,
    /// Storage handle of the hero image.
    #[serde(skip)]
    pub image_key: Option<String>,
    /// WhatsApp link.
    pub whatsapp_url: Option<String>,
    /// Facebook link.
    pub facebook_url: Option<String>,
    /// Instagram link.
    pub instagram_url: Option<String>,
    /// YouTube link.
    pub youtube_url: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Website link.
    pub website_url: Option<String>,
}

/// A user's landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Landing {
    /// Assigned by persistence on first upsert; `None` for a page never saved.
    pub id: Option<Uuid>,
    /// Owning user.
    pub user_id: Uuid,
    /// Page content.
    #[serde(flatten)]
    pub content: LandingContent,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Landing {
    /// Empty page scoped to an owner, used when nothing has been saved yet.
    #[must_use]
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            id: None,
            user_id,
            content: LandingContent::default(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Partial update for a landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LandingUpsert {
    /// Headline text.
    pub headline: Patch<String>,
    /// Description text.
    pub description: Patch<String>,
    /// Hero image URL.
    pub image_url: Patch<String>,
    /// Hero image storage key, as returned by the upload endpoint.
    pub image_key: Patch<String>,
    /// WhatsApp link.
    pub whatsapp_url: Patch<String>,
    /// Facebook link.
    pub facebook_url: Patch<String>,
    /// Instagram link.
    pub instagram_url: Patch<String>,
    /// YouTube link.
    pub youtube_url: Patch<String>,
    /// Contact email.
    pub email: Patch<String>,
    /// Website link.
    pub website_url: Patch<String>,
}

impl LandingUpsert {
    /// Trim every supplied string and turn blanks into `Clear`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            headline: self.headline.normalized(),
            description: self.description.normalized(),
            image_url: self.image_url.normalized(),
            image_key: self.image_key.normalized(),
            whatsapp_url: self.whatsapp_url.normalized(),
            facebook_url: self.facebook_url.normalized(),
            instagram_url: self.instagram_url.normalized(),
            youtube_url: self.youtube_url.normalized(),
            email: self.email.normalized(),
            website_url: self.website_url.normalized(),
        }
    }
}
