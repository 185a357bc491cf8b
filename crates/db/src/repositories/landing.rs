//! Landing page repository for database operations.
//!
//! Implements the landing upsert as a single `INSERT .. ON CONFLICT (user_id)`
//! statement so concurrent first saves for one owner cannot create two rows.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::entities::landing_pages;
use callflow_core::landing::{
    Landing, LandingContent, LandingError, LandingRepository as LandingRepoTrait,
};

/// Landing page repository implementation.
#[derive(Debug, Clone)]
pub struct LandingRepository {
    db: DatabaseConnection,
}

impl LandingRepository {
    /// Create a new landing page repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl LandingRepoTrait for LandingRepository {
    async fn find_by_owner(&self, user_id: Uuid) -> Result<Option<Landing>, LandingError> {
        let model = landing_pages::Entity::find()
            .filter(landing_pages::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| LandingError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn upsert_by_owner(
        &self,
        user_id: Uuid,
        content: LandingContent,
    ) -> Result<Landing, LandingError> {
        let now = Utc::now().into();
        let active_model = landing_pages::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            headline: Set(content.headline),
            description: Set(content.description),
            image_url: Set(content.image_url),
            image_key: Set(content.image_key),
            whatsapp_url: Set(content.whatsapp_url),
            facebook_url: Set(content.facebook_url),
            instagram_url: Set(content.instagram_url),
            youtube_url: Set(content.youtube_url),
            email: Set(content.email),
            website_url: Set(content.website_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Every content column is overwritten, NULLs included; id and
        // created_at keep their original values.
        let on_conflict = OnConflict::column(landing_pages::Column::UserId)
            .update_columns([
                landing_pages::Column::Headline,
                landing_pages::Column::Description,
                landing_pages::Column::ImageUrl,
                landing_pages::Column::ImageKey,
                landing_pages::Column::WhatsappUrl,
                landing_pages::Column::FacebookUrl,
                landing_pages::Column::InstagramUrl,
                landing_pages::Column::YoutubeUrl,
                landing_pages::Column::Email,
                landing_pages::Column::WebsiteUrl,
                landing_pages::Column::UpdatedAt,
            ])
            .to_owned();

        let model = landing_pages::Entity::insert(active_model)
            .on_conflict(on_conflict)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| LandingError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }
}

fn to_domain(model: landing_pages::Model) -> Landing {
    Landing {
        id: Some(model.id),
        user_id: model.user_id,
        content: LandingContent {
            headline: model.headline,
            description: model.description,
            image_url: model.image_url,
            image_key: model.image_key,
            whatsapp_url: model.whatsapp_url,
            facebook_url: model.facebook_url,
            instagram_url: model.instagram_url,
            youtube_url: model.youtube_url,
            email: model.email,
            website_url: model.website_url,
        },
        created_at: Some(model.created_at.with_timezone(&Utc)),
        updated_at: Some(model.updated_at.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_domain_keeps_every_field() {
        let now = Utc::now();
        let model = landing_pages::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            headline: Some("Hello".to_string()),
            description: None,
            image_url: Some("https://app.ufs.sh/f/k1".to_string()),
            image_key: Some("k1".to_string()),
            whatsapp_url: Some("https://wa.me/1".to_string()),
            facebook_url: None,
            instagram_url: None,
            youtube_url: None,
            email: Some("a@b.c".to_string()),
            website_url: None,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let landing = to_domain(model.clone());

        assert_eq!(landing.id, Some(model.id));
        assert_eq!(landing.user_id, model.user_id);
        assert_eq!(landing.content.image_key.as_deref(), Some("k1"));
        assert_eq!(landing.content.email.as_deref(), Some("a@b.c"));
        assert_eq!(landing.created_at, Some(now));
    }
}
