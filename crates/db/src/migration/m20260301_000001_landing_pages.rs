//! Landing pages migration.
//!
//! One row per owner; the unique `user_id` is the upsert conflict target.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(LANDING_PAGES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS landing_pages CASCADE;")
            .await?;
        Ok(())
    }
}

const LANDING_PAGES_SQL: &str = r"
CREATE TABLE landing_pages (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    headline TEXT,
    description TEXT,
    image_url TEXT,
    image_key TEXT,
    whatsapp_url TEXT,
    facebook_url TEXT,
    instagram_url TEXT,
    youtube_url TEXT,
    email TEXT,
    website_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_landing_pages_user UNIQUE (user_id),
    CONSTRAINT chk_landing_image_key CHECK (image_key IS NULL OR image_url IS NOT NULL)
);
";
