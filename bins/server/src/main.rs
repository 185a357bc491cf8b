//! Callflow API Server
//!
//! Main entry point for the Callflow landing page service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use callflow_api::{AppState, create_router};
use callflow_core::landing::LandingService;
use callflow_core::storage::ImageStore;
use callflow_db::{LandingRepository, connect};
use callflow_shared::{AppConfig, JwtService, StorageSettings};

/// Picks the image store; a broken token disables uploads instead of stopping the process.
fn select_image_store(settings: &StorageSettings) -> ImageStore {
    match ImageStore::from_settings(settings) {
        Ok(ImageStore::Disabled) => {
            warn!("UPLOADTHING_TOKEN not set; landing image uploads are disabled");
            ImageStore::Disabled
        }
        Ok(store) => {
            info!(
                provider = store.provider_name(),
                api_root = %settings.api_root,
                "Image store configured"
            );
            store
        }
        Err(e) => {
            warn!(error = %e, "Image store misconfigured; landing image uploads are disabled");
            ImageStore::Disabled
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callflow=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.leeway_secs);

    let store = select_image_store(&config.storage);
    let landing = LandingService::new(Arc::new(LandingRepository::new(db)), store);

    let state = AppState {
        jwt_service: Arc::new(jwt_service),
        landing: Arc::new(landing),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
