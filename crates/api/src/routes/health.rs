//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use callflow_core::landing::LandingRepository;
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Active image store backend.
    pub image_store: &'static str,
}

/// Health check handler.
async fn health_check<R: LandingRepository + 'static>(
    State(state): State<AppState<R>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        image_store: state.landing.store().provider_name(),
    })
}

/// Creates health check routes.
pub fn routes<R: LandingRepository + 'static>() -> Router<AppState<R>> {
    Router::new().route("/health", get(health_check::<R>))
}
