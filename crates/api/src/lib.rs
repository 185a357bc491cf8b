//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Error responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use callflow_core::landing::{LandingRepository as LandingRepoTrait, LandingService};
use callflow_db::LandingRepository;
use callflow_shared::JwtService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
///
/// Generic over the landing repository so handlers can be exercised without
/// a database.
pub struct AppState<R: LandingRepoTrait = LandingRepository> {
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Landing page service. Long-lived: it owns the per-owner upsert locks.
    pub landing: Arc<LandingService<R>>,
}

impl<R: LandingRepoTrait> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            jwt_service: self.jwt_service.clone(),
            landing: self.landing.clone(),
        }
    }
}

/// Creates the main application router.
pub fn create_router<R: LandingRepoTrait + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(&state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
