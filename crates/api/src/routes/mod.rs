//! API route definitions.

use axum::{Router, middleware};
use callflow_core::landing::LandingRepository;

use crate::{AppState, middleware::auth_middleware};

pub mod health;
pub mod landing;

/// Creates the API router; owner routes sit behind the auth middleware.
pub fn api_routes_with_state<R: LandingRepository + 'static>(
    state: &AppState<R>,
) -> Router<AppState<R>> {
    let protected_routes = landing::routes().layer(middleware::from_fn_with_state(
        state.jwt_service.clone(),
        auth_middleware,
    ));

    Router::new()
        .merge(health::routes())
        .merge(landing::public_routes())
        .merge(protected_routes)
}
