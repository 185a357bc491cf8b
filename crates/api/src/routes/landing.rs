//! Landing page routes.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    routing::{get, post},
};
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use callflow_core::landing::{Landing, LandingError, LandingRepository, LandingUpsert};
use callflow_core::storage::{UploadedImage, content_type::validate_image};
use callflow_shared::AppError;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Request body cap for uploads: the image limit plus room for multipart framing.
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Creates the authenticated landing routes.
pub fn routes<R: LandingRepository + 'static>() -> Router<AppState<R>> {
    Router::new()
        .route("/landing", get(get_landing::<R>).put(upsert_landing::<R>))
        .route(
            "/landing/upload-image",
            post(upload_image::<R>).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

/// Creates the unauthenticated landing routes.
pub fn public_routes<R: LandingRepository + 'static>() -> Router<AppState<R>> {
    Router::new().route("/public/landing/{owner_id}", get(get_public_landing::<R>))
}

/// GET `/landing`
/// The caller's page, or an empty page if nothing was saved yet.
async fn get_landing<R: LandingRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
) -> Result<Json<Landing>, ApiError> {
    Ok(Json(state.landing.get(auth.user_id()).await?))
}

/// PUT `/landing`
/// Partial update: absent fields are kept, `null` or blank clears them.
async fn upsert_landing<R: LandingRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
    Json(update): Json<LandingUpsert>,
) -> Result<Json<Landing>, ApiError> {
    Ok(Json(state.landing.upsert(auth.user_id(), update).await?))
}

/// POST `/landing/upload-image`
/// Stores the `image` multipart field and returns its URL and key.
async fn upload_image<R: LandingRepository + 'static>(
    State(state): State<AppState<R>>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadedImage>, ApiError> {
    if !state.landing.store().is_enabled() {
        return Err(AppError::ServiceUnavailable("image upload is not configured".to_string()).into());
    }

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let declared = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(bad_multipart)?;
        image = Some((filename, declared, bytes));
        break;
    }

    let Some((filename, declared, bytes)) = image else {
        return Err(AppError::Validation(format!("multipart field `{IMAGE_FIELD}` is required")).into());
    };

    let content_type = validate_image(&declared, &bytes).map_err(LandingError::from)?;
    debug!(owner_id = %auth.user_id(), declared = %declared, content_type, "accepted landing image");

    let uploaded = state
        .landing
        .upload_image(auth.user_id(), &filename, content_type, bytes.to_vec())
        .await?;
    Ok(Json(uploaded))
}

/// GET `/public/landing/{owner_id}`
/// An owner's page, readable without authentication. Empty if never saved.
async fn get_public_landing<R: LandingRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<Landing>, ApiError> {
    Ok(Json(state.landing.get(owner_id).await?))
}

#[allow(clippy::needless_pass_by_value)]
fn bad_multipart(err: MultipartError) -> ApiError {
    ApiError(AppError::Validation(err.body_text()))
}
