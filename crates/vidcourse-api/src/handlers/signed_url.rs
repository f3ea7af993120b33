use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use vidcourse_core::{models::SignedUrlResponse, AppError};
use vidcourse_services::ServiceError;

#[utoipa::path(
    get,
    path = "/api/signed-url/{key}",
    tag = "stream",
    params(
        ("key" = String, Path, description = "Storage key of the video, may contain slashes")
    ),
    responses(
        (status = 200, description = "Signed CDN URL", body = SignedUrlResponse),
        (status = 400, description = "Key missing", body = ErrorResponse),
        (status = 404, description = "Video not found, or no CDN configured", body = ErrorResponse),
        (status = 500, description = "Signing failed", body = ErrorResponse)
    )
)]
pub async fn get_signed_url(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<SignedUrlResponse>, HttpAppError> {
    let signer = state
        .signer
        .as_ref()
        .ok_or_else(|| AppError::NotFound("CDN signing is not configured".to_string()))?;

    if key.trim().is_empty() {
        return Err(AppError::BadRequest("key required".to_string()).into());
    }

    // Only sign keys that exist at the origin
    state
        .store
        .head_object(&key)
        .await
        .map_err(ServiceError::from)?;

    let signed = signer
        .sign(&key, state.config.signed_url_ttl())
        .map_err(ServiceError::from)?;

    Ok(Json(SignedUrlResponse {
        url: signed.url,
        expires_at: signed.expires_at,
    }))
}
