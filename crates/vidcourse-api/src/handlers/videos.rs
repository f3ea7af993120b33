use crate::constants::CACHE_STATUS_HEADER;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use vidcourse_core::models::VideoFileInfo;

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Video files in the bucket", body = [VideoFileInfo],
            headers(("X-Cache" = String, description = "fresh, stale or miss"))),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn list_videos(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let listing = state.catalog.get_cached_video_files(&state.store).await?;

    tracing::debug!(
        bucket = %state.store.bucket(),
        count = listing.files.len(),
        cache = listing.status.as_str(),
        "Listed video files"
    );

    let mut response = Json(listing.files.as_slice()).into_response();
    response.headers_mut().insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(listing.status.as_str()),
    );
    Ok(response)
}
