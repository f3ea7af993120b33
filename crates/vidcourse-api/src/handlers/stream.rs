use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Response,
};
use std::sync::Arc;
use vidcourse_core::AppError;
use vidcourse_services::StreamedObject;

async fn stream_key(
    state: &AppState,
    key: &str,
    request_headers: &HeaderMap,
) -> Result<Response, HttpAppError> {
    // A Range header that is not valid UTF-8 is ignored like a missing one
    let range = request_headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let StreamedObject {
        status,
        headers,
        body,
    } = state.streamer.stream_object(key, range).await?;

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Also served at `/api/get-video-url/{key}`.
#[utoipa::path(
    get,
    path = "/api/stream/{key}",
    tag = "stream",
    params(
        ("key" = String, Path, description = "Storage key of the video, may contain slashes"),
        ("Range" = Option<String>, Header, description = "bytes=<start>-[<end>]")
    ),
    responses(
        (status = 200, description = "Whole object"),
        (status = 206, description = "Requested byte window",
            headers(
                ("Content-Range" = String, description = "bytes <start>-<end>/<total>"),
                ("Accept-Ranges" = String, description = "Always bytes")
            )),
        (status = 400, description = "Key missing", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 416, description = "Range not satisfiable", body = ErrorResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn stream_video(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    stream_key(&state, &key, &headers).await
}

/// Streams the configured default video, for clients that predate keyed URLs.
#[utoipa::path(
    get,
    path = "/api/get-video-url",
    tag = "stream",
    params(
        ("Range" = Option<String>, Header, description = "bytes=<start>-[<end>]")
    ),
    responses(
        (status = 200, description = "Whole object"),
        (status = 206, description = "Requested byte window"),
        (status = 400, description = "No default video configured", body = ErrorResponse),
        (status = 416, description = "Range not satisfiable", body = ErrorResponse)
    )
)]
pub async fn stream_default_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let key = state
        .config
        .default_video_key
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("key required".to_string()))?;

    stream_key(&state, key, &headers).await
}

/// `/api/stream/` and `/api/get-video-url/` with nothing after the slash.
pub async fn missing_key() -> Result<Response, HttpAppError> {
    Err(AppError::BadRequest("key required".to_string()).into())
}
