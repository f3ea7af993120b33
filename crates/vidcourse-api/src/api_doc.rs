//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use vidcourse_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidcourse API",
        version = "0.1.0",
        description = "Video listing and byte-range streaming over object storage, with optional CloudFront delegation."
    ),
    paths(
        handlers::videos::list_videos,
        handlers::stream::stream_video,
        handlers::stream::stream_default_video,
        handlers::signed_url::get_signed_url,
    ),
    components(schemas(
        models::VideoFileInfo,
        models::SignedUrlResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "videos", description = "Cached catalog of video files"),
        (name = "stream", description = "Range-aware streaming and signed URLs")
    )
)]
pub struct ApiDoc;
