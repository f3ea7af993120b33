//! Decides which stored objects are servable video assets.

const HLS_PLAYLIST_CONTENT_TYPE: &str = "application/x-mpegURL";

/// True for `video/*` content types and HLS playlists.
pub fn is_video_file(content_type: &str) -> bool {
    content_type.starts_with("video/") || content_type == HLS_PLAYLIST_CONTENT_TYPE
}

/// Final path segment of a storage key.
pub fn file_name_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
