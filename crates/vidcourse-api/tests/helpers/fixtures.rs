//! Seed data for integration tests.

use vidcourse_core::config::CdnConfig;
use vidcourse_storage::MemoryBlobStore;

pub const BUCKET: &str = "course-videos";
pub const INTRO_KEY: &str = "lessons/01-intro.mp4";
pub const SETUP_KEY: &str = "lessons/02-setup.webm";
pub const COVER_KEY: &str = "lessons/cover.png";
pub const PLAYLIST_KEY: &str = "lessons/playlist.m3u8";
pub const INTRO_SIZE: usize = 1000;

pub const CDN_TEST_KEY: &str = include_str!("../fixtures/cdn_test_key.pem");
pub const CDN_KEY_PAIR_ID: &str = "K2JCJMDEHXQW5F";

/// Deterministic, non-repeating-looking payload.
pub fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Three videos (mp4, webm, HLS playlist) and one image.
pub async fn course_store() -> MemoryBlobStore {
    let store = MemoryBlobStore::new(BUCKET);
    store
        .put_object(INTRO_KEY, Some("video/mp4"), sample_bytes(INTRO_SIZE))
        .await;
    store
        .put_object(SETUP_KEY, Some("video/webm"), sample_bytes(500))
        .await;
    store
        .put_object(COVER_KEY, Some("image/png"), sample_bytes(64))
        .await;
    store
        .put_object(
            PLAYLIST_KEY,
            Some("application/x-mpegURL"),
            b"#EXTM3U\n".to_vec(),
        )
        .await;
    store
}

pub fn cdn_config(domain: &str) -> CdnConfig {
    CdnConfig {
        domain: domain.to_string(),
        key_pair_id: CDN_KEY_PAIR_ID.to_string(),
        private_key_pem: CDN_TEST_KEY.to_string(),
    }
}
