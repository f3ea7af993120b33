//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p vidcourse-api`.

#![allow(dead_code)]

pub mod cdn;
pub mod fixtures;

use axum_test::TestServer;
use std::sync::Arc;
use vidcourse_api::constants;
use vidcourse_api::setup::{routes, services};
use vidcourse_core::Config;
use vidcourse_storage::{BlobStore, MemoryBlobStore};

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus a handle on the store behind it.
pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryBlobStore,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Config for an app over the in-memory store.
pub fn test_config() -> Config {
    Config {
        default_video_key: Some(fixtures::INTRO_KEY.to_string()),
        ..Config::default()
    }
}

/// Setup test app over a seeded in-memory store.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config()).await
}

pub async fn setup_test_app_with(config: Config) -> TestApp {
    let store = fixtures::course_store().await;
    build_app(config, store).await
}

pub async fn build_app(config: Config, store: MemoryBlobStore) -> TestApp {
    let blob_store: Arc<dyn BlobStore> = Arc::new(store.clone());
    let state = services::initialize_services(&config, blob_store).expect("services");
    let router = routes::setup_routes(&config, state)
        .await
        .expect("routes");
    let server =
        TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp { server, store }
}
