//! Error bodies under a production config.
//!
//! Kept in its own binary: the detail-hiding mode is process-wide.
//!
//! Run with: `cargo test -p vidcourse-api --test error_detail_test`

mod helpers;

use helpers::{api_path, setup_test_app_with, test_config};
use vidcourse_core::Config;

#[tokio::test]
async fn test_production_config_hides_error_details() {
    let app = setup_test_app_with(Config {
        environment: "production".to_string(),
        ..test_config()
    })
    .await;

    let response = app
        .client()
        .get(&api_path("/stream/lessons/99-missing.mp4"))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body.get("details").is_none());
    assert!(body.get("error_type").is_none());
}
