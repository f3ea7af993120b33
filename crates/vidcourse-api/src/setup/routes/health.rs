//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
    pub source: &'static str,
    pub cdn_signing: bool,
    pub listing_refresh: &'static str,
}

/// Liveness check - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Health check: lists one page from the blob store.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let storage = run_check(
        TIMEOUT,
        async { state.store.list_objects(None).await.map(|_| ()) },
        "unhealthy",
    )
    .await;

    let healthy = storage == "healthy";
    if !healthy {
        tracing::error!(
            bucket = %state.store.bucket(),
            storage = %storage,
            "Storage health check failed"
        );
    }

    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        storage,
        source: state.streamer.source_name(),
        cdn_signing: state.signer.is_some(),
        listing_refresh: if state.catalog.is_refreshing() {
            "running"
        } else {
            "idle"
        },
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_check_reports_error_with_prefix() {
        let status = run_check(
            Duration::from_secs(1),
            async { Err::<(), _>("connection refused") },
            "unhealthy",
        )
        .await;
        assert_eq!(status, "unhealthy: connection refused");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_check_times_out() {
        let status = run_check(
            Duration::from_secs(5),
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<(), String>(())
            },
            "unhealthy",
        )
        .await;
        assert_eq!(status, "timeout");
    }
}
