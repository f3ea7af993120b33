//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<_, HttpAppError>` and let `?`
//! convert `AppError` or `ServiceError` so every failure renders the same way
//! (status, body, logging).

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use utoipa::ToSchema;
use vidcourse_core::{AppError, ErrorMetadata, LogLevel};
use vidcourse_services::ServiceError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Retry after a short delay")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from vidcourse-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<ServiceError> for HttpAppError {
    fn from(err: ServiceError) -> Self {
        HttpAppError(err.into())
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

static PRODUCTION_MODE: AtomicBool = AtomicBool::new(false);

/// Record whether the loaded config runs in production; set once per router build.
pub fn set_production_mode(production: bool) {
    PRODUCTION_MODE.store(production, Ordering::Relaxed);
}

fn production_mode() -> bool {
    PRODUCTION_MODE.load(Ordering::Relaxed)
}

/// Details are always hidden in production, and for sensitive errors everywhere
fn hides_details(app_error: &AppError, production: bool) -> bool {
    production || app_error.is_sensitive()
}

fn error_body(app_error: &AppError, hide_details: bool) -> ErrorResponse {
    let (details, error_type) = if hide_details {
        (None, None)
    } else {
        (
            Some(app_error.to_string()),
            Some(app_error.error_type().to_string()),
        )
    };

    ErrorResponse {
        error: app_error.client_message(),
        details,
        error_type,
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = error_body(app_error, hides_details(app_error, production_mode()));
        let mut response = (status, Json(body)).into_response();

        if let AppError::RangeNotSatisfiable { total_size } = app_error {
            let headers = response.headers_mut();
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", total_size)) {
                headers.insert(header::CONTENT_RANGE, value);
            }
            headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_service_error_not_found() {
        let HttpAppError(app_err) = ServiceError::ObjectNotFound("a.mp4".to_string()).into();
        match app_err {
            AppError::NotFound(msg) => assert!(msg.contains("a.mp4")),
            _ => panic!("Expected NotFound variant"),
        }
    }

    #[test]
    fn test_from_service_error_bad_request() {
        let HttpAppError(app_err) = ServiceError::BadRequest("key required".to_string()).into();
        match app_err {
            AppError::BadRequest(msg) => assert_eq!(msg, "key required"),
            _ => panic!("Expected BadRequest variant"),
        }
    }

    #[test]
    fn test_range_not_satisfiable_carries_content_range() {
        let response =
            HttpAppError(AppError::RangeNotSatisfiable { total_size: 1000 }).into_response();

        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */1000"
        );
        assert_eq!(response.headers().get(header::ACCEPT_RANGES).unwrap(), "bytes");
    }

    #[test]
    fn test_store_unavailable_is_500() {
        let response =
            HttpAppError(AppError::StoreUnavailable("reset".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::CONTENT_RANGE).is_none());
    }

    #[test]
    fn test_sensitive_error_hides_details() {
        let err = AppError::StoreUnavailable("s3://internal-bucket unreachable".to_string());
        let body = error_body(&err, err.is_sensitive());

        assert_eq!(body.error, "Failed to access storage");
        assert_eq!(body.code, "STORAGE_ERROR");
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
    }

    #[test]
    fn test_production_hides_details_of_client_errors() {
        let err = AppError::BadRequest("key required".to_string());
        assert!(hides_details(&err, true));
        assert!(!hides_details(&err, false));

        let body = error_body(&err, hides_details(&err, true));
        assert_eq!(body.error, "key required");
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
    }

    #[test]
    fn test_non_sensitive_error_shows_details() {
        let err = AppError::BadRequest("key required".to_string());
        let body = error_body(&err, false);

        assert_eq!(body.error, "key required");
        assert_eq!(body.error_type.as_deref(), Some("BadRequest"));
        assert!(body.details.unwrap().contains("key required"));
    }
}
