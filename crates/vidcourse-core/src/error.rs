//! Caller-facing error taxonomy.
//!
//! Every failure that reaches an HTTP client is an `AppError`. Each variant
//! describes its own presentation (status, code, retry hint, log level)
//! through `ErrorMetadata`, so the API layer renders them uniformly.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected client mistakes
    Debug,
    /// Transient upstream trouble the client may retry
    Warn,
    /// Failures that need an operator
    Error,
}

/// How an error presents itself to HTTP clients and to the logs.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details must never leave the server
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The blob store or CDN could not be enumerated or read.
    #[error("Storage unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Requested range not satisfiable for object of {total_size} bytes")]
    RangeNotSatisfiable { total_size: u64 },

    #[error("Signing error: {0}")]
    Signing(String),
}

struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

impl AppError {
    fn presentation(&self) -> Presentation {
        match self {
            AppError::StoreUnavailable(_) => Presentation {
                status: 500,
                code: "STORAGE_ERROR",
                recoverable: true,
                action: Some("Retry after a short delay"),
                sensitive: true,
                level: LogLevel::Warn,
            },
            AppError::BadRequest(_) => Presentation {
                status: 400,
                code: "BAD_REQUEST",
                recoverable: false,
                action: Some("Check request format and parameters"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::NotFound(_) => Presentation {
                status: 404,
                code: "NOT_FOUND",
                recoverable: false,
                action: Some("Verify the video key exists"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::RangeNotSatisfiable { .. } => Presentation {
                status: 416,
                code: "RANGE_NOT_SATISFIABLE",
                recoverable: false,
                action: Some("Request a byte range within the object size"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::Signing(_) => Presentation {
                status: 500,
                code: "SIGNING_ERROR",
                recoverable: false,
                action: Some("Contact support if this error persists"),
                sensitive: true,
                level: LogLevel::Error,
            },
        }
    }

    /// Variant name, shown to clients outside production
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::StoreUnavailable(_) => "StoreUnavailable",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::RangeNotSatisfiable { .. } => "RangeNotSatisfiable",
            AppError::Signing(_) => "Signing",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::StoreUnavailable(_) => "Failed to access storage".to_string(),
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::RangeNotSatisfiable { .. } => "Requested range not satisfiable".to_string(),
            AppError::Signing(_) => "Failed to sign URL".to_string(),
        }
    }
}
