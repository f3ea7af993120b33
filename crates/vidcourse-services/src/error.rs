use thiserror::Error;
use vidcourse_core::AppError;
use vidcourse_storage::StorageError;

use crate::signing::SigningError;

/// Failures surfaced by the catalog and streaming services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Range not satisfiable for object of {total_size} bytes")]
    RangeNotSatisfiable { total_size: u64 },

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => ServiceError::ObjectNotFound(key),
            StorageError::InvalidKey(msg) => ServiceError::BadRequest(msg),
            other => ServiceError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            ServiceError::ObjectNotFound(key) => {
                AppError::NotFound(format!("Video not found: {}", key))
            }
            ServiceError::BadRequest(msg) => AppError::BadRequest(msg),
            ServiceError::RangeNotSatisfiable { total_size } => {
                AppError::RangeNotSatisfiable { total_size }
            }
            ServiceError::Signing(e) => AppError::Signing(e.to_string()),
        }
    }
}
