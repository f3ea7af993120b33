//! Vidcourse Core Library
//!
//! This crate provides the configuration, error taxonomy and domain models
//! shared by the storage, services and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{SignedUrlResponse, VideoFileInfo};
pub use storage_types::StorageBackend;
