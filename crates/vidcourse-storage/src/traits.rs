//! Blob store abstraction trait
//!
//! This module defines the `BlobStore` trait that every storage backend
//! implements: paginated listing, metadata lookup and (ranged) streaming reads.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::ops::Range;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Streamed object body, yielded chunk by chunk
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// One entry of a listing page.
///
/// Fields are optional because stores may omit them; consumers skip
/// entries that lack any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedObject {
    pub key: Option<String>,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub items: Vec<ListedObject>,
    /// Opaque cursor for the next page; `None` once the listing is exhausted
    pub next_continuation_token: Option<String>,
}

/// Object metadata as reported by a HEAD-style lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Inclusive byte window `[start, end]` of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered by the window
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Half-open equivalent, as used by most client libraries
    pub fn as_exclusive(&self) -> Range<u64> {
        self.start..self.end + 1
    }

    /// Value for an outbound `Range` request header
    pub fn to_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// Blob store abstraction trait
///
/// A store is bound to a single bucket or container; `bucket()` is its
/// identity and is what listing caches key on.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bucket or container identity
    fn bucket(&self) -> &str;

    /// Fetch one listing page, resuming after `continuation_token` when given.
    async fn list_objects(&self, continuation_token: Option<&str>) -> StorageResult<ListPage>;

    /// Metadata lookup (size, content type, last modified) for a single key
    async fn head_object(&self, key: &str) -> StorageResult<ObjectHead>;

    /// Stream an object, or only the inclusive `range` of it.
    ///
    /// Bodies are streamed so large video files are never held in memory.
    async fn get_object(&self, key: &str, range: Option<ByteRange>) -> StorageResult<ByteStream>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
