//! Vidcourse Storage Library
//!
//! This crate provides the blob store abstraction the streaming service reads
//! from, with implementations for S3 (and S3-compatible providers), the local
//! filesystem and an in-memory store used in development and tests.
//!
//! # Listing contract
//!
//! Listings are paginated. A continuation token is the last key of the
//! previous page and the next page starts strictly after it, so every backend
//! pages in ascending key order.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub(crate) mod pagination;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_blob_store;
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStore;
pub use memory::{CallCounts, MemoryBlobStore};
#[cfg(feature = "storage-s3")]
pub use s3::S3BlobStore;
pub use traits::{
    BlobStore, ByteRange, ByteStream, ListPage, ListedObject, ObjectHead, StorageError,
    StorageResult,
};
pub use vidcourse_core::StorageBackend;
