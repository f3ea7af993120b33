//! Vidcourse Services Layer
//!
//! This crate hosts the streaming service logic: the video catalog (object
//! classification, bucket enumeration and the two-tier listing cache), the
//! range streamer and signed URL issuance. HTTP handling stays in
//! vidcourse-api; this crate only sees a `BlobStore` and plain values.

pub mod catalog;
pub mod error;
pub mod signing;
pub mod streaming;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use catalog::{CacheStatus, CachedListing, ListingCache, ListingFetcher};
pub use error::{ServiceError, ServiceResult};
pub use signing::{CloudFrontSigner, SignedUrl, SigningError, UrlSigner};
pub use streaming::{CdnSource, ObjectSource, OriginSource, RangeStreamer, StreamedObject};
pub use vidcourse_storage::{create_blob_store, BlobStore, MemoryBlobStore, StorageError};
