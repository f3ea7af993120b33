//! Video catalog: classification, enumeration and the tiered listing cache.

pub mod cache;
pub mod classifier;
pub mod fetcher;

pub use cache::{CachePolicy, CacheStatus, CachedListing, ListingCache};
pub use classifier::{file_name_from_key, is_video_file};
pub use fetcher::{ListingFetcher, MAX_PARALLEL_REQUESTS};
