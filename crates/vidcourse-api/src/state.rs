//! Shared application state handed to every handler.

use std::sync::Arc;

use vidcourse_core::Config;
use vidcourse_services::{ListingCache, RangeStreamer, UrlSigner};
use vidcourse_storage::BlobStore;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn BlobStore>,
    pub catalog: ListingCache,
    pub streamer: RangeStreamer,
    /// Present only when a CDN is configured
    pub signer: Option<Arc<dyn UrlSigner>>,
}
