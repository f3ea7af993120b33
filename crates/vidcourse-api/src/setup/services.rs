//! Service wiring: listing cache, signer and streamer.

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use vidcourse_core::Config;
use vidcourse_services::{
    CdnSource, CloudFrontSigner, ListingCache, ListingFetcher, ObjectSource, OriginSource,
    RangeStreamer, UrlSigner,
};
use vidcourse_storage::BlobStore;

const CDN_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the application state over an already constructed blob store.
pub fn initialize_services(config: &Config, store: Arc<dyn BlobStore>) -> Result<Arc<AppState>> {
    let signer: Option<Arc<dyn UrlSigner>> = match &config.cdn {
        Some(cdn) => {
            let signer: Arc<dyn UrlSigner> = Arc::new(
                CloudFrontSigner::from_config(cdn).context("Failed to load CDN signing key")?,
            );
            tracing::info!(
                domain = %cdn.domain,
                key_pair_id = %cdn.key_pair_id,
                "CDN signing enabled"
            );
            Some(signer)
        }
        None => None,
    };

    let source: Arc<dyn ObjectSource> = match (&signer, config.stream_via_cdn) {
        (Some(signer), true) => {
            // No overall timeout: a response body may be a multi-gigabyte video
            let client = reqwest::Client::builder()
                .connect_timeout(CDN_CONNECT_TIMEOUT)
                .build()
                .context("Failed to build CDN HTTP client")?;
            Arc::new(CdnSource::new(client, signer.clone(), config.signed_url_ttl()))
        }
        _ => Arc::new(OriginSource::new(store.clone())),
    };

    let streamer = RangeStreamer::new(source);
    tracing::info!(source = streamer.source_name(), "Range streamer ready");

    Ok(Arc::new(AppState {
        config: config.clone(),
        store,
        catalog: ListingCache::new(ListingFetcher::new()),
        streamer,
        signer,
    }))
}
