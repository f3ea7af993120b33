//! Two-tier listing cache.
//!
//! A short-term tier answers rapid repeat requests with no I/O. Past that
//! window a long-term tier still answers immediately while one background
//! task re-enumerates the bucket. Only when both tiers have expired does a
//! request wait on a full enumeration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use vidcourse_core::VideoFileInfo;
use vidcourse_storage::BlobStore;

use super::fetcher::ListingFetcher;
use crate::error::ServiceResult;

pub const SHORT_TERM_TTL: Duration = Duration::from_millis(10_000);
pub const LONG_TERM_TTL: Duration = Duration::from_millis(300_000);

/// Freshness windows for the two tiers.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub short_term: Duration,
    pub long_term: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            short_term: SHORT_TERM_TTL,
            long_term: LONG_TERM_TTL,
        }
    }
}

/// Which path produced a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the short-term tier
    Fresh,
    /// Served from the long-term tier while a refresh runs
    Stale,
    /// Enumerated synchronously
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Fresh => "fresh",
            CacheStatus::Stale => "stale",
            CacheStatus::Miss => "miss",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedListing {
    pub files: Arc<Vec<VideoFileInfo>>,
    pub status: CacheStatus,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Arc<Vec<VideoFileInfo>>,
    timestamp: Instant,
}

type Tier = RwLock<HashMap<String, CacheEntry>>;

struct CacheInner {
    fetcher: ListingFetcher,
    policy: CachePolicy,
    short_term: Tier,
    long_term: Tier,
    refreshing: AtomicBool,
}

/// Listing cache keyed by bucket identity.
///
/// Construct once per process and share by cloning.
#[derive(Clone)]
pub struct ListingCache {
    inner: Arc<CacheInner>,
}

/// Clears the refresh flag when the refresh task ends, however it ends.
struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn lookup(tier: &Tier, key: &str, max_age: Duration) -> Option<Arc<Vec<VideoFileInfo>>> {
    let entries = tier.read().await;
    entries
        .get(key)
        .filter(|entry| entry.timestamp.elapsed() < max_age)
        .map(|entry| entry.data.clone())
}

impl ListingCache {
    pub fn new(fetcher: ListingFetcher) -> Self {
        Self::with_policy(fetcher, CachePolicy::default())
    }

    pub fn with_policy(fetcher: ListingFetcher, policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                fetcher,
                policy,
                short_term: RwLock::new(HashMap::new()),
                long_term: RwLock::new(HashMap::new()),
                refreshing: AtomicBool::new(false),
            }),
        }
    }

    /// Return the video listing for `store`, enumerating only when needed.
    ///
    /// Errors only on a cold miss whose enumeration fails; background
    /// refresh failures are logged and never reach the caller.
    pub async fn get_cached_video_files(
        &self,
        store: &Arc<dyn BlobStore>,
    ) -> ServiceResult<CachedListing> {
        let key = store.bucket().to_string();
        let policy = self.inner.policy;

        if let Some(files) = lookup(&self.inner.short_term, &key, policy.short_term).await {
            tracing::debug!(bucket = %key, "Listing served from short-term cache");
            return Ok(CachedListing {
                files,
                status: CacheStatus::Fresh,
            });
        }

        if let Some(files) = lookup(&self.inner.long_term, &key, policy.long_term).await {
            tracing::debug!(bucket = %key, "Listing served from long-term cache");
            self.spawn_refresh(Arc::clone(store), key);
            return Ok(CachedListing {
                files,
                status: CacheStatus::Stale,
            });
        }

        tracing::debug!(bucket = %key, "Listing cache miss");
        let files = self.fetch_and_store(store.as_ref(), &key).await?;
        Ok(CachedListing {
            files,
            status: CacheStatus::Miss,
        })
    }

    /// Whether a background refresh is currently running.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refreshing.load(Ordering::Acquire)
    }

    async fn fetch_and_store(
        &self,
        store: &dyn BlobStore,
        key: &str,
    ) -> ServiceResult<Arc<Vec<VideoFileInfo>>> {
        let files = Arc::new(self.inner.fetcher.list_video_files(store).await?);
        let entry = CacheEntry {
            data: files.clone(),
            timestamp: Instant::now(),
        };

        // Both tiers always hold the same snapshot
        self.inner
            .short_term
            .write()
            .await
            .insert(key.to_string(), entry.clone());
        self.inner
            .long_term
            .write()
            .await
            .insert(key.to_string(), entry);

        Ok(files)
    }

    fn spawn_refresh(&self, store: Arc<dyn BlobStore>, key: String) {
        if self
            .inner
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(bucket = %key, "Listing refresh already in progress");
            return;
        }

        let cache = self.clone();
        tokio::spawn(async move {
            let _guard = RefreshGuard(&cache.inner.refreshing);
            let start = std::time::Instant::now();

            match cache.fetch_and_store(store.as_ref(), &key).await {
                Ok(files) => tracing::debug!(
                    bucket = %key,
                    videos = files.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Background listing refresh completed"
                ),
                Err(e) => tracing::warn!(
                    bucket = %key,
                    error = %e,
                    "Background listing refresh failed"
                ),
            }
        });
    }
}
