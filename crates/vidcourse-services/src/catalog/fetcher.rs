//! Bucket enumeration into `VideoFileInfo` records.

use std::time::Instant;

use futures::future::join_all;
use vidcourse_core::VideoFileInfo;
use vidcourse_storage::{BlobStore, ListedObject};

use super::classifier::{file_name_from_key, is_video_file};
use crate::error::ServiceResult;

/// Upper bound on concurrent metadata lookups against the store.
pub const MAX_PARALLEL_REQUESTS: usize = 10;

/// Walks every listing page of a store and keeps the video objects.
#[derive(Debug, Clone)]
pub struct ListingFetcher {
    max_parallel_requests: usize,
}

impl Default for ListingFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// A listed item with every field the record needs.
struct Candidate {
    key: String,
    size: u64,
    last_modified: chrono::DateTime<chrono::Utc>,
}

impl Candidate {
    fn from_listed(item: ListedObject) -> Option<Self> {
        match (item.key, item.size, item.last_modified) {
            // Zero-byte entries are folder placeholders
            (Some(key), Some(size), Some(last_modified)) if size > 0 => Some(Self {
                key,
                size,
                last_modified,
            }),
            _ => None,
        }
    }
}

impl ListingFetcher {
    pub fn new() -> Self {
        Self {
            max_parallel_requests: MAX_PARALLEL_REQUESTS,
        }
    }

    /// Enumerate the store and return its video files in listing order.
    ///
    /// Ids count from 1 over the kept items. A failed page aborts the whole
    /// enumeration; a failed metadata lookup only drops that item.
    pub async fn list_video_files(
        &self,
        store: &dyn BlobStore,
    ) -> ServiceResult<Vec<VideoFileInfo>> {
        let start = Instant::now();
        let mut files = Vec::new();
        let mut next_id: u64 = 1;
        let mut continuation_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = store
                .list_objects(continuation_token.as_deref())
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %store.bucket(),
                        page = pages,
                        "Listing page fetch failed"
                    );
                    e
                })?;
            pages += 1;

            let candidates: Vec<Candidate> = page
                .items
                .into_iter()
                .filter_map(Candidate::from_listed)
                .collect();

            // Each batch completes before the next one starts.
            for batch in candidates.chunks(self.max_parallel_requests) {
                let heads = join_all(batch.iter().map(|c| store.head_object(&c.key))).await;

                for (candidate, head) in batch.iter().zip(heads) {
                    let content_type = match head {
                        Ok(head) => head.content_type,
                        Err(e) => {
                            tracing::debug!(
                                error = %e,
                                key = %candidate.key,
                                "Metadata lookup failed, skipping object"
                            );
                            continue;
                        }
                    };

                    let Some(content_type) = content_type.filter(|ct| is_video_file(ct)) else {
                        continue;
                    };

                    files.push(VideoFileInfo {
                        id: next_id,
                        name: file_name_from_key(&candidate.key).to_string(),
                        key: candidate.key.clone(),
                        size: candidate.size,
                        last_modified: candidate.last_modified,
                        content_type,
                    });
                    next_id += 1;
                }
            }

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        tracing::info!(
            bucket = %store.bucket(),
            pages = pages,
            videos = files.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video listing fetched"
        );

        Ok(files)
    }
}
