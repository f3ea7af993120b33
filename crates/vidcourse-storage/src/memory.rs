use crate::pagination::page_after;
use crate::traits::{
    BlobStore, ByteRange, ByteStream, ListPage, ListedObject, ObjectHead, StorageError,
    StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

const DEFAULT_PAGE_SIZE: usize = 1000;
const CHUNK_SIZE: usize = 64 * 1024;

/// In-memory blob store for development and tests.
///
/// Objects live in a key-ordered map behind a `RwLock`. Every call is counted
/// so callers can assert how often the store was hit, and the store can be
/// switched unavailable to simulate an outage.
#[derive(Clone)]
pub struct MemoryBlobStore {
    bucket: String,
    page_size: usize,
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    calls: Arc<CallCounters>,
    available: Arc<AtomicBool>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CallCounters {
    list: AtomicUsize,
    head: AtomicUsize,
    get: AtomicUsize,
}

/// Snapshot of how many times each store operation was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallCounts {
    pub list: usize,
    pub head: usize,
    pub get: usize,
}

impl MemoryBlobStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            page_size: DEFAULT_PAGE_SIZE,
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            calls: Arc::new(CallCounters::default()),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Insert or replace an object.
    pub async fn put_object(
        &self,
        key: impl Into<String>,
        content_type: Option<&str>,
        data: impl Into<Bytes>,
    ) {
        self.objects.write().await.insert(
            key.into(),
            StoredObject {
                data: data.into(),
                content_type: content_type.map(String::from),
                last_modified: Utc::now(),
            },
        );
    }

    /// Make every subsequent call fail with a backend error (or recover).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn counts(&self) -> CallCounts {
        CallCounts {
            list: self.calls.list.load(Ordering::SeqCst),
            head: self.calls.head.load(Ordering::SeqCst),
            get: self.calls.get.load(Ordering::SeqCst),
        }
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::BackendError(format!(
                "bucket {} is unavailable",
                self.bucket
            )))
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_objects(&self, continuation_token: Option<&str>) -> StorageResult<ListPage> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let entries: Vec<(String, StoredObject)> = self
            .objects
            .read()
            .await
            .iter()
            .map(|(key, object)| (key.clone(), object.clone()))
            .collect();

        let (page, next_continuation_token) =
            page_after(&entries, continuation_token, self.page_size);

        let items = page
            .iter()
            .map(|(key, object)| ListedObject {
                key: Some(key.clone()),
                size: Some(object.data.len() as u64),
                last_modified: Some(object.last_modified),
            })
            .collect();

        Ok(ListPage {
            items,
            next_continuation_token,
        })
    }

    async fn head_object(&self, key: &str) -> StorageResult<ObjectHead> {
        self.calls.head.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let objects = self.objects.read().await;
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        Ok(ObjectHead {
            size: object.data.len() as u64,
            content_type: object.content_type.clone(),
            last_modified: Some(object.last_modified),
        })
    }

    async fn get_object(&self, key: &str, range: Option<ByteRange>) -> StorageResult<ByteStream> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let data = {
            let objects = self.objects.read().await;
            objects
                .get(key)
                .map(|object| object.data.clone())
                .ok_or_else(|| StorageError::NotFound(key.to_string()))?
        };

        let body = match range {
            Some(range) => {
                let start = range.start as usize;
                let end = (range.end as usize).min(data.len().saturating_sub(1));
                if start >= data.len() || start > end {
                    return Err(StorageError::DownloadFailed(format!(
                        "range {}-{} outside object of {} bytes",
                        range.start,
                        range.end,
                        data.len()
                    )));
                }
                data.slice(start..=end)
            }
            None => data,
        };

        let chunks: Vec<StorageResult<Bytes>> = (0..body.len())
            .step_by(CHUNK_SIZE)
            .map(|offset| Ok(body.slice(offset..(offset + CHUNK_SIZE).min(body.len()))))
            .collect();

        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_memory_store_counts_calls() {
        let store = MemoryBlobStore::new("videos");
        store
            .put_object("intro.mp4", Some("video/mp4"), &b"0123456789"[..])
            .await;

        store.list_objects(None).await.unwrap();
        store.head_object("intro.mp4").await.unwrap();
        store.head_object("intro.mp4").await.unwrap();
        store.get_object("intro.mp4", None).await.unwrap();

        assert_eq!(
            store.counts(),
            CallCounts {
                list: 1,
                head: 2,
                get: 1
            }
        );
    }

    #[tokio::test]
    async fn test_memory_store_ranged_read() {
        let store = MemoryBlobStore::new("videos");
        store
            .put_object("intro.mp4", Some("video/mp4"), &b"0123456789"[..])
            .await;

        let stream = store
            .get_object("intro.mp4", Some(ByteRange::new(7, 9)))
            .await
            .unwrap();
        assert_eq!(collect(stream).await, b"789");
    }

    #[tokio::test]
    async fn test_memory_store_empty_object_streams_nothing() {
        let store = MemoryBlobStore::new("videos");
        store.put_object("empty.mp4", Some("video/mp4"), Bytes::new()).await;

        let stream = store.get_object("empty.mp4", None).await.unwrap();
        assert!(collect(stream).await.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_unavailable() {
        let store = MemoryBlobStore::new("videos");
        store.set_available(false);

        let result = store.list_objects(None).await;
        assert!(matches!(result, Err(StorageError::BackendError(_))));
        assert_eq!(store.counts().list, 1);

        store.set_available(true);
        assert!(store.list_objects(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_store_pages() {
        let store = MemoryBlobStore::new("videos").with_page_size(1);
        store.put_object("a.mp4", None, &b"a"[..]).await;
        store.put_object("b.mp4", None, &b"b"[..]).await;

        let first = store.list_objects(None).await.unwrap();
        assert_eq!(first.next_continuation_token.as_deref(), Some("a.mp4"));
        let second = store
            .list_objects(first.next_continuation_token.as_deref())
            .await
            .unwrap();
        assert_eq!(second.items[0].key.as_deref(), Some("b.mp4"));
        assert!(second.next_continuation_token.is_none());
    }
}
