//! Scripted blob stores for exercising the catalog without a real backend.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use vidcourse_storage::{
    BlobStore, ByteRange, ByteStream, ListPage, ListedObject, MemoryBlobStore, ObjectHead,
    StorageBackend, StorageError, StorageResult,
};

pub fn listed(key: &str, size: u64) -> ListedObject {
    ListedObject {
        key: Some(key.to_string()),
        size: Some(size),
        last_modified: Some(timestamp()),
    }
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Store whose listing pages and HEAD answers are fixed up front.
///
/// Tracks the peak number of concurrent HEAD calls.
#[derive(Default)]
pub struct ScriptedStore {
    pages: Vec<Vec<ListedObject>>,
    content_types: HashMap<String, Option<String>>,
    failing_heads: HashSet<String>,
    pub list_calls: AtomicUsize,
    pub head_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(pages: Vec<Vec<ListedObject>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, key: &str, content_type: &str) -> Self {
        self.content_types
            .insert(key.to_string(), Some(content_type.to_string()));
        self
    }

    pub fn with_failing_head(mut self, key: &str) -> Self {
        self.failing_heads.insert(key.to_string());
        self
    }
}

#[async_trait]
impl BlobStore for ScriptedStore {
    fn bucket(&self) -> &str {
        "scripted"
    }

    async fn list_objects(&self, continuation_token: Option<&str>) -> StorageResult<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let index: usize = match continuation_token {
            Some(token) => token
                .parse()
                .map_err(|_| StorageError::ListFailed(format!("bad token {}", token)))?,
            None => 0,
        };
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_continuation_token =
            (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(ListPage {
            items,
            next_continuation_token,
        })
    }

    async fn head_object(&self, key: &str) -> StorageResult<ObjectHead> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Let sibling futures start before this one resolves
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_heads.contains(key) {
            return Err(StorageError::BackendError("head failed".to_string()));
        }
        let content_type = self
            .content_types
            .get(key)
            .cloned()
            .unwrap_or_else(|| Some("video/mp4".to_string()));
        Ok(ObjectHead {
            size: 0,
            content_type,
            last_modified: None,
        })
    }

    async fn get_object(&self, key: &str, _range: Option<ByteRange>) -> StorageResult<ByteStream> {
        Err(StorageError::NotFound(key.to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

/// Memory store whose listing blocks until the gate is opened.
#[derive(Clone)]
pub struct GatedStore {
    pub inner: MemoryBlobStore,
    gate: Arc<watch::Sender<bool>>,
}

impl GatedStore {
    pub fn new(inner: MemoryBlobStore) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            inner,
            gate: Arc::new(gate),
        }
    }

    pub fn close(&self) {
        self.gate.send_replace(false);
    }

    pub fn open(&self) {
        self.gate.send_replace(true);
    }
}

#[async_trait]
impl BlobStore for GatedStore {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn list_objects(&self, continuation_token: Option<&str>) -> StorageResult<ListPage> {
        let result = self.inner.list_objects(continuation_token).await;
        let mut gate = self.gate.subscribe();
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(StorageError::BackendError("gate dropped".to_string()));
        }
        result
    }

    async fn head_object(&self, key: &str) -> StorageResult<ObjectHead> {
        self.inner.head_object(key).await
    }

    async fn get_object(&self, key: &str, range: Option<ByteRange>) -> StorageResult<ByteStream> {
        self.inner.get_object(key, range).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// Memory store preloaded with three course videos and a cover image.
pub async fn course_store() -> MemoryBlobStore {
    let store = MemoryBlobStore::new("course-videos");
    store
        .put_object("lessons/01-intro.mp4", Some("video/mp4"), vec![1u8; 1000])
        .await;
    store
        .put_object("lessons/02-setup.webm", Some("video/webm"), vec![2u8; 500])
        .await;
    store
        .put_object("lessons/cover.png", Some("image/png"), vec![3u8; 10])
        .await;
    store
        .put_object("lessons/playlist.m3u8", Some("application/x-mpegURL"), vec![4u8; 20])
        .await;
    store
}
