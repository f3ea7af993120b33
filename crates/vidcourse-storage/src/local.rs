use crate::pagination::page_after;
use crate::traits::{
    BlobStore, ByteRange, ByteStream, ListPage, ListedObject, ObjectHead, StorageError,
    StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Local filesystem blob store implementation
///
/// Keys are paths relative to `base_path` using `/` separators. Content types
/// are derived from the file extension since plain files carry none.
#[derive(Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
    bucket: String,
    page_size: usize,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory holding the video files (e.g., "/var/lib/vidcourse/videos")
    /// * `page_size` - Number of objects returned per listing page
    pub async fn new(base_path: impl Into<PathBuf>, page_size: usize) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let bucket = base_path.display().to_string();

        Ok(LocalBlobStore {
            base_path,
            bucket,
            page_size: page_size.max(1),
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys with path traversal sequences that could escape the base
    /// storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.starts_with('/')
            || storage_key.split('/').any(|segment| segment == "..")
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Walk the directory tree and collect every regular file, sorted by key.
    async fn collect_files(&self) -> StorageResult<Vec<(String, std::fs::Metadata)>> {
        let mut files = Vec::new();
        let mut pending = vec![self.base_path.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                let path = entry.path();
                if metadata.is_dir() {
                    pending.push(path);
                } else if metadata.is_file() {
                    if let Some(key) = self.path_to_key(&path) {
                        files.push((key, metadata));
                    }
                }
            }
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }

    fn path_to_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_path).ok()?;
        let segments: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(segments.join("/"))
    }
}

fn modified_at(metadata: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

/// Content type for a file name, from its extension.
pub fn content_type_for(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "ts" => "video/mp2t",
        "m3u8" => "application/x-mpegURL",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "vtt" => "text/vtt",
        "srt" => "application/x-subrip",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_objects(&self, continuation_token: Option<&str>) -> StorageResult<ListPage> {
        let files = self
            .collect_files()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;

        let (page, next_continuation_token) =
            page_after(&files, continuation_token, self.page_size);

        let items = page
            .iter()
            .map(|(key, metadata)| ListedObject {
                key: Some(key.clone()),
                size: Some(metadata.len()),
                last_modified: modified_at(metadata),
            })
            .collect();

        Ok(ListPage {
            items,
            next_continuation_token,
        })
    }

    async fn head_object(&self, key: &str) -> StorageResult<ObjectHead> {
        let path = self.key_to_path(key)?;

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(StorageError::NotFound(key.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => return Err(StorageError::BackendError(e.to_string())),
        };

        Ok(ObjectHead {
            size: metadata.len(),
            content_type: Some(content_type_for(key).to_string()),
            last_modified: modified_at(&metadata),
        })
    }

    async fn get_object(&self, key: &str, range: Option<ByteRange>) -> StorageResult<ByteStream> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                ))
            }
        })?;

        let key = key.to_string();
        let path_display = path.display().to_string();

        let stream: ByteStream = match range {
            Some(range) => {
                file.seek(std::io::SeekFrom::Start(range.start))
                    .await
                    .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
                let reader = tokio_util::io::ReaderStream::new(file.take(range.length()));
                Box::pin(reader.map(|r| r.map_err(StorageError::from)))
            }
            None => {
                let reader = tokio_util::io::ReaderStream::new(file);
                Box::pin(reader.map(|r| r.map_err(StorageError::from)))
            }
        };

        let logged_stream = stream.map(move |item| {
            if item.is_err() {
                tracing::error!(
                    path = %path_display,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream download error"
                );
            }
            item
        });

        Ok(Box::pin(logged_stream))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    async fn store_with_files(files: &[(&str, &[u8])]) -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempdir().unwrap();
        for (key, data) in files {
            let path = dir.path().join(key);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, data).unwrap();
        }
        let store = LocalBlobStore::new(dir.path(), 2).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_local_list_paginates_in_key_order() {
        let (_dir, store) = store_with_files(&[
            ("b.mp4", b"bb"),
            ("a.mp4", b"a"),
            ("lessons/c.webm", b"ccc"),
        ])
        .await;

        let first = store.list_objects(None).await.unwrap();
        let keys: Vec<_> = first.items.iter().filter_map(|i| i.key.clone()).collect();
        assert_eq!(keys, vec!["a.mp4", "b.mp4"]);
        assert_eq!(first.items[1].size, Some(2));

        let second = store
            .list_objects(first.next_continuation_token.as_deref())
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].key.as_deref(), Some("lessons/c.webm"));
        assert!(second.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_local_head_reports_content_type_from_extension() {
        let (_dir, store) = store_with_files(&[("intro.mp4", b"0123456789")]).await;

        let head = store.head_object("intro.mp4").await.unwrap();
        assert_eq!(head.size, 10);
        assert_eq!(head.content_type.as_deref(), Some("video/mp4"));
        assert!(head.last_modified.is_some());
    }

    #[tokio::test]
    async fn test_local_head_missing_is_not_found() {
        let (_dir, store) = store_with_files(&[]).await;
        let result = store.head_object("missing.mp4").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_local_ranged_read_returns_window() {
        let (_dir, store) = store_with_files(&[("clip.mp4", b"0123456789")]).await;

        let stream = store
            .get_object("clip.mp4", Some(ByteRange::new(2, 5)))
            .await
            .unwrap();
        assert_eq!(collect(stream).await, b"2345");

        let stream = store.get_object("clip.mp4", None).await.unwrap();
        assert_eq!(collect(stream).await, b"0123456789");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (_dir, store) = store_with_files(&[]).await;

        let result = store.head_object("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store.get_object("/etc/passwd", None).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("a/b/lesson.MP4"), "video/mp4");
        assert_eq!(content_type_for("stream.m3u8"), "application/x-mpegURL");
        assert_eq!(content_type_for("cover.png"), "image/png");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
