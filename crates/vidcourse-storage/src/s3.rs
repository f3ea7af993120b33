use crate::traits::{
    BlobStore, ByteRange, ByteStream, ListPage, ListedObject, ObjectHead, StorageError,
    StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, GetOptions, GetRange, ObjectStore};

/// S3 blob store implementation
#[derive(Clone)]
pub struct S3BlobStore {
    store: AmazonS3,
    bucket: String,
    prefix: Option<Path>,
    page_size: usize,
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `prefix` - Optional key prefix; only objects below it are listed
    /// * `page_size` - Number of objects returned per listing page
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        prefix: Option<String>,
        page_size: usize,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3BlobStore {
            store,
            bucket,
            prefix: prefix.map(Path::from),
            page_size: page_size.max(1),
        })
    }

    fn map_read_error(&self, key: &str, err: ObjectStoreError) -> StorageError {
        match err {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_objects(&self, continuation_token: Option<&str>) -> StorageResult<ListPage> {
        let start = std::time::Instant::now();

        // The token is the last key of the previous page; S3 resumes with start-after.
        let offset = continuation_token.map(|token| Path::from(token.to_string()));
        let mut listing = match offset {
            Some(ref offset) => self.store.list_with_offset(self.prefix.as_ref(), offset),
            None => self.store.list(self.prefix.as_ref()),
        };

        let mut items = Vec::with_capacity(self.page_size.min(1000));
        while items.len() < self.page_size {
            match listing.next().await {
                Some(Ok(meta)) => items.push(ListedObject {
                    key: Some(meta.location.to_string()),
                    size: Some(meta.size),
                    last_modified: Some(meta.last_modified),
                }),
                Some(Err(e)) => {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 list failed"
                    );
                    return Err(StorageError::ListFailed(e.to_string()));
                }
                None => break,
            }
        }

        let next_continuation_token = if items.len() == self.page_size {
            items.last().and_then(|item| item.key.clone())
        } else {
            None
        };

        tracing::debug!(
            bucket = %self.bucket,
            items = items.len(),
            has_more = next_continuation_token.is_some(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list page fetched"
        );

        Ok(ListPage {
            items,
            next_continuation_token,
        })
    }

    async fn head_object(&self, key: &str) -> StorageResult<ObjectHead> {
        let location = Path::from(key.to_string());
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        let result = self
            .store
            .get_opts(&location, options)
            .await
            .map_err(|e| self.map_read_error(key, e))?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());

        Ok(ObjectHead {
            size: result.meta.size,
            content_type,
            last_modified: Some(result.meta.last_modified),
        })
    }

    async fn get_object(&self, key: &str, range: Option<ByteRange>) -> StorageResult<ByteStream> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());
        let options = GetOptions {
            range: range.map(|r| GetRange::Bounded(r.as_exclusive())),
            ..Default::default()
        };

        let result = self.store.get_opts(&location, options).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 get failed"
            );
            self.map_read_error(key, e)
        })?;

        let bucket = self.bucket.clone();
        let key = key.to_string();

        let stream = result.into_stream().map(move |res| match res {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 stream download error"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        });

        Ok(Box::pin(stream))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
