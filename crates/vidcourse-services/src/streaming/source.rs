//! Where streamed bytes come from: the origin store, or the CDN through a
//! signed URL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use http::{header, StatusCode};
use vidcourse_storage::{BlobStore, ByteRange, ByteStream, ObjectHead, StorageError};

use crate::error::{ServiceError, ServiceResult};
use crate::signing::UrlSigner;

/// Resolves object size and type, and serves byte windows.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Authoritative size and content type of `key`.
    async fn head(&self, key: &str) -> ServiceResult<ObjectHead>;

    /// Stream the whole object, or only the inclusive `range`.
    async fn fetch(&self, key: &str, range: Option<ByteRange>) -> ServiceResult<ByteStream>;

    /// Short label for logs
    fn name(&self) -> &'static str;
}

/// Reads straight from the blob store.
pub struct OriginSource {
    store: Arc<dyn BlobStore>,
}

impl OriginSource {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ObjectSource for OriginSource {
    async fn head(&self, key: &str) -> ServiceResult<ObjectHead> {
        Ok(self.store.head_object(key).await?)
    }

    async fn fetch(&self, key: &str, range: Option<ByteRange>) -> ServiceResult<ByteStream> {
        Ok(self.store.get_object(key, range).await?)
    }

    fn name(&self) -> &'static str {
        "origin"
    }
}

/// Reads through the CDN edge using short-lived signed URLs.
pub struct CdnSource {
    client: reqwest::Client,
    signer: Arc<dyn UrlSigner>,
    url_ttl: Duration,
}

impl CdnSource {
    pub fn new(client: reqwest::Client, signer: Arc<dyn UrlSigner>, url_ttl: Duration) -> Self {
        Self {
            client,
            signer,
            url_ttl,
        }
    }

    fn signed_url(&self, key: &str) -> ServiceResult<String> {
        Ok(self.signer.sign(key, self.url_ttl)?.url)
    }
}

fn check_status(key: &str, status: StatusCode) -> ServiceResult<()> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::NOT_FOUND {
        Err(ServiceError::ObjectNotFound(key.to_string()))
    } else {
        Err(ServiceError::StoreUnavailable(format!(
            "CDN returned {} for {}",
            status, key
        )))
    }
}

#[async_trait]
impl ObjectSource for CdnSource {
    async fn head(&self, key: &str) -> ServiceResult<ObjectHead> {
        let start = std::time::Instant::now();
        let url = self.signed_url(key)?;

        let response = self.client.head(&url).send().await.map_err(|e| {
            tracing::error!(
                error = %e,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "CDN HEAD failed"
            );
            ServiceError::StoreUnavailable(e.to_string())
        })?;
        check_status(key, response.status())?;

        let headers = response.headers();
        let size = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| {
                ServiceError::StoreUnavailable(format!("CDN reported no size for {}", key))
            })?;
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        tracing::debug!(
            key = %key,
            size = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "CDN HEAD completed"
        );

        Ok(ObjectHead {
            size,
            content_type,
            last_modified: None,
        })
    }

    async fn fetch(&self, key: &str, range: Option<ByteRange>) -> ServiceResult<ByteStream> {
        let url = self.signed_url(key)?;

        let mut request = self.client.get(&url);
        if let Some(range) = range {
            request = request.header(header::RANGE, range.to_header_value());
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "CDN fetch failed");
            ServiceError::StoreUnavailable(e.to_string())
        })?;
        check_status(key, response.status())?;

        if range.is_some() && response.status() != StatusCode::PARTIAL_CONTENT {
            return Err(ServiceError::StoreUnavailable(format!(
                "CDN ignored the range request for {}",
                key
            )));
        }

        let key = key.to_string();
        let stream = response.bytes_stream().map(move |chunk| {
            chunk.map_err(|e| {
                tracing::error!(error = %e, key = %key, "CDN stream download error");
                StorageError::DownloadFailed(e.to_string())
            })
        });

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &'static str {
        "cdn"
    }
}
