//! Range-correct object streaming.

use std::sync::Arc;

use http::{header, HeaderMap, HeaderValue, StatusCode};
use vidcourse_storage::ByteStream;

use super::range::resolve_range;
use super::source::ObjectSource;
use crate::error::{ServiceError, ServiceResult};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Status, headers and body of a streaming response.
pub struct StreamedObject {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl std::fmt::Debug for StreamedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamedObject")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
}

#[derive(Clone)]
pub struct RangeStreamer {
    source: Arc<dyn ObjectSource>,
}

impl RangeStreamer {
    pub fn new(source: Arc<dyn ObjectSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Stream `key`, honouring an optional `Range` header value.
    ///
    /// No range (or a blank one) serves the whole object with 200. A range
    /// serves exactly the resolved window with 206, or fails with
    /// `RangeNotSatisfiable` when the window falls outside the object.
    pub async fn stream_object(
        &self,
        key: &str,
        range_header: Option<&str>,
    ) -> ServiceResult<StreamedObject> {
        if key.trim().is_empty() {
            return Err(ServiceError::BadRequest("key required".to_string()));
        }

        let head = self.source.head(key).await?;
        let total_size = head.size;
        let content_type = head
            .content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header_value(&content_type));
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

        let range_header = range_header.map(str::trim).filter(|r| !r.is_empty());

        let Some(range_header) = range_header else {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(total_size));

            let body: ByteStream = if total_size == 0 {
                Box::pin(futures::stream::empty())
            } else {
                self.source.fetch(key, None).await?
            };

            tracing::debug!(
                key = %key,
                source = self.source.name(),
                total_size = total_size,
                "Streaming full object"
            );
            return Ok(StreamedObject {
                status: StatusCode::OK,
                headers,
                body,
            });
        };

        let window = resolve_range(range_header, total_size).inspect_err(|_| {
            tracing::debug!(
                key = %key,
                range = %range_header,
                total_size = total_size,
                "Unsatisfiable range requested"
            );
        })?;

        let body = self.source.fetch(key, Some(window.byte_range())).await?;

        headers.insert(
            header::CONTENT_RANGE,
            header_value(&window.content_range()),
        );
        headers.insert(
            header::CONTENT_LENGTH,
            HeaderValue::from(window.content_length()),
        );

        tracing::debug!(
            key = %key,
            source = self.source.name(),
            start = window.start,
            end = window.end,
            total_size = total_size,
            "Streaming partial object"
        );

        Ok(StreamedObject {
            status: StatusCode::PARTIAL_CONTENT,
            headers,
            body,
        })
    }
}
