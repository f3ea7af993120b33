//! A stand-in CDN edge: serves objects from a memory store, but only for
//! URLs carrying CloudFront signing parameters.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vidcourse_services::{OriginSource, RangeStreamer, ServiceError, StreamedObject};
use vidcourse_storage::{BlobStore, MemoryBlobStore};

pub struct FakeCdn {
    pub addr: SocketAddr,
    pub store: MemoryBlobStore,
    requests: Arc<AtomicUsize>,
}

impl FakeCdn {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests that reached the edge, signed or not
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct EdgeState {
    streamer: RangeStreamer,
    key_pair_id: String,
    requests: Arc<AtomicUsize>,
}

async fn edge(
    State(state): State<EdgeState>,
    Path(key): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let signed = params.contains_key("Expires")
        && params.contains_key("Signature")
        && params.get("Key-Pair-Id") == Some(&state.key_pair_id);
    if !signed {
        return StatusCode::FORBIDDEN.into_response();
    }

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());
    match state.streamer.stream_object(&key, range).await {
        Ok(StreamedObject {
            status,
            headers,
            body,
        }) => {
            let mut response = Response::new(Body::from_stream(body));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(ServiceError::ObjectNotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(ServiceError::RangeNotSatisfiable { .. }) => {
            StatusCode::RANGE_NOT_SATISFIABLE.into_response()
        }
        Err(_) => StatusCode::BAD_GATEWAY.into_response(),
    }
}

/// Start the edge on an ephemeral local port.
pub async fn start_fake_cdn(store: MemoryBlobStore, key_pair_id: &str) -> FakeCdn {
    let blob_store: Arc<dyn BlobStore> = Arc::new(store.clone());
    let requests = Arc::new(AtomicUsize::new(0));
    let state = EdgeState {
        streamer: RangeStreamer::new(Arc::new(OriginSource::new(blob_store))),
        key_pair_id: key_pair_id.to_string(),
        requests: requests.clone(),
    };

    let app = Router::new()
        .route("/{*key}", get(edge))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake cdn");
    let addr = listener.local_addr().expect("fake cdn addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake cdn server");
    });

    FakeCdn {
        addr,
        store,
        requests,
    }
}
