//! Domain models shared across crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One servable video asset discovered in the blob store.
///
/// `id` is assigned in enumeration order starting at 1 and is not stable
/// across refreshes: every listing pass renumbers the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoFileInfo {
    pub id: u64,
    /// Base filename, path stripped from the storage key
    pub name: String,
    /// Full storage key, used to address the object for streaming
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub content_type: String,
}

/// Time-limited URL issued for a CDN-fronted object.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
