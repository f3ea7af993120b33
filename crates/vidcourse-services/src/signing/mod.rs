//! Signed URL issuance for CDN-fronted objects.

mod cloudfront;

pub use cloudfront::CloudFrontSigner;

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Signature generation failed: {0}")]
    SignatureFailed(String),

    #[error("Invalid validity window: {0}")]
    InvalidExpiry(String),
}

/// A URL usable until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues time-limited URLs for object paths.
///
/// Signing is local: no network call is made.
pub trait UrlSigner: Send + Sync {
    /// Sign `object_path` (a storage key) for `valid_for` from now.
    fn sign(&self, object_path: &str, valid_for: Duration) -> Result<SignedUrl, SigningError>;
}
