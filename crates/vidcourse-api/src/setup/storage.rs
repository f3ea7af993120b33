//! Blob store setup

use anyhow::{Context, Result};
use std::sync::Arc;
use vidcourse_core::Config;
use vidcourse_storage::{create_blob_store, BlobStore};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn BlobStore>> {
    let store = create_blob_store(config)
        .await
        .context("Failed to initialize blob store")?;

    tracing::info!(
        backend = %store.backend_type(),
        bucket = %store.bucket(),
        "Blob store initialized"
    );

    Ok(store)
}
