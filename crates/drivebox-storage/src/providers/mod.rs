//! Blob store providers.

pub mod memory;
pub mod s3;

use std::sync::Arc;

use tracing::info;

use drivebox_core::config::StorageConfig;
use drivebox_core::error::AppError;
use drivebox_core::result::AppResult;
use drivebox_core::traits::blob::BlobStore;

pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

/// Construct the configured blob store backend.
pub async fn from_config(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.provider.as_str() {
        "s3" => Arc::new(S3BlobStore::new(&config.s3).await?),
        "memory" => Arc::new(MemoryBlobStore::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown blob store provider '{other}'"
            )));
        }
    };

    info!(provider = store.provider_type(), "Blob store initialized");
    Ok(store)
}
