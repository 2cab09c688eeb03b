//! Blob store contract.
//!
//! File contents live in an external object store; metadata and quota
//! bookkeeping never touch it. Keys are opaque strings chosen by the file
//! registry — the store never interprets them.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends.
///
/// Implemented in `drivebox-storage` for S3-compatible stores and for an
/// in-memory store used by tests.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3", "memory").
    fn provider_type(&self) -> &str;

    /// Write an object under the given key, replacing any existing one.
    async fn put(&self, key: &str, data: Bytes, mime_type: Option<&str>) -> AppResult<()>;

    /// Delete the object under the given key.
    ///
    /// Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Open the object under the given key as a byte stream.
    async fn get_stream(&self, key: &str) -> AppResult<ByteStream>;

    /// Produce a temporary signed access URL for the object.
    ///
    /// Expiry is enforced by the store, not by the caller.
    async fn signed_url(&self, key: &str, ttl: Duration) -> AppResult<String>;
}
