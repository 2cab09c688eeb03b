//! In-memory blob store.
//!
//! Backs the service-layer tests; keeps full objects in a map and mimics
//! the S3 provider's contract, including idempotent deletes.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;

use drivebox_core::error::AppError;
use drivebox_core::result::AppResult;
use drivebox_core::traits::blob::{BlobStore, ByteStream};

/// A stored object: content plus optional MIME type.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    mime_type: Option<String>,
}

/// Blob store keeping all objects in process memory.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    /// When set, `put` fails — used to exercise compensation paths.
    fail_writes: RwLock<bool>,
}

impl MemoryBlobStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an object exists under the given key.
    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().expect("lock poisoned").contains_key(key)
    }

    /// Make every subsequent `put` fail (test hook).
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write().expect("lock poisoned") = fail;
    }

    /// The MIME type recorded for a key, if any.
    pub fn mime_type_of(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(key)
            .and_then(|o| o.mime_type.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn put(&self, key: &str, data: Bytes, mime_type: Option<&str>) -> AppResult<()> {
        if *self.fail_writes.read().expect("lock poisoned") {
            return Err(AppError::blob_write(format!(
                "Simulated write failure for '{key}'"
            )));
        }
        self.objects.write().expect("lock poisoned").insert(
            key.to_string(),
            StoredObject {
                data,
                mime_type: mime_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        // Deleting an absent key is not an error.
        self.objects.write().expect("lock poisoned").remove(key);
        Ok(())
    }

    async fn get_stream(&self, key: &str) -> AppResult<ByteStream> {
        let data = self
            .objects
            .read()
            .expect("lock poisoned")
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| AppError::not_found(format!("Object '{key}' not found")))?;
        Ok(Box::pin(stream::iter(vec![Ok(data)])))
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> AppResult<String> {
        if !self.contains(key) {
            return Err(AppError::not_found(format!("Object '{key}' not found")));
        }
        Ok(format!("memory://{key}?expires_in={}", ttl.as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivebox_core::error::ErrorKind;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryBlobStore::new();
        store
            .put("u1/abc-hello.txt", Bytes::from("hello"), Some("text/plain"))
            .await
            .unwrap();

        assert!(store.contains("u1/abc-hello.txt"));
        assert_eq!(
            store.mime_type_of("u1/abc-hello.txt").as_deref(),
            Some("text/plain")
        );

        let mut stream = store.get_stream("u1/abc-hello.txt").await.unwrap();
        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(chunk, Bytes::from("hello"));

        store.delete("u1/abc-hello.txt").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let store = MemoryBlobStore::new();
        store.delete("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryBlobStore::new();
        let err = store.get_stream("missing").await.map(|_| ()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_signed_url_embeds_ttl() {
        let store = MemoryBlobStore::new();
        store
            .put("k", Bytes::from_static(b"x"), None)
            .await
            .unwrap();
        let url = store.signed_url("k", Duration::from_secs(300)).await.unwrap();
        assert_eq!(url, "memory://k?expires_in=300");
    }

    #[tokio::test]
    async fn test_simulated_write_failure() {
        let store = MemoryBlobStore::new();
        store.set_fail_writes(true);
        let err = store
            .put("k", Bytes::from_static(b"x"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BlobWriteFailed);
        assert!(store.is_empty());
    }
}
