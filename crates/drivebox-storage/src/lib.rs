//! # drivebox-storage
//!
//! Blob store implementations for DriveBox: S3-compatible object stores
//! (AWS S3 or MinIO) and an in-memory store used by tests.

pub mod providers;

pub use providers::{MemoryBlobStore, S3BlobStore, from_config};
