//! Contracts the core requires from external collaborators.

pub mod blob;

pub use blob::{BlobStore, ByteStream};
