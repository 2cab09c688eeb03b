//! # drivebox-service
//!
//! Business logic service layer for DriveBox: the namespace tree
//! (folders and their materialized paths), the file registry, and quota
//! usage reporting. Each service orchestrates repositories and the blob
//! store to implement one logical operation per call.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod file;
pub mod folder;
pub mod quota;
mod retry;

pub use file::FileService;
pub use folder::FolderService;
pub use quota::QuotaService;
