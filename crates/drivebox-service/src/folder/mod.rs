//! Namespace tree services.

pub mod service;
pub mod tree;

pub use service::FolderService;
