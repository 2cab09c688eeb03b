//! # drivebox-core
//!
//! Core crate for DriveBox. Contains the path codec, configuration
//! schemas, the blob store contract, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DriveBox crates.

pub mod config;
pub mod error;
pub mod path;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
