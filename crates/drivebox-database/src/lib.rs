//! # drivebox-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for the DriveBox namespace engine. All SQL lives in
//! this crate; transactional mutations take `&mut PgConnection` so the
//! service layer can compose them into a single transaction.

pub mod connection;
pub mod migration;
pub mod repositories;
