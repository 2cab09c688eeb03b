//! User quota domain entities.
//!
//! Identity itself is owned by an external collaborator; DriveBox keeps
//! only the per-user storage ledger.

pub mod model;
pub mod quota;

pub use model::UserQuota;
pub use quota::StorageQuota;
