//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder in a user's namespace tree.
///
/// `path` is the materialized path: the names of the folder and its
/// ancestors joined by `/` and bracketed by a leading and trailing `/`
/// (e.g. `/docs/2024/`). It is a derived index over the `parent_id`
/// links, kept in lockstep by every structural mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// Parent folder ID (null for root-level folders).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Full materialized path (e.g. `/docs/2024/`).
    pub path: String,
    /// Number of ancestors (0 for root-level folders).
    pub depth: i32,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The owning user.
    pub user_id: Uuid,
    /// Parent folder (None for root-level).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Full materialized path.
    pub path: String,
    /// Depth in the tree.
    pub depth: i32,
}

/// Result of a successful folder rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamedFolder {
    /// The renamed folder's ID.
    pub id: Uuid,
    /// The folder's path before the rename.
    pub old_path: String,
    /// The folder's path after the rename.
    pub new_path: String,
    /// Depth of the renamed folder.
    pub depth: i32,
}

/// Result of a successful subtree delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedFolder {
    /// The path of the deleted subtree root.
    pub deleted_path: String,
    /// Number of files removed along with the subtree.
    pub removed_files: u64,
    /// Total bytes released back to the user's quota.
    pub released_bytes: i64,
}
