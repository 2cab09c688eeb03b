//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file's metadata row.
///
/// Content bytes live in the blob store under `storage_key`; `size_bytes`
/// equals the byte length of that object. `folder_id` and `storage_key`
/// are immutable once created — only `name` may change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// Containing folder (null = the namespace root).
    pub folder_id: Option<Uuid>,
    /// File name, unique within its folder per user.
    pub name: String,
    /// MIME type, if known (e.g. `image/png`).
    pub mime_type: Option<String>,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Opaque unique key in the blob store.
    pub storage_key: String,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new file row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The owning user.
    pub user_id: Uuid,
    /// Containing folder (None = root).
    pub folder_id: Option<Uuid>,
    /// File name.
    pub name: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Blob store key.
    pub storage_key: String,
}

/// A file paired with a temporary signed access URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListing {
    /// The file metadata.
    #[serde(flatten)]
    pub file: File,
    /// Short-lived signed URL for direct content access.
    pub url: String,
}
