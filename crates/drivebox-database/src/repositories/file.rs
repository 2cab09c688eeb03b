//! File repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use drivebox_core::error::AppError;
use drivebox_core::result::AppResult;
use drivebox_entity::file::model::{CreateFile, File};

use super::{escape_like, map_db_err, violates_constraint};

/// Repository for file metadata rows.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_err("Failed to find file", e))
    }

    /// List files in a folder (None = root), newest first.
    pub async fn find_by_folder(
        &self,
        user_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE user_id = $1 AND folder_id IS NOT DISTINCT FROM $2 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to list files", e))
    }

    /// Check whether a file with the given name already exists in a folder.
    ///
    /// Pre-check only; the unique constraint is the actual guarantee.
    pub async fn exists_in_folder(
        &self,
        user_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<bool> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM files \
             WHERE user_id = $1 AND folder_id IS NOT DISTINCT FROM $2 AND name = $3",
        )
        .bind(user_id)
        .bind(folder_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to check for duplicate file", e))?;
        Ok(found.is_some())
    }

    /// Insert a new file row. Must run inside the caller's transaction so
    /// the insert commits together with the quota reservation.
    pub async fn insert(&self, conn: &mut PgConnection, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (user_id, folder_id, name, mime_type, size_bytes, storage_key) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.storage_key)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if violates_constraint(&e, "files_user_folder_name_key") {
                AppError::name_collision(format!(
                    "A file named '{}' already exists in this folder",
                    data.name
                ))
            } else if violates_constraint(&e, "files_folder_id_fkey") {
                // The folder was deleted between the ownership check and
                // this insert.
                AppError::not_found("Folder not found")
            } else {
                map_db_err("Failed to create file", e)
            }
        })
    }

    /// Rename a file. `folder_id` and `storage_key` are immutable.
    pub async fn rename(&self, user_id: Uuid, file_id: Uuid, new_name: &str) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET name = $3, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(file_id)
        .bind(user_id)
        .bind(new_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if violates_constraint(&e, "files_user_folder_name_key") {
                AppError::name_collision(format!(
                    "A file named '{new_name}' already exists in this folder"
                ))
            } else {
                map_db_err("Failed to rename file", e)
            }
        })?
        .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// Delete a single file row inside the caller's transaction.
    pub async fn delete(&self, conn: &mut PgConnection, file_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file_id)
            .execute(conn)
            .await
            .map_err(|e| map_db_err("Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Enumerate every file contained in the subtree rooted at
    /// `path_prefix`, via the containing folders' materialized paths.
    /// Row-locks the files for the caller's transaction.
    pub async fn find_in_subtree(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        path_prefix: &str,
    ) -> AppResult<Vec<File>> {
        let pattern = format!("{}%", escape_like(path_prefix));
        sqlx::query_as::<_, File>(
            "SELECT f.* FROM files f \
             JOIN folders d ON f.folder_id = d.id \
             WHERE d.user_id = $1 AND d.path LIKE $2 ESCAPE '\\' \
             FOR UPDATE OF f",
        )
        .bind(user_id)
        .bind(&pattern)
        .fetch_all(conn)
        .await
        .map_err(|e| map_db_err("Failed to enumerate subtree files", e))
    }

    /// Delete every file contained in the subtree rooted at `path_prefix`.
    /// Must run inside the caller's transaction.
    pub async fn delete_in_subtree(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        path_prefix: &str,
    ) -> AppResult<u64> {
        let pattern = format!("{}%", escape_like(path_prefix));
        let result = sqlx::query(
            "DELETE FROM files f \
             USING folders d \
             WHERE f.folder_id = d.id \
               AND d.user_id = $1 AND d.path LIKE $2 ESCAPE '\\'",
        )
        .bind(user_id)
        .bind(&pattern)
        .execute(conn)
        .await
        .map_err(|e| map_db_err("Failed to delete subtree files", e))?;
        Ok(result.rows_affected())
    }
}
