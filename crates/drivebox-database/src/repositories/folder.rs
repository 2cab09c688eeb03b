//! Folder repository implementation.
//!
//! Every query is scoped by `user_id`; a folder owned by another user is
//! indistinguishable from a missing one.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use drivebox_core::result::AppResult;
use drivebox_entity::folder::model::{CreateFolder, Folder};

use super::{escape_like, map_db_err, violates_constraint};
use drivebox_core::error::AppError;

/// Repository for folder CRUD and materialized-path tree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a folder by ID.
    pub async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_err("Failed to find folder", e))
    }

    /// Find a folder by its exact canonical path.
    pub async fn find_by_path(&self, user_id: Uuid, path: &str) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE user_id = $1 AND path = $2")
            .bind(user_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_err("Failed to find folder by path", e))
    }

    /// List direct children of a folder (None = root level), sorted by name.
    pub async fn find_children(
        &self,
        user_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE user_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY name ASC",
        )
        .bind(user_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to list children", e))
    }

    /// Check whether a sibling with the given name already exists. Runs
    /// on the caller's transaction.
    ///
    /// This is an optimization for a friendlier error; the unique
    /// constraint is the actual guarantee.
    pub async fn sibling_exists(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<bool> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM folders \
             WHERE user_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND name = $3",
        )
        .bind(user_id)
        .bind(parent_id)
        .bind(name)
        .fetch_optional(conn)
        .await
        .map_err(|e| map_db_err("Failed to check for sibling folder", e))?;
        Ok(found.is_some())
    }

    /// Create a new folder. Must run inside the caller's transaction,
    /// after the parent row has been share-locked, so the path and depth
    /// it carries cannot go stale before the commit.
    pub async fn create(&self, conn: &mut PgConnection, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (user_id, parent_id, name, path, depth) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.path)
        .bind(data.depth)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if violates_constraint(&e, "folders_user_parent_name_key")
                || violates_constraint(&e, "folders_user_path_key")
            {
                AppError::name_collision(format!(
                    "A folder named '{}' already exists in this location",
                    data.name
                ))
            } else {
                map_db_err("Failed to create folder", e)
            }
        })
    }

    /// Look up a folder and take a row lock on it for the duration of the
    /// caller's transaction. Serializes structural mutations of
    /// overlapping subtrees.
    pub async fn lock_for_update(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| map_db_err("Failed to lock folder", e))
    }

    /// Look up a folder and take a shared row lock on it for the duration
    /// of the caller's transaction.
    ///
    /// FOR SHARE conflicts with the row locks a subtree rewrite or delete
    /// takes, so a child created from this read cannot commit against a
    /// parent whose path has moved underneath it.
    pub async fn lock_for_share(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE id = $1 AND user_id = $2 FOR SHARE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| map_db_err("Failed to share-lock folder", e))
    }

    /// Row-lock every folder in the subtree rooted at `path_prefix` for
    /// the caller's transaction.
    ///
    /// FOR UPDATE conflicts both with the share lock a concurrent child
    /// creation holds on its parent and with the key-share lock a file
    /// insert holds on its containing folder, so structural mutations
    /// serialize against in-flight inserts anywhere in the subtree.
    pub async fn lock_subtree(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        path_prefix: &str,
    ) -> AppResult<u64> {
        let pattern = format!("{}%", escape_like(path_prefix));
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM folders \
             WHERE user_id = $1 AND path LIKE $2 ESCAPE '\\' FOR UPDATE",
        )
        .bind(user_id)
        .bind(&pattern)
        .fetch_all(conn)
        .await
        .map_err(|e| map_db_err("Failed to lock subtree", e))?;
        Ok(ids.len() as u64)
    }

    /// Rewrite the materialized paths of an entire subtree in one bulk
    /// update: every row whose path starts with `old_prefix` has that
    /// prefix replaced by `new_prefix`, remainder untouched. Includes the
    /// subtree root itself. Must run inside the caller's transaction.
    pub async fn rewrite_subtree_paths(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<u64> {
        let pattern = format!("{}%", escape_like(old_prefix));
        let result = sqlx::query(
            "UPDATE folders \
             SET path = $2 || substring(path FROM char_length($1) + 1), updated_at = NOW() \
             WHERE user_id = $3 AND path LIKE $4 ESCAPE '\\'",
        )
        .bind(old_prefix)
        .bind(new_prefix)
        .bind(user_id)
        .bind(&pattern)
        .execute(conn)
        .await
        .map_err(|e| {
            if violates_constraint(&e, "folders_user_path_key") {
                AppError::name_collision("A folder with the target path already exists")
            } else {
                map_db_err("Failed to rewrite subtree paths", e)
            }
        })?;
        Ok(result.rows_affected())
    }

    /// Update a folder's own name. Must run inside the caller's
    /// transaction, after the subtree path rewrite.
    pub async fn set_name(
        &self,
        conn: &mut PgConnection,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<()> {
        sqlx::query("UPDATE folders SET name = $2, updated_at = NOW() WHERE id = $1")
            .bind(folder_id)
            .bind(name)
            .execute(conn)
            .await
            .map_err(|e| {
                if violates_constraint(&e, "folders_user_parent_name_key") {
                    AppError::name_collision(format!(
                        "A folder named '{name}' already exists in this location"
                    ))
                } else {
                    map_db_err("Failed to rename folder", e)
                }
            })?;
        Ok(())
    }

    /// Delete every folder whose path starts with `path_prefix` (the
    /// subtree root included). Must run inside the caller's transaction.
    pub async fn delete_subtree(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        path_prefix: &str,
    ) -> AppResult<u64> {
        let pattern = format!("{}%", escape_like(path_prefix));
        let result = sqlx::query(
            "DELETE FROM folders WHERE user_id = $1 AND path LIKE $2 ESCAPE '\\'",
        )
        .bind(user_id)
        .bind(&pattern)
        .execute(conn)
        .await
        .map_err(|e| map_db_err("Failed to delete subtree", e))?;
        Ok(result.rows_affected())
    }
}
