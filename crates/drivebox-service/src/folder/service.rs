//! Folder namespace operations: create, resolve, list, rename, delete.
//!
//! Structural mutations (rename, delete) rewrite or remove whole subtrees
//! inside a single transaction; readers observe either the pre- or the
//! post-state, never an intermediate one.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use drivebox_core::error::AppError;
use drivebox_core::path;
use drivebox_core::result::AppResult;
use drivebox_core::traits::blob::BlobStore;
use drivebox_database::repositories::file::FileRepository;
use drivebox_database::repositories::folder::FolderRepository;
use drivebox_database::repositories::map_db_err;
use drivebox_database::repositories::quota::QuotaRepository;
use drivebox_entity::folder::{CreateFolder, DeletedFolder, Folder, RenamedFolder};

use crate::retry::with_conflict_retry;

use super::tree;

/// Manages the folder forest and its materialized-path invariant.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Connection pool for transactional mutations.
    pool: PgPool,
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// File repository (subtree deletes remove contained files).
    file_repo: Arc<FileRepository>,
    /// Quota accountant (subtree deletes release contained bytes).
    quota_repo: Arc<QuotaRepository>,
    /// Blob store (subtree deletes orphan blobs that must go).
    blob_store: Arc<dyn BlobStore>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        pool: PgPool,
        folder_repo: Arc<FolderRepository>,
        file_repo: Arc<FileRepository>,
        quota_repo: Arc<QuotaRepository>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            pool,
            folder_repo,
            file_repo,
            quota_repo,
            blob_store,
        }
    }

    /// Creates a new folder under `parent_id` (None = namespace root).
    pub async fn create_folder(
        &self,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Folder> {
        path::validate_name(name)?;

        let folder = with_conflict_retry("create_folder", || {
            self.create_once(user_id, parent_id, name)
        })
        .await?;

        info!(
            %user_id,
            folder_id = %folder.id,
            path = %folder.path,
            "Folder created"
        );

        Ok(folder)
    }

    async fn create_once(
        &self,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Folder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_err("Failed to begin transaction", e))?;

        // Share-lock the parent so its path and depth cannot be rewritten
        // or deleted between this read and the commit. A parent owned by
        // a different user is indistinguishable from a missing one.
        let (folder_path, depth) = if let Some(pid) = parent_id {
            let parent = self
                .folder_repo
                .lock_for_share(&mut tx, user_id, pid)
                .await?
                .ok_or_else(|| AppError::not_found("Parent folder not found"))?;
            (path::child_path(&parent.path, name), parent.depth + 1)
        } else {
            (path::child_path(path::ROOT, name), 0)
        };

        if self
            .folder_repo
            .sibling_exists(&mut tx, user_id, parent_id, name)
            .await?
        {
            return Err(AppError::name_collision(format!(
                "A folder named '{name}' already exists in this location"
            )));
        }

        let folder = self
            .folder_repo
            .create(
                &mut tx,
                &CreateFolder {
                    user_id,
                    parent_id,
                    name: name.to_string(),
                    path: folder_path,
                    depth,
                },
            )
            .await?;

        tx.commit()
            .await
            .map_err(|e| map_db_err("Failed to commit create", e))?;

        Ok(folder)
    }

    /// Resolves a human path to its folder.
    ///
    /// The root path resolves to `None` — the top level is not a folder
    /// row. Any other path that matches nothing is `NotFound`.
    pub async fn resolve(&self, user_id: Uuid, raw_path: &str) -> AppResult<Option<Folder>> {
        let canonical = path::normalize(raw_path)?;
        if canonical == path::ROOT {
            return Ok(None);
        }

        self.folder_repo
            .find_by_path(user_id, &canonical)
            .await?
            .map(Some)
            .ok_or_else(|| AppError::not_found(format!("Folder '{canonical}' not found")))
    }

    /// Lists the direct child folders of `parent_id` (None = root level),
    /// sorted by name.
    pub async fn list_children(
        &self,
        user_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        if let Some(pid) = parent_id {
            self.folder_repo
                .find_by_id(user_id, pid)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
        }
        self.folder_repo.find_children(user_id, parent_id).await
    }

    /// Resolves a path and lists its child folders in one call.
    pub async fn browse(
        &self,
        user_id: Uuid,
        raw_path: &str,
    ) -> AppResult<(Option<Folder>, Vec<Folder>)> {
        let current = self.resolve(user_id, raw_path).await?;
        let children = self
            .folder_repo
            .find_children(user_id, current.as_ref().map(|f| f.id))
            .await?;
        Ok((current, children))
    }

    /// Renames a folder, rewriting the materialized path of its entire
    /// subtree in one transaction.
    ///
    /// Renaming a folder to its current name is a successful no-op.
    pub async fn rename_folder(
        &self,
        user_id: Uuid,
        folder_id: Uuid,
        new_name: &str,
    ) -> AppResult<RenamedFolder> {
        path::validate_name(new_name)?;

        let renamed = with_conflict_retry("rename_folder", || {
            self.rename_once(user_id, folder_id, new_name)
        })
        .await?;

        if renamed.old_path != renamed.new_path {
            info!(
                %user_id,
                %folder_id,
                old_path = %renamed.old_path,
                new_path = %renamed.new_path,
                "Folder renamed"
            );
        }

        Ok(renamed)
    }

    async fn rename_once(
        &self,
        user_id: Uuid,
        folder_id: Uuid,
        new_name: &str,
    ) -> AppResult<RenamedFolder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_err("Failed to begin transaction", e))?;

        let folder = self
            .folder_repo
            .lock_for_update(&mut tx, user_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        if folder.name == new_name {
            // Idempotent no-op; nothing to rewrite.
            return Ok(RenamedFolder {
                id: folder.id,
                old_path: folder.path.clone(),
                new_path: folder.path,
                depth: folder.depth,
            });
        }

        if self
            .folder_repo
            .sibling_exists(&mut tx, user_id, folder.parent_id, new_name)
            .await?
        {
            return Err(AppError::name_collision(format!(
                "A folder named '{new_name}' already exists in this location"
            )));
        }

        // Lock the whole subtree first: the rewrite must wait out any
        // in-flight child creation or file insert under a descendant, and
        // must block new ones until it commits.
        self.folder_repo
            .lock_subtree(&mut tx, user_id, &folder.path)
            .await?;

        let old_prefix = folder.path.clone();
        let new_prefix = tree::renamed_prefix(&folder.path, folder.depth, new_name);

        // One bulk prefix rewrite covers the folder itself and every
        // descendant; file effective paths follow through folder_id.
        self.folder_repo
            .rewrite_subtree_paths(&mut tx, user_id, &old_prefix, &new_prefix)
            .await?;
        self.folder_repo
            .set_name(&mut tx, folder_id, new_name)
            .await?;

        tx.commit()
            .await
            .map_err(|e| map_db_err("Failed to commit rename", e))?;

        Ok(RenamedFolder {
            id: folder.id,
            old_path: old_prefix,
            new_path: new_prefix,
            depth: folder.depth,
        })
    }

    /// Deletes a folder and its entire subtree — descendant folders,
    /// contained files, their quota charges — in one transaction, then
    /// removes the orphaned blobs.
    pub async fn delete_folder(
        &self,
        user_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<DeletedFolder> {
        let (deleted, storage_keys) =
            with_conflict_retry("delete_folder", || self.delete_once(user_id, folder_id)).await?;

        // The metadata removal is durable at this point; blob deletion is
        // mandated by the delete but a straggler cannot resurrect the
        // namespace, so failures escalate in the log instead of failing
        // the call.
        for key in &storage_keys {
            if let Err(e) = self.blob_store.delete(key).await {
                error!(%user_id, key, error = %e, "Failed to delete orphaned blob");
            }
        }

        info!(
            %user_id,
            %folder_id,
            path = %deleted.deleted_path,
            removed_files = deleted.removed_files,
            released_bytes = deleted.released_bytes,
            "Folder subtree deleted"
        );

        Ok(deleted)
    }

    async fn delete_once(
        &self,
        user_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<(DeletedFolder, Vec<String>)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_err("Failed to begin transaction", e))?;

        let folder = self
            .folder_repo
            .lock_for_update(&mut tx, user_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        // Lock every descendant folder before enumerating files: an
        // in-flight upload holds a key-share lock on its containing
        // folder, so this waits it out and the enumeration then sees its
        // committed row instead of cascading it away unaccounted.
        self.folder_repo
            .lock_subtree(&mut tx, user_id, &folder.path)
            .await?;

        let files = self
            .file_repo
            .find_in_subtree(&mut tx, user_id, &folder.path)
            .await?;
        let released_bytes: i64 = files.iter().map(|f| f.size_bytes).sum();
        let storage_keys: Vec<String> = files.into_iter().map(|f| f.storage_key).collect();

        let removed_files = self
            .file_repo
            .delete_in_subtree(&mut tx, user_id, &folder.path)
            .await?;
        self.folder_repo
            .delete_subtree(&mut tx, user_id, &folder.path)
            .await?;

        if released_bytes > 0 {
            self.quota_repo
                .release(&mut tx, user_id, released_bytes)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_db_err("Failed to commit delete", e))?;

        Ok((
            DeletedFolder {
                deleted_path: folder.path,
                removed_files,
                released_bytes,
            },
            storage_keys,
        ))
    }
}
