//! File registry operations: upload, list, rename, delete, download.
//!
//! A file's bytes live in the blob store and its metadata in Postgres;
//! every operation that touches both is ordered so that a crash at any
//! point leaves either a consistent state or an orphaned blob that can
//! never shadow a live file.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use drivebox_core::config::quota::QuotaConfig;
use drivebox_core::config::storage::StorageConfig;
use drivebox_core::error::AppError;
use drivebox_core::path;
use drivebox_core::result::AppResult;
use drivebox_core::traits::blob::{BlobStore, ByteStream};
use drivebox_database::repositories::file::FileRepository;
use drivebox_database::repositories::folder::FolderRepository;
use drivebox_database::repositories::map_db_err;
use drivebox_database::repositories::quota::QuotaRepository;
use drivebox_entity::file::{CreateFile, File, FileListing};

/// Manages file metadata and the blobs behind it.
#[derive(Debug, Clone)]
pub struct FileService {
    /// Connection pool for transactional mutations.
    pool: PgPool,
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Folder repository (uploads verify the target folder).
    folder_repo: Arc<FolderRepository>,
    /// Quota accountant.
    quota_repo: Arc<QuotaRepository>,
    /// Blob store holding the content bytes.
    blob_store: Arc<dyn BlobStore>,
    /// Lifetime of signed access URLs.
    signed_url_ttl: Duration,
    /// Ceiling on a single upload's size.
    max_upload_size_bytes: i64,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        pool: PgPool,
        file_repo: Arc<FileRepository>,
        folder_repo: Arc<FolderRepository>,
        quota_repo: Arc<QuotaRepository>,
        blob_store: Arc<dyn BlobStore>,
        storage_config: &StorageConfig,
        quota_config: &QuotaConfig,
    ) -> Self {
        Self {
            pool,
            file_repo,
            folder_repo,
            quota_repo,
            blob_store,
            signed_url_ttl: Duration::from_secs(storage_config.signed_url_ttl_seconds),
            max_upload_size_bytes: quota_config.max_upload_size_bytes,
        }
    }

    /// Uploads a file into `folder_id` (None = root).
    ///
    /// The quota charge, the blob write, and the metadata insert either
    /// all take effect or none do. The blob is written before the row
    /// commits; if the row never lands, the blob is deleted again as a
    /// compensating action.
    pub async fn upload(
        &self,
        user_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
        mime_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<File> {
        path::validate_name(name)?;

        let size_bytes = data.len() as i64;
        if size_bytes > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File of {size_bytes} bytes exceeds the upload limit of {} bytes",
                self.max_upload_size_bytes
            )));
        }

        if let Some(fid) = folder_id {
            self.folder_repo
                .find_by_id(user_id, fid)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
        }

        if self
            .file_repo
            .exists_in_folder(user_id, folder_id, name)
            .await?
        {
            return Err(AppError::name_collision(format!(
                "A file named '{name}' already exists in this folder"
            )));
        }

        // The key embeds a fresh UUID so re-uploading a deleted name can
        // never collide with a blob still pending cleanup.
        let storage_key = format!("{user_id}/{}-{name}", Uuid::new_v4());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_err("Failed to begin transaction", e))?;

        self.quota_repo.reserve(&mut tx, user_id, size_bytes).await?;

        // Write the blob while the reservation is still uncommitted; if
        // the write fails the rollback undoes the charge.
        self.blob_store
            .put(&storage_key, data, mime_type)
            .await?;

        let file = match self
            .file_repo
            .insert(
                &mut tx,
                &CreateFile {
                    user_id,
                    folder_id,
                    name: name.to_string(),
                    mime_type: mime_type.map(str::to_string),
                    size_bytes,
                    storage_key: storage_key.clone(),
                },
            )
            .await
        {
            Ok(file) => file,
            Err(e) => {
                drop(tx);
                self.remove_orphan_blob(&storage_key).await?;
                return Err(e);
            }
        };

        if let Err(e) = tx.commit().await {
            self.remove_orphan_blob(&storage_key).await?;
            return Err(map_db_err("Failed to commit upload", e));
        }

        info!(
            %user_id,
            file_id = %file.id,
            name = %file.name,
            size_bytes,
            "File uploaded"
        );

        Ok(file)
    }

    /// Lists the files of a folder (None = root), newest first, each
    /// paired with a signed URL for direct content access.
    pub async fn list(
        &self,
        user_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<FileListing>> {
        if let Some(fid) = folder_id {
            self.folder_repo
                .find_by_id(user_id, fid)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
        }

        let files = self.file_repo.find_by_folder(user_id, folder_id).await?;
        let mut listings = Vec::with_capacity(files.len());
        for file in files {
            let url = self
                .blob_store
                .signed_url(&file.storage_key, self.signed_url_ttl)
                .await?;
            listings.push(FileListing { file, url });
        }
        Ok(listings)
    }

    /// Renames a file in place. The blob and its key are untouched.
    ///
    /// Renaming a file to its current name is a successful no-op.
    pub async fn rename(
        &self,
        user_id: Uuid,
        file_id: Uuid,
        new_name: &str,
    ) -> AppResult<File> {
        path::validate_name(new_name)?;

        let file = self
            .file_repo
            .find_by_id(user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        if file.name == new_name {
            return Ok(file);
        }

        let renamed = self.file_repo.rename(user_id, file_id, new_name).await?;

        info!(
            %user_id,
            %file_id,
            old_name = %file.name,
            new_name = %renamed.name,
            "File renamed"
        );

        Ok(renamed)
    }

    /// Deletes a file: its metadata row, its quota charge, and its blob.
    ///
    /// The blob is deleted before the transaction commits; if the blob
    /// store refuses, the rollback keeps the file visible so the delete
    /// can be retried.
    pub async fn delete(&self, user_id: Uuid, file_id: Uuid) -> AppResult<File> {
        let file = self
            .file_repo
            .find_by_id(user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_err("Failed to begin transaction", e))?;

        if !self.file_repo.delete(&mut tx, file.id).await? {
            // Lost a race with a concurrent delete.
            return Err(AppError::not_found("File not found"));
        }

        self.quota_repo
            .release(&mut tx, user_id, file.size_bytes)
            .await?;

        self.blob_store.delete(&file.storage_key).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_err("Failed to commit delete", e))?;

        info!(
            %user_id,
            %file_id,
            size_bytes = file.size_bytes,
            "File deleted"
        );

        Ok(file)
    }

    /// Opens the file's content as a byte stream, with its metadata.
    pub async fn download(&self, user_id: Uuid, file_id: Uuid) -> AppResult<(File, ByteStream)> {
        let file = self
            .file_repo
            .find_by_id(user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let stream = self.blob_store.get_stream(&file.storage_key).await?;
        Ok((file, stream))
    }

    /// Issues a fresh signed URL for a single file.
    pub async fn signed_url(&self, user_id: Uuid, file_id: Uuid) -> AppResult<String> {
        let file = self
            .file_repo
            .find_by_id(user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        self.blob_store
            .signed_url(&file.storage_key, self.signed_url_ttl)
            .await
    }

    /// Delete a blob whose metadata row never committed. A failure here
    /// leaves a stray object that quota accounting no longer covers, so
    /// it escalates to a consistency error.
    async fn remove_orphan_blob(&self, storage_key: &str) -> AppResult<()> {
        if let Err(e) = self.blob_store.delete(storage_key).await {
            error!(storage_key, error = %e, "Failed to remove orphaned blob after aborted upload");
            return Err(AppError::consistency(format!(
                "Upload aborted but blob '{storage_key}' could not be removed"
            )));
        }
        Ok(())
    }
}
