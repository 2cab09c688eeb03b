//! Storage ledger provisioning and usage reporting.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use drivebox_core::config::quota::QuotaConfig;
use drivebox_core::error::AppError;
use drivebox_core::result::AppResult;
use drivebox_database::repositories::quota::QuotaRepository;
use drivebox_entity::user::{StorageQuota, UserQuota};

/// Provisions storage ledgers and reports quota usage.
#[derive(Debug, Clone)]
pub struct QuotaService {
    /// Quota accountant.
    quota_repo: Arc<QuotaRepository>,
    /// Byte budget granted to newly registered users.
    default_quota_bytes: i64,
}

impl QuotaService {
    /// Creates a new quota service.
    pub fn new(quota_repo: Arc<QuotaRepository>, quota_config: &QuotaConfig) -> Self {
        Self {
            quota_repo,
            default_quota_bytes: quota_config.default_quota_bytes,
        }
    }

    /// Provisions a storage ledger for `user_id` with the default budget.
    ///
    /// Idempotent: registering an existing user keeps their usage counter
    /// and refreshes only the budget.
    pub async fn register_user(&self, user_id: Uuid) -> AppResult<UserQuota> {
        self.register_user_with_quota(user_id, self.default_quota_bytes)
            .await
    }

    /// Provisions a storage ledger with an explicit byte budget.
    pub async fn register_user_with_quota(
        &self,
        user_id: Uuid,
        quota_max: i64,
    ) -> AppResult<UserQuota> {
        if quota_max <= 0 {
            return Err(AppError::validation("Quota budget must be positive"));
        }

        let quota = self.quota_repo.register_user(user_id, quota_max).await?;
        info!(%user_id, quota_max, "User storage ledger provisioned");
        Ok(quota)
    }

    /// Reports a user's current quota usage.
    pub async fn usage(&self, user_id: Uuid) -> AppResult<StorageQuota> {
        let quota = self
            .quota_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User storage ledger not found"))?;
        Ok(StorageQuota::from(&quota))
    }
}
