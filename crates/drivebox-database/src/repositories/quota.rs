//! Quota accountant repository.
//!
//! Owns the per-user `storage_used` counter. Every mutation goes through
//! `reserve`/`release` on the caller's transaction — never ad hoc
//! arithmetic elsewhere — so the charge always commits together with the
//! corresponding file-row change.

use sqlx::{PgConnection, PgPool};
use tracing::error;
use uuid::Uuid;

use drivebox_core::error::AppError;
use drivebox_core::result::AppResult;
use drivebox_entity::user::model::UserQuota;

use super::map_db_err;

/// Repository gating and tracking per-user byte usage.
#[derive(Debug, Clone)]
pub struct QuotaRepository {
    pool: PgPool,
}

impl QuotaRepository {
    /// Create a new quota repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Seed (or re-seed) a user's storage ledger row.
    ///
    /// Idempotent: an existing row keeps its `storage_used` and only has
    /// its budget updated.
    pub async fn register_user(&self, user_id: Uuid, quota_max: i64) -> AppResult<UserQuota> {
        sqlx::query_as::<_, UserQuota>(
            "INSERT INTO users (id, quota_max) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET quota_max = EXCLUDED.quota_max, updated_at = NOW() \
             RETURNING *",
        )
        .bind(user_id)
        .bind(quota_max)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to register user quota", e))
    }

    /// Fetch a user's ledger row.
    pub async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<UserQuota>> {
        sqlx::query_as::<_, UserQuota>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_err("Failed to find user quota", e))
    }

    /// Atomically check and charge `delta_bytes` against the user's budget.
    ///
    /// The check and the increment happen in a single conditional UPDATE,
    /// so no interleaving can push `storage_used` past `quota_max`. Runs
    /// on the caller's transaction.
    pub async fn reserve(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        delta_bytes: i64,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users \
             SET storage_used = storage_used + $2, updated_at = NOW() \
             WHERE id = $1 AND storage_used + $2 <= quota_max",
        )
        .bind(user_id)
        .bind(delta_bytes)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to reserve quota", e))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Distinguish a missing ledger row from an exhausted budget.
        let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_db_err("Failed to check user quota", e))?;

        if exists.is_none() {
            Err(AppError::not_found("User storage ledger not found"))
        } else {
            Err(AppError::quota_exceeded(format!(
                "Storing {delta_bytes} more bytes would exceed the storage limit"
            )))
        }
    }

    /// Atomically return `delta_bytes` to the user's budget.
    ///
    /// Underflow indicates a bookkeeping bug: it is reported loudly and
    /// the counter is clamped to zero as a safety net only. Runs on the
    /// caller's transaction.
    pub async fn release(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        delta_bytes: i64,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users \
             SET storage_used = storage_used - $2, updated_at = NOW() \
             WHERE id = $1 AND storage_used >= $2",
        )
        .bind(user_id)
        .bind(delta_bytes)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to release quota", e))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let clamped = sqlx::query(
            "UPDATE users SET storage_used = 0, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to clamp quota", e))?;

        if clamped.rows_affected() == 0 {
            return Err(AppError::not_found("User storage ledger not found"));
        }

        error!(
            %user_id,
            delta_bytes,
            "Quota release underflow; counter clamped to zero"
        );
        Ok(())
    }
}
