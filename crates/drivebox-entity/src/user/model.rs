//! User storage ledger row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The per-user storage accounting row.
///
/// Mutated only through the quota accountant's reserve/release entry
/// points; `storage_used <= quota_max` holds at every committed state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserQuota {
    /// The user this ledger belongs to (externally issued).
    pub id: Uuid,
    /// Bytes currently charged against the budget.
    pub storage_used: i64,
    /// The user's byte budget.
    pub quota_max: i64,
    /// When the ledger row was created.
    pub created_at: DateTime<Utc>,
    /// When the ledger row was last updated.
    pub updated_at: DateTime<Utc>,
}
