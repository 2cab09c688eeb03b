//! Storage quota value object.

use serde::{Deserialize, Serialize};

use crate::user::model::UserQuota;

/// A point-in-time view of a user's storage budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageQuota {
    /// Total budget in bytes.
    pub quota_max: i64,
    /// Currently used bytes.
    pub storage_used: i64,
    /// Remaining bytes.
    pub remaining: i64,
    /// Usage percentage (0.0 - 100.0).
    pub usage_percent: f64,
}

impl StorageQuota {
    /// Create a quota view from total and used values.
    pub fn new(quota_max: i64, storage_used: i64) -> Self {
        let remaining = (quota_max - storage_used).max(0);
        let usage_percent = if quota_max == 0 {
            0.0
        } else {
            (storage_used as f64 / quota_max as f64) * 100.0
        };

        Self {
            quota_max,
            storage_used,
            remaining,
            usage_percent,
        }
    }

    /// Check if the budget is fully consumed.
    pub fn is_exhausted(&self) -> bool {
        self.storage_used >= self.quota_max
    }

    /// Check if adding the given number of bytes would exceed the budget.
    pub fn would_exceed(&self, additional_bytes: i64) -> bool {
        self.storage_used + additional_bytes > self.quota_max
    }
}

impl From<&UserQuota> for StorageQuota {
    fn from(row: &UserQuota) -> Self {
        Self::new(row.quota_max, row.storage_used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_and_percent() {
        let q = StorageQuota::new(100, 25);
        assert_eq!(q.remaining, 75);
        assert!((q.usage_percent - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_would_exceed_is_inclusive_at_the_limit() {
        let q = StorageQuota::new(100, 90);
        assert!(!q.would_exceed(10));
        assert!(q.would_exceed(11));
    }

    #[test]
    fn test_exhausted() {
        assert!(StorageQuota::new(100, 100).is_exhausted());
        assert!(!StorageQuota::new(100, 99).is_exhausted());
    }

    #[test]
    fn test_zero_budget_does_not_divide_by_zero() {
        let q = StorageQuota::new(0, 0);
        assert_eq!(q.usage_percent, 0.0);
        assert!(q.is_exhausted());
    }
}
