//! Per-user storage quota configuration.

use serde::{Deserialize, Serialize};

/// Quota settings applied when provisioning a user's storage ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Default byte budget per user (5 MiB).
    #[serde(default = "default_quota_bytes")]
    pub default_quota_bytes: i64,
    /// Maximum size of a single upload in bytes (5 MiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_quota_bytes: default_quota_bytes(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_quota_bytes() -> i64 {
    5_242_880 // 5 MiB
}

fn default_max_upload() -> i64 {
    5_242_880 // 5 MiB
}
