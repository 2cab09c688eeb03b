//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Top-level blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which blob store backend to use (`"s3"` or `"memory"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Lifetime of signed access URLs in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_seconds: u64,
    /// S3-compatible object storage configuration.
    #[serde(default)]
    pub s3: S3Config,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            signed_url_ttl_seconds: default_signed_url_ttl(),
            s3: S3Config::default(),
        }
    }
}

/// S3-compatible object storage configuration.
///
/// When `endpoint` is set, path-style addressing is forced so that MinIO
/// deployments work out of the box.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3Config {
    /// S3 endpoint URL (empty for AWS, set for MinIO and friends).
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
}

fn default_provider() -> String {
    "s3".to_string()
}

fn default_signed_url_ttl() -> u64 {
    300 // 5 minutes
}

fn default_region() -> String {
    "us-east-1".to_string()
}
