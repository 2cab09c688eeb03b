//! Database configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// PostgreSQL connection settings.
///
/// Only `url` is mandatory; the pool sizing fields carry defaults tuned
/// for a single service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Upper bound on pooled connections.
    #[serde(default = "twenty")]
    pub max_connections: u32,
    /// Connections kept warm even when idle.
    #[serde(default = "five")]
    pub min_connections: u32,
    /// How long to wait for a connection before giving up, in seconds.
    #[serde(default = "ten")]
    pub connect_timeout_seconds: u64,
    /// How long an idle connection may linger before being closed, in
    /// seconds.
    #[serde(default = "five_minutes")]
    pub idle_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Acquire timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Idle timeout as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

fn twenty() -> u32 {
    20
}

fn five() -> u32 {
    5
}

fn ten() -> u64 {
    10
}

fn five_minutes() -> u64 {
    300
}
