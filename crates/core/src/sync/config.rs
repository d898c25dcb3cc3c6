//! Sync configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the sync orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// A previous cycle older than this (hours) triggers a catch-up search.
    #[serde(default = "default_stale_after_hours")]
    pub stale_after_hours: u32,

    /// How far before the previous cycle's timestamp the catch-up search
    /// starts (hours).
    #[serde(default = "default_catchup_lookback_hours")]
    pub catchup_lookback_hours: u32,

    /// Enable/disable the catch-up search.
    #[serde(default = "default_catchup_enabled")]
    pub catchup_enabled: bool,
}

fn default_stale_after_hours() -> u32 {
    3
}

fn default_catchup_lookback_hours() -> u32 {
    24
}

fn default_catchup_enabled() -> bool {
    true
}

impl SyncConfig {
    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.stale_after_hours))
    }

    pub fn catchup_lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.catchup_lookback_hours))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stale_after_hours: default_stale_after_hours(),
            catchup_lookback_hours: default_catchup_lookback_hours(),
            catchup_enabled: default_catchup_enabled(),
        }
    }
}
