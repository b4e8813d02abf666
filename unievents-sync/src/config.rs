//! Offline mode configuration.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use unievents_remote::RemoteConfig;

/// Configuration for the offline coordinator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// DuckDB file holding the cache and queue. `None` keeps everything in
    /// memory for the lifetime of the process.
    pub db_path: Option<PathBuf>,

    /// A cache snapshot older than this is refreshed by
    /// `initialize_if_needed` (seconds).
    pub snapshot_max_age_secs: u64,

    /// Overwrite the cache with a server snapshot after a clean drain.
    pub refresh_after_drain: bool,

    /// Upper bound on listing pages fetched for a full snapshot.
    pub snapshot_max_pages: usize,

    pub remote: RemoteConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            snapshot_max_age_secs: 3600,
            refresh_after_drain: true,
            snapshot_max_pages: 20,
            remote: RemoteConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Parses a JSON config document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> SyncResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SyncResult<()> {
        self.remote
            .validate()
            .map_err(|e| SyncError::Config(e.to_string()))?;
        if self.snapshot_max_pages == 0 {
            return Err(SyncError::Config(
                "snapshot_max_pages must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn snapshot_max_age(&self) -> Duration {
        Duration::from_secs(self.snapshot_max_age_secs)
    }
}
