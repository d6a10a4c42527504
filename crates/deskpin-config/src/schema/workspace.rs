use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Window tracking and placement behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Quiet period before a desktop/activity switch is believed (valid range: 0-10000).
    pub debounce_ms: u64,
    /// Session key under which a window's membership is persisted.
    pub storage_key: String,
    /// Session key marking a tab as already placed.
    pub tab_marker_key: String,
    /// Claim handshakes attempted per window before giving up (valid range: 1-1000).
    pub claim_max_attempts: u32,
    /// Pause between claim handshakes (valid range: 0-60000).
    pub claim_retry_delay_ms: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            storage_key: "pos".into(),
            tab_marker_key: "placed".into(),
            claim_max_attempts: 20,
            claim_retry_delay_ms: 50,
        }
    }
}

impl WorkspaceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn claim_retry_delay(&self) -> Duration {
        Duration::from_millis(self.claim_retry_delay_ms)
    }
}
