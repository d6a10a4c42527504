//! Configuration validation.
//!
//! Collects every range and shape error into a single `ConfigError`.

mod helpers;


use crate::schema::DeskpinConfig;
use deskpin_common::ConfigError;

use helpers::{validate_non_empty, validate_range};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &DeskpinConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_non_empty(&mut errors, "native.command", &config.native.command);

    let workspace = &config.workspace;
    validate_range(&mut errors, "workspace.debounce_ms", workspace.debounce_ms, 0, 10_000);
    validate_range(
        &mut errors,
        "workspace.claim_max_attempts",
        u64::from(workspace.claim_max_attempts),
        1,
        1_000,
    );
    validate_range(
        &mut errors,
        "workspace.claim_retry_delay_ms",
        workspace.claim_retry_delay_ms,
        0,
        60_000,
    );
    validate_non_empty(&mut errors, "workspace.storage_key", &workspace.storage_key);
    validate_non_empty(&mut errors, "workspace.tab_marker_key", &workspace.tab_marker_key);
    if workspace.storage_key == workspace.tab_marker_key {
        errors.push("workspace.storage_key and workspace.tab_marker_key must differ".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
