//! deskpin configuration system.
//!
//! TOML-based configuration with validation. All sections use defaults, so
//! an empty or partial file works.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    DeskpinConfig, Framing, HostConfig, LogLevel, LoggingConfig, NativeConfig, WorkspaceConfig,
    CONFIG_SCHEMA_VERSION,
};

use std::path::Path;

use deskpin_common::ConfigError;

/// Load config from `path` if given, otherwise from the platform default
/// location, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<DeskpinConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &DeskpinConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
