//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use crate::schema::{DeskpinConfig, Framing, LogLevel};
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_deskpin_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, deskpin_common::ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[native]
command = "/usr/lib/deskpin/kwin-bridge"
framing = "lines"

[workspace]
debounce_ms = 250
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.native.command, "/usr/lib/deskpin/kwin-bridge");
    assert_eq!(config.native.framing, Framing::Lines);
    assert_eq!(config.workspace.debounce_ms, 250);
    // Defaults preserved
    assert_eq!(config.workspace.storage_key, "pos");
    assert_eq!(config.workspace.claim_max_attempts, 20);
    assert_eq!(config.logging.level, LogLevel::Info);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, deskpin_common::ConfigError::ParseError(_)));
}

#[test]
fn load_config_with_invalid_values_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[workspace]
claim_max_attempts = 0
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.workspace.claim_max_attempts, 0);
}

#[test]
fn create_default_config_writes_parseable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    create_default_config(&path).unwrap();
    assert!(path.exists());

    let loaded = load_from_path(&path).unwrap();
    let defaults = DeskpinConfig::default();
    assert_eq!(loaded.native.command, defaults.native.command);
    assert_eq!(loaded.native.framing, defaults.native.framing);
    assert_eq!(loaded.host.framing, defaults.host.framing);
    assert_eq!(loaded.workspace.debounce_ms, defaults.workspace.debounce_ms);
    assert_eq!(
        loaded.workspace.tab_marker_key,
        defaults.workspace.tab_marker_key
    );
}

#[test]
fn default_config_path_ends_with_deskpin() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("deskpin/config.toml"));
    }
}

#[test]
fn create_default_config_keeps_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[workspace]\ndebounce_ms = 42\n").unwrap();

    create_default_config(&path).unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.workspace.debounce_ms, 42);
}
