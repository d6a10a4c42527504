//! Where the daemon looks for its config file.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use deskpin_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

const APP_DIR: &str = "deskpin";
const FILE_NAME: &str = "config.toml";

/// `<config dir>/deskpin/config.toml`, falling back to `~/.config` when the
/// platform reports no config directory.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .ok_or_else(|| ConfigError::ParseError("no config or home directory".into()))?;
    Ok(base.join(APP_DIR).join(FILE_NAME))
}

/// Write the commented default config to `path`.
///
/// An existing file is left alone; the daemon never overwrites user config.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_error =
        |action: &str, e: io::Error| ConfigError::ParseError(format!("{action} {}: {e}", path.display()));

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_error("cannot create directory for", e))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(()),
        Err(e) => return Err(io_error("cannot create", e)),
    };
    file.write_all(default_config_toml().as_bytes())
        .map_err(|e| io_error("cannot write", e))?;

    info!(path = %path.display(), "wrote default config");
    Ok(())
}
