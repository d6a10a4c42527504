//! Configuration schema types for deskpin.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the daemon ships with.

mod channel;
mod system;
mod workspace;

pub use channel::*;
pub use system::*;
pub use workspace::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for deskpin.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskpinConfig {
    pub native: NativeConfig,
    pub host: HostConfig,
    pub workspace: WorkspaceConfig,
    pub logging: LoggingConfig,
}
