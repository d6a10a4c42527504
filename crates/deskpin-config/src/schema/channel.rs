//! Channel configuration: how the daemon reaches the native bridge and the
//! windowing host.

use serde::{Deserialize, Serialize};

/// How JSON messages are delimited on a byte stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// One compact JSON document per newline-terminated line.
    Lines,
    /// 4-byte little-endian length header followed by the JSON body
    /// (browser native-messaging framing).
    #[default]
    LengthPrefixed,
}

/// The native desktop-environment bridge process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeConfig {
    /// Executable to spawn.
    pub command: String,
    /// Extra arguments passed to the bridge.
    pub args: Vec<String>,
    pub framing: Framing,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            command: "deskpin-bridge".into(),
            args: Vec::new(),
            framing: Framing::LengthPrefixed,
        }
    }
}

/// The windowing host shim talking to the daemon over stdio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub framing: Framing,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            framing: Framing::Lines,
        }
    }
}
