use std::path::PathBuf;

use crate::async_value::Abandoned;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failure of a single call on an RPC channel.
///
/// Every variant is local to the one call that produced it; the channel and
/// other in-flight calls are unaffected.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    /// The peer answered with an error payload.
    #[error("remote error: {0}")]
    Remote(serde_json::Value),

    #[error("channel closed")]
    ChannelClosed,

    #[error("failed to decode result: {0}")]
    Decode(String),
}

impl From<Abandoned> for RpcError {
    fn from(_: Abandoned) -> Self {
        RpcError::ChannelClosed
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    #[error("host error: {0}")]
    Remote(String),

    #[error("host unavailable: {0}")]
    Unavailable(String),
}

impl From<RpcError> for HostError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Remote(payload) => HostError::Remote(payload.to_string()),
            other => HostError::Unavailable(other.to_string()),
        }
    }
}

/// Why a window never obtained a native identity.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClaimError {
    #[error("window could not be claimed after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("window closed before it was claimed")]
    Closed,

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Debug, thiserror::Error)]
pub enum DeskpinError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
