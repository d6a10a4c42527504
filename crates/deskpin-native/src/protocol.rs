//! Wire messages exchanged with an RPC peer.
//!
//! Outbound traffic is always a request. Inbound traffic is a signal, a
//! success or failure response, or a diagnostic the daemon ignores.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A method call sent to the peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundRequest {
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

/// Every shape the peer may send.
///
/// Variant order matters: a message is matched against the first variant
/// whose fields it carries, so anything tagged `debug` is a diagnostic no
/// matter what else it contains, and an `error` wins over a `result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InboundMessage {
    Diagnostic {
        debug: Value,
    },
    Signal {
        signal: String,
        #[serde(default)]
        params: Vec<Value>,
    },
    Failure {
        error: Value,
        id: u64,
    },
    Success {
        result: Value,
        id: u64,
    },
}

impl InboundMessage {
    /// Parse one frame. Returns `None` for anything that is not one of the
    /// known shapes.
    pub fn from_slice(frame: &[u8]) -> Option<Self> {
        serde_json::from_slice(frame).ok()
    }
}
