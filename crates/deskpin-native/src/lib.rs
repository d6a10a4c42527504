//! RPC plumbing to the native desktop-environment bridge.
//!
//! - [`channel`]: correlation of requests and responses plus signal fan-out
//! - [`transport`]: line or length-prefixed framing over any byte stream
//! - [`client`]: the typed method and signal surface of the bridge
//! - [`process`]: spawning the bridge executable

pub mod channel;
pub mod client;
pub mod process;
pub mod protocol;
pub mod transport;

pub use channel::{RpcChannel, SignalHandler};
pub use client::{NativeClient, NativeMethod, NativeSignal};
pub use process::{spawn_bridge, BridgeProcess};
pub use protocol::{InboundMessage, OutboundRequest};
pub use transport::{attach, connect, TransportHandle};
