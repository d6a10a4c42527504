//! Request/response correlation and signal fan-out over one duplex channel.
//!
//! The channel itself does no I/O: outgoing requests are queued for a
//! transport task and inbound frames are handed to [`RpcChannel::dispatch_frame`]
//! by whoever reads the other end (see [`crate::transport`]).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use deskpin_common::{Deferred, DeferredResult, RpcError};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::protocol::{InboundMessage, OutboundRequest};

/// Callback invoked with a signal's parameters.
pub type SignalHandler = Arc<dyn Fn(&[Value]) + Send + Sync>;

type PendingCalls = HashMap<u64, Deferred<Value, RpcError>>;

struct ChannelInner {
    next_id: AtomicU64,
    closed: AtomicBool,
    pending: Mutex<PendingCalls>,
    listeners: Mutex<HashMap<String, Vec<SignalHandler>>>,
    outbound: mpsc::UnboundedSender<OutboundRequest>,
}

/// Handle to one RPC channel. Cheap to clone; all clones share the same
/// id counter, in-flight table and listeners.
#[derive(Clone)]
pub struct RpcChannel {
    inner: Arc<ChannelInner>,
}

impl std::fmt::Debug for RpcChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChannel")
            .field("pending", &self.pending_calls())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl RpcChannel {
    /// Create a channel together with the queue its transport must drain.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundRequest>) {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let channel = Self {
            inner: Arc::new(ChannelInner {
                next_id: AtomicU64::new(1),
                closed: AtomicBool::new(false),
                pending: Mutex::new(HashMap::new()),
                listeners: Mutex::new(HashMap::new()),
                outbound,
            }),
        };
        (channel, outbound_rx)
    }

    fn pending(&self) -> MutexGuard<'_, PendingCalls> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> MutexGuard<'_, HashMap<String, Vec<SignalHandler>>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Send `method` with `params` and return the pending result.
    ///
    /// The request is queued before this returns, so dropping the returned
    /// future does not cancel it; the response is then simply discarded.
    pub fn call(&self, method: &str, params: Vec<Value>) -> DeferredResult<Value, RpcError> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (deferred, result) = Deferred::new();

        if self.is_closed() {
            deferred.reject(RpcError::ChannelClosed);
            return result;
        }

        self.pending().insert(id, deferred);
        debug!(id, method, "rpc call");

        let request = OutboundRequest {
            method: method.to_string(),
            params,
            id,
        };
        if self.inner.outbound.send(request).is_err() {
            if let Some(deferred) = self.pending().remove(&id) {
                deferred.reject(RpcError::ChannelClosed);
            }
        }
        result
    }

    /// Subscribe `handler` to every later signal named `signal`. Handlers for
    /// the same signal run in registration order.
    pub fn register_listener<F>(&self, signal: &str, handler: F)
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.listeners()
            .entry(signal.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Parse and dispatch one raw inbound frame. Malformed frames are dropped.
    pub fn dispatch_frame(&self, frame: &[u8]) {
        match InboundMessage::from_slice(frame) {
            Some(message) => self.dispatch(message),
            None => warn!(
                frame = %String::from_utf8_lossy(frame),
                "dropping malformed inbound message"
            ),
        }
    }

    /// Route one inbound message: signals to their listeners, responses to
    /// the call that carries the same id.
    pub fn dispatch(&self, message: InboundMessage) {
        match message {
            InboundMessage::Diagnostic { debug: note } => {
                debug!(%note, "peer diagnostic");
            }
            InboundMessage::Signal { signal, params } => {
                // Cloned out so handlers may register further listeners.
                let handlers = self.listeners().get(&signal).cloned().unwrap_or_default();
                debug!(signal = %signal, listeners = handlers.len(), "rpc signal");
                for handler in handlers {
                    handler(&params);
                }
            }
            InboundMessage::Failure { error, id } => {
                self.settle(id, Err(RpcError::Remote(error)));
            }
            InboundMessage::Success { result, id } => {
                self.settle(id, Ok(result));
            }
        }
    }

    fn settle(&self, id: u64, outcome: Result<Value, RpcError>) {
        let Some(deferred) = self.pending().remove(&id) else {
            debug!(id, "discarding response without a pending call");
            return;
        };
        match outcome {
            Ok(result) => {
                debug!(id, "rpc result");
                deferred.resolve(result);
            }
            Err(error) => {
                debug!(id, %error, "rpc error");
                deferred.reject(error);
            }
        }
    }

    /// Mark the channel dead: every in-flight call and every later call fails
    /// with [`RpcError::ChannelClosed`].
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Relaxed);
        let drained: Vec<_> = self.pending().drain().collect();
        if !drained.is_empty() {
            warn!(count = drained.len(), "rejecting calls pending on closed channel");
        }
        for (_, deferred) in drained {
            deferred.reject(RpcError::ChannelClosed);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }

    /// Number of calls still waiting for a response.
    pub fn pending_calls(&self) -> usize {
        self.pending().len()
    }
}
