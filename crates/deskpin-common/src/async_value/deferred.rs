//! One-shot result sink: the settling half is handed to whoever will produce
//! the value, the awaiting half to whoever needs it.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// The settling side was dropped without resolving or rejecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deferred result abandoned before it was settled")]
pub struct Abandoned;

/// Settling half. Consumed by [`Deferred::resolve`] or [`Deferred::reject`],
/// so a result can be settled at most once.
#[derive(Debug)]
pub struct Deferred<T, E> {
    tx: oneshot::Sender<Result<T, E>>,
}

impl<T, E> Deferred<T, E> {
    pub fn new() -> (Self, DeferredResult<T, E>) {
        let (tx, rx) = oneshot::channel();
        (
            Self { tx },
            DeferredResult {
                rx,
                _error: PhantomData,
            },
        )
    }

    /// Settle successfully. Returns `false` if nobody is awaiting anymore.
    pub fn resolve(self, value: T) -> bool {
        self.tx.send(Ok(value)).is_ok()
    }

    /// Settle with an error. Returns `false` if nobody is awaiting anymore.
    pub fn reject(self, error: E) -> bool {
        self.tx.send(Err(error)).is_ok()
    }
}

/// Awaiting half of a [`Deferred`].
#[derive(Debug)]
pub struct DeferredResult<T, E> {
    rx: oneshot::Receiver<Result<T, E>>,
    _error: PhantomData<fn() -> E>,
}

impl<T, E: From<Abandoned>> Future for DeferredResult<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(E::from(Abandoned))),
            Poll::Pending => Poll::Pending,
        }
    }
}
