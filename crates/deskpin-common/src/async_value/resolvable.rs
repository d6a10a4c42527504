//! A value that is known now or will be known later, exactly once.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Eventually-known value shared between any number of readers.
///
/// Cloning yields another handle to the same slot. Once resolved the value
/// never changes; [`wait`](Self::wait) releases every waiter with that value.
#[derive(Debug)]
pub struct ResolvableFuture<T> {
    slot: Arc<watch::Sender<Option<T>>>,
}

/// Producer side of a [`ResolvableFuture`] created with [`ResolvableFuture::pending`].
#[derive(Debug)]
pub struct Resolver<T> {
    slot: Arc<watch::Sender<Option<T>>>,
}

impl<T> Clone for ResolvableFuture<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

fn fill<T>(slot: &watch::Sender<Option<T>>, value: T) -> bool {
    slot.send_if_modified(|current| {
        if current.is_some() {
            return false;
        }
        *current = Some(value);
        true
    })
}

impl<T: Clone> ResolvableFuture<T> {
    pub fn resolved(value: T) -> Self {
        let (slot, _) = watch::channel(Some(value));
        Self {
            slot: Arc::new(slot),
        }
    }

    pub fn pending() -> (Self, Resolver<T>) {
        let (slot, _) = watch::channel(None);
        let slot = Arc::new(slot);
        (
            Self {
                slot: Arc::clone(&slot),
            },
            Resolver { slot },
        )
    }

    /// Bind the value to a producer running as its own task.
    pub fn spawn<F>(producer: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + Sync + 'static,
    {
        let (future, resolver) = Self::pending();
        tokio::spawn(async move {
            resolver.resolve(producer.await);
        });
        future
    }

    /// Resolve directly through this handle. Returns `false` (and keeps the
    /// existing value) if the future was already resolved.
    pub fn resolve(&self, value: T) -> bool {
        fill(&self.slot, value)
    }

    /// Snapshot without suspending.
    pub fn get(&self) -> Option<T> {
        self.slot.borrow().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Suspend until the value is known.
    pub async fn wait(&self) -> T {
        let mut rx = self.slot.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(value) = current {
                return value;
            }
            // `self` owns the sender, so the channel cannot close under us.
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

impl<T> Resolver<T> {
    /// Resolve the paired future. Returns `false` if it was already resolved.
    pub fn resolve(self, value: T) -> bool {
        fill(&self.slot, value)
    }
}
