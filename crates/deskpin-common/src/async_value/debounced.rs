//! Values that only change after updates stop arriving for a grace period.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug)]
struct DebounceState<T> {
    current: T,
    /// Bumped on every `set`; a timer only applies its value if it still
    /// carries the latest generation.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// A value that settles on the last `set` once no further `set` arrives
/// within `grace`.
///
/// `get` never waits and returns the last settled value, which may be stale
/// while a change is still pending.
#[derive(Debug)]
pub struct DebouncedValue<T> {
    state: Arc<Mutex<DebounceState<T>>>,
    grace: Duration,
}

fn lock<T>(state: &Mutex<DebounceState<T>>) -> MutexGuard<'_, DebounceState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Clone + Send + 'static> DebouncedValue<T> {
    pub fn new(initial: T, grace: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(DebounceState {
                current: initial,
                generation: 0,
                timer: None,
            })),
            grace,
        }
    }

    /// Schedule `value` to settle `grace` after this call, cancelling any
    /// change that is still pending. Must be called within a tokio runtime.
    pub fn set(&self, value: T) {
        let mut state = lock(&self.state);
        state.generation += 1;
        let generation = state.generation;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        let shared = Arc::clone(&self.state);
        let deadline = Instant::now() + self.grace;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut state = lock(&shared);
            if state.generation == generation {
                state.current = value;
                state.timer = None;
            }
        }));
    }

    /// The last settled value.
    pub fn get(&self) -> T {
        lock(&self.state).current.clone()
    }

    /// Whether a `set` is still waiting out its grace period.
    pub fn is_pending(&self) -> bool {
        lock(&self.state).timer.is_some()
    }
}

impl<T> Drop for DebouncedValue<T> {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.state).timer.take() {
            timer.abort();
        }
    }
}
