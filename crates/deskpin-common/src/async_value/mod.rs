//! Building blocks for values that become available later, may already be
//! available, or are deliberately held back to absorb rapid-fire updates.

mod debounced;
mod deferred;
mod resolvable;

pub use debounced::DebouncedValue;
pub use deferred::{Abandoned, Deferred, DeferredResult};
pub use resolvable::{ResolvableFuture, Resolver};
