pub mod async_value;
pub mod errors;
pub mod id;

pub use async_value::{
    Abandoned, DebouncedValue, Deferred, DeferredResult, ResolvableFuture, Resolver,
};
pub use errors::{ClaimError, ConfigError, DeskpinError, HostError, RpcError};
pub use id::{new_marker, ActivityId, DesktopId, HostWindowId, TabId, WindowUuid};

pub type Result<T> = std::result::Result<T, DeskpinError>;
