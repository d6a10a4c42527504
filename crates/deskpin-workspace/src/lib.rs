//! Window registry and tab placement for the deskpin daemon.
//!
//! Tracks every window of the windowing host, ties each one to the desktop
//! environment's window identity, and moves newly created tabs into a window
//! on the current virtual desktop and activity.

pub mod claim;
pub mod host;
pub mod placement;
pub mod registry;
pub mod storage;
pub mod window;

#[cfg(test)]
pub(crate) mod test_support;

pub use claim::{claim_identity, ClaimPolicy};
pub use host::{forward_events, HostEvent, RemoteHost, WindowHost};
pub use placement::{place_tab, select_target, Placement, SkipReason};
pub use registry::Workspace;
pub use storage::StorageRecord;
pub use window::{Membership, WindowRecord};
