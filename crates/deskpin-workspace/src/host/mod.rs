//! The windowing host: the application whose windows and tabs are placed.
//!
//! The daemon never owns host windows. It observes them through
//! [`HostEvent`]s and acts on them through the narrow [`WindowHost`] trait.

pub mod remote;

use async_trait::async_trait;
use deskpin_common::{HostError, HostWindowId, TabId};
use serde_json::Value;

pub use remote::{forward_events, RemoteHost};

pub type Result<T> = std::result::Result<T, HostError>;

/// Lifecycle notifications from the windowing host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    WindowCreated(HostWindowId),
    WindowFocusChanged(HostWindowId),
    WindowRemoved(HostWindowId),
    /// Either id may be missing while the host is still assigning them.
    TabCreated {
        tab: Option<TabId>,
        window: Option<HostWindowId>,
    },
}

/// Operations the daemon performs on the windowing host.
#[async_trait]
pub trait WindowHost: Send + Sync {
    /// Every window the host currently has open.
    async fn list_windows(&self) -> Result<Vec<HostWindowId>>;

    /// Open a new window, optionally seeded with an existing tab.
    async fn create_window(&self, seed: Option<TabId>) -> Result<HostWindowId>;

    /// Move `tab` into `window` at `index` (`-1` appends).
    async fn move_tab(&self, tab: TabId, window: HostWindowId, index: i32) -> Result<()>;

    async fn focus_window(&self, window: HostWindowId) -> Result<()>;

    async fn activate_tab(&self, tab: TabId) -> Result<()>;

    /// Set a transient prefix on the window title; `""` clears it.
    async fn set_title_preface(&self, window: HostWindowId, preface: &str) -> Result<()>;

    async fn close_window(&self, window: HostWindowId) -> Result<()>;

    /// Session value stored for `window` under `key`.
    async fn window_value(&self, window: HostWindowId, key: &str) -> Result<Option<Value>>;

    async fn set_window_value(&self, window: HostWindowId, key: &str, value: Value)
        -> Result<()>;

    /// Boolean session marker stored for `tab` under `key`; unset reads as `false`.
    async fn tab_marker(&self, tab: TabId, key: &str) -> Result<bool>;

    async fn set_tab_marker(&self, tab: TabId, key: &str, value: bool) -> Result<()>;
}
