//! [`WindowHost`] over an RPC channel to a host-side shim.
//!
//! The shim speaks the same request/response/signal protocol as the native
//! bridge; method names mirror the host's own extension API.

use std::future::Future;

use async_trait::async_trait;
use deskpin_common::{HostError, HostWindowId, TabId};
use deskpin_native::RpcChannel;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{HostEvent, Result, WindowHost};

/// Window id the host reports when focus left every window.
const NO_WINDOW: i64 = -1;

#[derive(Debug, Deserialize)]
struct WindowInfo {
    id: Option<HostWindowId>,
}

#[derive(Debug, Deserialize)]
struct TabInfo {
    id: Option<TabId>,
    #[serde(rename = "windowId")]
    window_id: Option<HostWindowId>,
}

/// Windowing host reached through an [`RpcChannel`].
#[derive(Debug, Clone)]
pub struct RemoteHost {
    channel: RpcChannel,
}

impl RemoteHost {
    pub fn new(channel: RpcChannel) -> Self {
        Self { channel }
    }

    fn request<R>(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<R>> + Send + 'static
    where
        R: DeserializeOwned + Send + 'static,
    {
        let pending = self.channel.call(method, params);
        async move {
            let value = pending.await?;
            serde_json::from_value(value)
                .map_err(|e| HostError::Remote(format!("{method}: unexpected result: {e}")))
        }
    }

    async fn update_window(&self, window: HostWindowId, changes: Value) -> Result<()> {
        self.request::<Value>("windows.update", vec![json!(window), changes])
            .await
            .map(drop)
    }
}

#[async_trait]
impl WindowHost for RemoteHost {
    async fn list_windows(&self) -> Result<Vec<HostWindowId>> {
        let windows: Vec<WindowInfo> = self.request("windows.getAll", vec![]).await?;
        Ok(windows.into_iter().filter_map(|w| w.id).collect())
    }

    async fn create_window(&self, seed: Option<TabId>) -> Result<HostWindowId> {
        let options = match seed {
            Some(tab) => json!({ "tabId": tab }),
            None => json!({}),
        };
        let window: WindowInfo = self.request("windows.create", vec![options]).await?;
        window
            .id
            .ok_or_else(|| HostError::Remote("windows.create returned no id".into()))
    }

    async fn move_tab(&self, tab: TabId, window: HostWindowId, index: i32) -> Result<()> {
        self.request::<Value>(
            "tabs.move",
            vec![json!(tab), json!({ "windowId": window, "index": index })],
        )
        .await
        .map(drop)
    }

    async fn focus_window(&self, window: HostWindowId) -> Result<()> {
        self.update_window(window, json!({ "focused": true })).await
    }

    async fn activate_tab(&self, tab: TabId) -> Result<()> {
        self.request::<Value>("tabs.update", vec![json!(tab), json!({ "active": true })])
            .await
            .map(drop)
    }

    async fn set_title_preface(&self, window: HostWindowId, preface: &str) -> Result<()> {
        self.update_window(window, json!({ "titlePreface": preface }))
            .await
    }

    async fn close_window(&self, window: HostWindowId) -> Result<()> {
        self.request::<Value>("windows.remove", vec![json!(window)])
            .await
            .map(drop)
    }

    async fn window_value(&self, window: HostWindowId, key: &str) -> Result<Option<Value>> {
        let value: Value = self
            .request("sessions.getWindowValue", vec![json!(window), json!(key)])
            .await?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn set_window_value(&self, window: HostWindowId, key: &str, value: Value) -> Result<()> {
        self.request::<Value>(
            "sessions.setWindowValue",
            vec![json!(window), json!(key), value],
        )
        .await
        .map(drop)
    }

    async fn tab_marker(&self, tab: TabId, key: &str) -> Result<bool> {
        let value: Value = self
            .request("sessions.getTabValue", vec![json!(tab), json!(key)])
            .await?;
        Ok(value == Value::Bool(true))
    }

    async fn set_tab_marker(&self, tab: TabId, key: &str, value: bool) -> Result<()> {
        self.request::<Value>(
            "sessions.setTabValue",
            vec![json!(tab), json!(key), json!(value)],
        )
        .await
        .map(drop)
    }
}

fn first_param<T: DeserializeOwned>(signal: &str, params: &[Value]) -> Option<T> {
    let decoded = params
        .first()
        .cloned()
        .map(serde_json::from_value::<T>)
        .transpose();
    match decoded {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            warn!(signal, "host signal without parameters");
            None
        }
        Err(e) => {
            warn!(signal, error = %e, "dropping malformed host signal");
            None
        }
    }
}

/// Turn the shim's signals into [`HostEvent`]s on `events`.
///
/// Events are dropped once the receiving side has gone away.
pub fn forward_events(channel: &RpcChannel, events: mpsc::UnboundedSender<HostEvent>) {
    fn window_signal(
        channel: &RpcChannel,
        signal: &'static str,
        events: &mpsc::UnboundedSender<HostEvent>,
        make: fn(HostWindowId) -> HostEvent,
    ) {
        let events = events.clone();
        channel.register_listener(signal, move |params| {
            let Some(window) = first_param::<HostWindowId>(signal, params) else {
                return;
            };
            if window.0 == NO_WINDOW {
                debug!(signal, "ignoring event without a window");
                return;
            }
            if events.send(make(window)).is_err() {
                debug!(signal, "host event receiver gone");
            }
        });
    }

    window_signal(channel, "windowCreated", &events, HostEvent::WindowCreated);
    window_signal(
        channel,
        "windowFocusChanged",
        &events,
        HostEvent::WindowFocusChanged,
    );
    window_signal(channel, "windowRemoved", &events, HostEvent::WindowRemoved);

    channel.register_listener("tabCreated", move |params| {
        let Some(tab) = first_param::<TabInfo>("tabCreated", params) else {
            return;
        };
        let window = tab.window_id.filter(|w| w.0 != NO_WINDOW);
        if events
            .send(HostEvent::TabCreated {
                tab: tab.id,
                window,
            })
            .is_err()
        {
            debug!("host event receiver gone");
        }
    });
}
