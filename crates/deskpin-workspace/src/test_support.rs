//! In-process stand-ins for the native bridge and the windowing host.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deskpin_common::{HostError, HostWindowId, TabId};
use deskpin_config::WorkspaceConfig;
use deskpin_native::{InboundMessage, NativeClient, OutboundRequest, RpcChannel};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::host::{Result, WindowHost};
use crate::registry::Workspace;

/// How the fake native bridge answers.
#[derive(Debug, Clone)]
pub struct NativeScript {
    pub activity: String,
    pub desktop: String,
    /// Answers to `claimWindow`, in order. Once drained every claim gets a
    /// generated `{claimed-N}` uuid.
    pub claims: VecDeque<String>,
    pub fail_claims: bool,
    /// Methods answered with an error.
    pub failing: Vec<&'static str>,
    /// Desktops per uuid; unknown uuids answer `[desktop]`.
    pub window_desktops: HashMap<String, Vec<String>>,
    /// Activities per uuid; unknown uuids answer `[activity]`.
    pub window_activities: HashMap<String, Vec<String>>,
}

impl Default for NativeScript {
    fn default() -> Self {
        Self {
            activity: "a1".into(),
            desktop: "d1".into(),
            claims: VecDeque::new(),
            fail_claims: false,
            failing: Vec::new(),
            window_desktops: HashMap::new(),
            window_activities: HashMap::new(),
        }
    }
}

impl NativeScript {
    fn answer(&mut self, request: &OutboundRequest, generated: &mut u32) -> InboundMessage {
        let id = request.id;
        let uuid = request
            .params
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if self.failing.contains(&request.method.as_str()) {
            return InboundMessage::Failure {
                error: json!(format!("{} failed", request.method)),
                id,
            };
        }
        let result = match request.method.as_str() {
            "getCurrentActivity" => json!(self.activity),
            "getCurrentDesktop" => json!(self.desktop),
            "claimWindow" if self.fail_claims => {
                return InboundMessage::Failure {
                    error: json!("claim failed"),
                    id,
                };
            }
            "claimWindow" => match self.claims.pop_front() {
                Some(uuid) => json!(uuid),
                None => {
                    *generated += 1;
                    json!(format!("{{claimed-{generated}}}"))
                }
            },
            "getWindowDesktops" => json!(self
                .window_desktops
                .get(&uuid)
                .cloned()
                .unwrap_or_else(|| vec![self.desktop.clone()])),
            "getWindowActivities" => json!(self
                .window_activities
                .get(&uuid)
                .cloned()
                .unwrap_or_else(|| vec![self.activity.clone()])),
            _ => Value::Null,
        };
        InboundMessage::Success { result, id }
    }
}

/// A scripted native bridge answering every request on its own task.
pub struct FakeNative {
    client: NativeClient,
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
    responder: JoinHandle<()>,
}

impl FakeNative {
    pub fn start(script: NativeScript) -> Self {
        let (channel, mut outbound) = RpcChannel::new();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        let peer = channel.clone();
        let responder = tokio::spawn(async move {
            let mut script = script;
            let mut generated = 0;
            while let Some(request) = outbound.recv().await {
                log.lock().unwrap().push(request.clone());
                let reply = script.answer(&request, &mut generated);
                peer.dispatch(reply);
            }
        });

        Self {
            client: NativeClient::new(channel),
            requests,
            responder,
        }
    }

    pub fn client(&self) -> &NativeClient {
        &self.client
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, method: &str) -> Vec<OutboundRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method)
            .collect()
    }

    /// Deliver a signal as if the bridge had sent it.
    pub fn signal(&self, name: &str, params: Vec<Value>) {
        self.client.channel().dispatch(InboundMessage::Signal {
            signal: name.into(),
            params,
        });
    }
}

impl Drop for FakeNative {
    fn drop(&mut self) {
        self.responder.abort();
    }
}

/// Every mutating call a [`MemoryHost`] received.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateWindow {
        seed: Option<TabId>,
        window: HostWindowId,
    },
    MoveTab {
        tab: TabId,
        window: HostWindowId,
        index: i32,
    },
    FocusWindow(HostWindowId),
    ActivateTab(TabId),
    TitlePreface {
        window: HostWindowId,
        preface: String,
    },
    CloseWindow(HostWindowId),
    SetWindowValue {
        window: HostWindowId,
        key: String,
        value: Value,
    },
    SetTabMarker {
        tab: TabId,
        key: String,
        value: bool,
    },
}

#[derive(Debug, Default)]
struct HostState {
    windows: BTreeSet<HostWindowId>,
    next_window: i64,
    window_values: HashMap<(HostWindowId, String), Value>,
    tab_markers: HashMap<(TabId, String), bool>,
    calls: Vec<HostCall>,
    fail_create: bool,
}

/// An in-memory windowing host.
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn with_windows(ids: &[i64]) -> Self {
        let windows: BTreeSet<_> = ids.iter().copied().map(HostWindowId).collect();
        let next_window = ids.iter().copied().max().unwrap_or(0).max(99) + 1;
        Self {
            state: Mutex::new(HostState {
                windows,
                next_window,
                ..HostState::default()
            }),
        }
    }

    pub fn open_window(&self, window: HostWindowId) {
        self.state.lock().unwrap().windows.insert(window);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn windows(&self) -> Vec<HostWindowId> {
        self.state.lock().unwrap().windows.iter().copied().collect()
    }

    pub fn store_window_value(&self, window: HostWindowId, key: &str, value: Value) {
        self.state
            .lock()
            .unwrap()
            .window_values
            .insert((window, key.to_string()), value);
    }

    pub fn stored_value(&self, window: HostWindowId, key: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .window_values
            .get(&(window, key.to_string()))
            .cloned()
    }

    /// Number of session writes made for `window`.
    pub fn writes_for(&self, window: HostWindowId) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, HostCall::SetWindowValue { window: w, .. } if *w == window))
            .count()
    }

    pub fn mark_tab(&self, tab: TabId, key: &str) {
        self.state
            .lock()
            .unwrap()
            .tab_markers
            .insert((tab, key.to_string()), true);
    }

    pub fn fail_window_creation(&self) {
        self.state.lock().unwrap().fail_create = true;
    }

    fn record(&self, call: HostCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn known(&self, window: HostWindowId) -> Result<()> {
        if self.state.lock().unwrap().windows.contains(&window) {
            Ok(())
        } else {
            Err(HostError::Remote(format!("Invalid window ID: {window}")))
        }
    }
}

#[async_trait]
impl WindowHost for MemoryHost {
    async fn list_windows(&self) -> Result<Vec<HostWindowId>> {
        Ok(self.windows())
    }

    async fn create_window(&self, seed: Option<TabId>) -> Result<HostWindowId> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(HostError::Remote("window creation refused".into()));
        }
        let window = HostWindowId(state.next_window);
        state.next_window += 1;
        state.windows.insert(window);
        state.calls.push(HostCall::CreateWindow { seed, window });
        Ok(window)
    }

    async fn move_tab(&self, tab: TabId, window: HostWindowId, index: i32) -> Result<()> {
        self.known(window)?;
        self.record(HostCall::MoveTab { tab, window, index });
        Ok(())
    }

    async fn focus_window(&self, window: HostWindowId) -> Result<()> {
        self.known(window)?;
        self.record(HostCall::FocusWindow(window));
        Ok(())
    }

    async fn activate_tab(&self, tab: TabId) -> Result<()> {
        self.record(HostCall::ActivateTab(tab));
        Ok(())
    }

    async fn set_title_preface(&self, window: HostWindowId, preface: &str) -> Result<()> {
        self.known(window)?;
        self.record(HostCall::TitlePreface {
            window,
            preface: preface.to_string(),
        });
        Ok(())
    }

    async fn close_window(&self, window: HostWindowId) -> Result<()> {
        self.known(window)?;
        self.state.lock().unwrap().windows.remove(&window);
        self.record(HostCall::CloseWindow(window));
        Ok(())
    }

    async fn window_value(&self, window: HostWindowId, key: &str) -> Result<Option<Value>> {
        self.known(window)?;
        Ok(self.stored_value(window, key))
    }

    async fn set_window_value(&self, window: HostWindowId, key: &str, value: Value) -> Result<()> {
        self.known(window)?;
        self.store_window_value(window, key, value.clone());
        self.record(HostCall::SetWindowValue {
            window,
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    async fn tab_marker(&self, tab: TabId, key: &str) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tab_markers
            .get(&(tab, key.to_string()))
            .copied()
            .unwrap_or(false))
    }

    async fn set_tab_marker(&self, tab: TabId, key: &str, value: bool) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .tab_markers
            .insert((tab, key.to_string()), value);
        self.record(HostCall::SetTabMarker {
            tab,
            key: key.to_string(),
            value,
        });
        Ok(())
    }
}

/// Yield to other tasks until `done` holds.
pub async fn eventually(what: &str, mut done: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("timed out waiting for {what}");
}

/// Workspace settings with claim retries that do not sleep.
pub fn test_config() -> WorkspaceConfig {
    WorkspaceConfig {
        claim_retry_delay_ms: 0,
        ..WorkspaceConfig::default()
    }
}

/// A connected workspace over fresh fakes.
pub async fn connected(
    script: NativeScript,
    host: MemoryHost,
) -> (Workspace, FakeNative, Arc<MemoryHost>) {
    let native = FakeNative::start(script);
    let host = Arc::new(host);
    let workspace = Workspace::connect(native.client().clone(), host.clone(), test_config())
        .await
        .unwrap();
    (workspace, native, host)
}

/// A persisted placement value as the host would hold it.
pub fn stored(activities: &[&str], desktops: &[&str]) -> Value {
    json!({ "activities": activities, "desktops": desktops })
}

/// Wait until every tracked window knows its membership.
pub async fn settled(workspace: &Workspace) {
    eventually("membership of every window", || {
        workspace
            .focus_order()
            .iter()
            .all(|record| record.is_membership_known())
    })
    .await;
}
