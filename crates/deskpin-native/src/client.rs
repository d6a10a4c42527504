//! Typed surface of the native desktop-environment bridge.

use std::future::Future;
use std::sync::Arc;

use deskpin_common::{ActivityId, DesktopId, RpcError, WindowUuid};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::warn;

use crate::channel::RpcChannel;

/// Methods the native bridge answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeMethod {
    GetCurrentActivity,
    GetCurrentDesktop,
    GetWindowActivities,
    GetWindowDesktops,
    SwitchToActivityDesktop,
    SetWindowDesktops,
    SetWindowActivities,
    ClaimWindow,
}

impl NativeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            NativeMethod::GetCurrentActivity => "getCurrentActivity",
            NativeMethod::GetCurrentDesktop => "getCurrentDesktop",
            NativeMethod::GetWindowActivities => "getWindowActivities",
            NativeMethod::GetWindowDesktops => "getWindowDesktops",
            NativeMethod::SwitchToActivityDesktop => "switchToActivityDesktop",
            NativeMethod::SetWindowDesktops => "setWindowDesktops",
            NativeMethod::SetWindowActivities => "setWindowActivities",
            NativeMethod::ClaimWindow => "claimWindow",
        }
    }
}

/// Unsolicited notifications from the native bridge.
///
/// The per-window signals are only emitted for windows that were claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeSignal {
    WindowDesktopsChanged {
        uuid: WindowUuid,
        desktops: Vec<DesktopId>,
    },
    WindowActivitiesChanged {
        uuid: WindowUuid,
        activities: Vec<ActivityId>,
    },
    ActivityChanged(ActivityId),
    DesktopChanged(DesktopId),
}

impl NativeSignal {
    pub const NAMES: [&'static str; 4] = [
        "windowDesktopsChanged",
        "windowActivitiesChanged",
        "activityChanged",
        "desktopChanged",
    ];

    /// Decode a signal from its wire name and positional parameters.
    pub fn decode(name: &str, params: &[Value]) -> Result<Self, RpcError> {
        fn args<T: DeserializeOwned>(name: &str, params: &[Value]) -> Result<T, RpcError> {
            serde_json::from_value(Value::Array(params.to_vec()))
                .map_err(|e| RpcError::Decode(format!("{name}: {e}")))
        }

        match name {
            "windowDesktopsChanged" => {
                let (uuid, desktops): (WindowUuid, Vec<DesktopId>) = args(name, params)?;
                Ok(NativeSignal::WindowDesktopsChanged { uuid, desktops })
            }
            "windowActivitiesChanged" => {
                let (uuid, activities): (WindowUuid, Vec<ActivityId>) = args(name, params)?;
                Ok(NativeSignal::WindowActivitiesChanged { uuid, activities })
            }
            "activityChanged" => {
                let (activity,): (ActivityId,) = args(name, params)?;
                Ok(NativeSignal::ActivityChanged(activity))
            }
            "desktopChanged" => {
                let (desktop,): (DesktopId,) = args(name, params)?;
                Ok(NativeSignal::DesktopChanged(desktop))
            }
            other => Err(RpcError::Decode(format!("unknown signal {other}"))),
        }
    }
}

/// Typed client for the native bridge.
///
/// Every method sends its request before returning, so the returned future
/// may be dropped for fire-and-forget calls.
#[derive(Debug, Clone)]
pub struct NativeClient {
    channel: RpcChannel,
}

impl NativeClient {
    pub fn new(channel: RpcChannel) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &RpcChannel {
        &self.channel
    }

    fn request<R>(
        &self,
        method: NativeMethod,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<R, RpcError>> + Send + 'static
    where
        R: DeserializeOwned + Send + 'static,
    {
        let pending = self.channel.call(method.as_str(), params);
        async move {
            let value = pending.await?;
            serde_json::from_value(value)
                .map_err(|e| RpcError::Decode(format!("{}: {e}", method.as_str())))
        }
    }

    pub fn get_current_activity(
        &self,
    ) -> impl Future<Output = Result<ActivityId, RpcError>> + Send + 'static {
        self.request(NativeMethod::GetCurrentActivity, vec![])
    }

    pub fn get_current_desktop(
        &self,
    ) -> impl Future<Output = Result<DesktopId, RpcError>> + Send + 'static {
        self.request(NativeMethod::GetCurrentDesktop, vec![])
    }

    pub fn get_window_activities(
        &self,
        uuid: &WindowUuid,
    ) -> impl Future<Output = Result<Vec<ActivityId>, RpcError>> + Send + 'static {
        self.request(NativeMethod::GetWindowActivities, vec![json!(uuid)])
    }

    pub fn get_window_desktops(
        &self,
        uuid: &WindowUuid,
    ) -> impl Future<Output = Result<Vec<DesktopId>, RpcError>> + Send + 'static {
        self.request(NativeMethod::GetWindowDesktops, vec![json!(uuid)])
    }

    pub fn switch_to_activity_desktop(
        &self,
        activity: &ActivityId,
        desktop: &DesktopId,
    ) -> impl Future<Output = Result<(), RpcError>> + Send + 'static {
        self.request(
            NativeMethod::SwitchToActivityDesktop,
            vec![json!(activity), json!(desktop)],
        )
    }

    pub fn set_window_desktops(
        &self,
        uuid: &WindowUuid,
        desktops: &[DesktopId],
    ) -> impl Future<Output = Result<(), RpcError>> + Send + 'static {
        self.request(
            NativeMethod::SetWindowDesktops,
            vec![json!(uuid), json!(desktops)],
        )
    }

    pub fn set_window_activities(
        &self,
        uuid: &WindowUuid,
        activities: &[ActivityId],
    ) -> impl Future<Output = Result<(), RpcError>> + Send + 'static {
        self.request(
            NativeMethod::SetWindowActivities,
            vec![json!(uuid), json!(activities)],
        )
    }

    /// Ask the bridge for the uuid of the window whose caption starts with
    /// `marker`. An all-zero uuid means no unique window matched.
    pub fn claim_window(
        &self,
        marker: &str,
    ) -> impl Future<Output = Result<WindowUuid, RpcError>> + Send + 'static {
        self.request(NativeMethod::ClaimWindow, vec![json!(marker)])
    }

    /// Deliver every decodable native signal to `handler`. Signals with
    /// malformed parameters are logged and dropped.
    pub fn on_signal<F>(&self, handler: F)
    where
        F: Fn(NativeSignal) + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        for name in NativeSignal::NAMES {
            let handler = Arc::clone(&handler);
            self.channel
                .register_listener(name, move |params| match NativeSignal::decode(name, params) {
                    Ok(signal) => handler(signal),
                    Err(e) => warn!(signal = name, error = %e, "dropping malformed signal"),
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::InboundMessage;
    use std::sync::Mutex;

    #[test]
    fn decodes_window_signals() {
        let signal = NativeSignal::decode(
            "windowDesktopsChanged",
            &[json!("{u1}"), json!(["d1", "d2"])],
        )
        .unwrap();
        assert_eq!(
            signal,
            NativeSignal::WindowDesktopsChanged {
                uuid: WindowUuid::from("{u1}"),
                desktops: vec![DesktopId::from("d1"), DesktopId::from("d2")],
            }
        );

        let signal =
            NativeSignal::decode("windowActivitiesChanged", &[json!("{u1}"), json!([])]).unwrap();
        assert!(
            matches!(signal, NativeSignal::WindowActivitiesChanged { ref activities, .. } if activities.is_empty())
        );
    }

    #[test]
    fn decodes_current_signals() {
        assert_eq!(
            NativeSignal::decode("desktopChanged", &[json!("d3")]).unwrap(),
            NativeSignal::DesktopChanged(DesktopId::from("d3"))
        );
        assert_eq!(
            NativeSignal::decode("activityChanged", &[json!("a2")]).unwrap(),
            NativeSignal::ActivityChanged(ActivityId::from("a2"))
        );
    }

    #[test]
    fn rejects_malformed_signals() {
        assert!(NativeSignal::decode("desktopChanged", &[]).is_err());
        assert!(NativeSignal::decode("desktopChanged", &[json!(3)]).is_err());
        assert!(NativeSignal::decode("windowDesktopsChanged", &[json!("u")]).is_err());
        assert!(NativeSignal::decode("somethingElse", &[]).is_err());
    }

    #[tokio::test]
    async fn typed_calls_encode_params_and_decode_results() {
        let (channel, mut outbound) = RpcChannel::new();
        let client = NativeClient::new(channel.clone());
        let uuid = WindowUuid::from("{u1}");

        let desktops = client.get_window_desktops(&uuid);
        let request = outbound.try_recv().unwrap();
        assert_eq!(request.method, "getWindowDesktops");
        assert_eq!(request.params, vec![json!("{u1}")]);

        channel.dispatch(InboundMessage::Success {
            result: json!(["d1"]),
            id: request.id,
        });
        assert_eq!(desktops.await.unwrap(), vec![DesktopId::from("d1")]);
    }

    #[tokio::test]
    async fn void_methods_accept_null_result() {
        let (channel, mut outbound) = RpcChannel::new();
        let client = NativeClient::new(channel.clone());

        let switched =
            client.switch_to_activity_desktop(&ActivityId::from("a1"), &DesktopId::from("d1"));
        let request = outbound.try_recv().unwrap();
        assert_eq!(request.params, vec![json!("a1"), json!("d1")]);

        channel.dispatch(InboundMessage::Success {
            result: Value::Null,
            id: request.id,
        });
        assert!(switched.await.is_ok());
    }

    #[tokio::test]
    async fn wrong_result_shape_is_decode_error() {
        let (channel, mut outbound) = RpcChannel::new();
        let client = NativeClient::new(channel.clone());

        let desktop = client.get_current_desktop();
        let id = outbound.try_recv().unwrap().id;
        channel.dispatch(InboundMessage::Success {
            result: json!({"not": "a string"}),
            id,
        });
        assert!(matches!(desktop.await, Err(RpcError::Decode(_))));
    }

    #[tokio::test]
    async fn on_signal_forwards_decoded_signals() {
        let (channel, _outbound) = RpcChannel::new();
        let client = NativeClient::new(channel.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client.on_signal(move |signal| sink.lock().unwrap().push(signal));

        channel.dispatch_frame(br#"{"signal":"desktopChanged","params":["d2"]}"#);
        channel.dispatch_frame(br#"{"signal":"desktopChanged","params":[]}"#);
        channel.dispatch_frame(br#"{"signal":"activityChanged","params":["a1"]}"#);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                NativeSignal::DesktopChanged(DesktopId::from("d2")),
                NativeSignal::ActivityChanged(ActivityId::from("a1")),
            ]
        );
    }
}
