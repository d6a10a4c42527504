//! Reactions to host events and native signals.

use std::sync::Arc;

use deskpin_native::NativeSignal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::Workspace;
use crate::host::HostEvent;
use crate::placement::place_tab;
use crate::window::WindowRecord;

impl Workspace {
    /// Consume host events until the sender side goes away.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<HostEvent>) {
        info!("workspace event loop started");
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        info!("host event stream ended");
    }

    pub fn handle_event(&self, event: HostEvent) {
        debug!(?event, "host event");
        match event {
            HostEvent::WindowCreated(window) => self.mark_fresh(window),
            HostEvent::WindowFocusChanged(window) => self.focus(window),
            HostEvent::WindowRemoved(window) => self.remove(window),
            HostEvent::TabCreated { tab, window } => {
                let workspace = self.clone();
                tokio::spawn(async move {
                    match place_tab(&workspace, tab, window).await {
                        Ok(placement) => debug!(?placement, "tab placed"),
                        Err(e) => warn!(?tab, ?window, error = %e, "tab placement failed"),
                    }
                });
            }
        }
    }

    pub(super) fn on_native_signal(&self, signal: NativeSignal) {
        match signal {
            NativeSignal::DesktopChanged(desktop) => {
                debug!(%desktop, "desktop changed");
                self.inner.desktop.set(desktop);
            }
            NativeSignal::ActivityChanged(activity) => {
                debug!(%activity, "activity changed");
                self.inner.activity.set(activity);
            }
            NativeSignal::WindowDesktopsChanged { uuid, desktops } => {
                let Some(record) = self.window_by_uuid(&uuid) else {
                    debug!(%uuid, "desktops changed for untracked window");
                    return;
                };
                let was_known = record.is_membership_known();
                record.desktops().update(desktops.into_iter().collect());
                self.persist_after_signal(record, was_known);
            }
            NativeSignal::WindowActivitiesChanged { uuid, activities } => {
                let Some(record) = self.window_by_uuid(&uuid) else {
                    debug!(%uuid, "activities changed for untracked window");
                    return;
                };
                let was_known = record.is_membership_known();
                record.activities().update(activities.into_iter().collect());
                self.persist_after_signal(record, was_known);
            }
        }
    }

    /// Changes to known membership are always persisted. A signal that
    /// completes membership only saves if the initial save has not.
    fn persist_after_signal(&self, record: Arc<WindowRecord>, was_known: bool) {
        let first = !was_known && record.is_membership_known() && record.take_first_save();
        if was_known || first {
            self.spawn_save(record);
        }
    }
}
