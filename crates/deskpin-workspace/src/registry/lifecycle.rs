//! Background work attached to each tracked window.

use std::sync::Arc;

use deskpin_common::{ActivityId, ClaimError, DesktopId, HostWindowId};
use tracing::{debug, info, warn};

use super::Workspace;
use crate::claim::{claim_identity, ClaimPolicy};
use crate::storage::StorageRecord;
use crate::window::WindowRecord;

impl Workspace {
    pub(super) fn spawn_host_id_index(&self, record: &Arc<WindowRecord>) {
        let workspace = self.clone();
        let record = Arc::clone(record);
        tokio::spawn(async move {
            if let Some(window) = record.wait_host_id().await {
                workspace.index_host_id(&record, window);
            }
        });
    }

    pub(super) fn spawn_claim(&self, record: &Arc<WindowRecord>) {
        let workspace = self.clone();
        let record = Arc::clone(record);
        tokio::spawn(async move {
            let Some(window) = record.wait_host_id().await else {
                return;
            };
            let policy = ClaimPolicy::from(workspace.config());
            let outcome = claim_identity(
                workspace.host().as_ref(),
                workspace.native(),
                window,
                policy,
            )
            .await;

            match &outcome {
                Ok(uuid) => workspace.index_uuid(&record, uuid),
                Err(ClaimError::Closed) => {}
                Err(e) => warn!(%window, error = %e, "giving up on window identity"),
            }
            record.settle_identity(outcome);
        });
    }

    pub(super) fn spawn_present_membership(
        &self,
        record: &Arc<WindowRecord>,
        window: HostWindowId,
    ) {
        let workspace = self.clone();
        let record = Arc::clone(record);
        tokio::spawn(async move {
            workspace.discover_membership(&record, window).await;
        });
    }

    /// Restore membership from session storage, or ask the native bridge.
    async fn discover_membership(&self, record: &WindowRecord, window: HostWindowId) {
        if let Some(stored) = self.read_storage(window).await {
            info!(%window, "restoring persisted placement");
            record.activities().resolve(stored.activity_set());
            record.desktops().resolve(stored.desktop_set());
            if let Err(e) = self
                .move_to(record, &stored.activities, &stored.desktops)
                .await
            {
                debug!(%window, error = %e, "persisted placement not re-asserted");
            }
            return;
        }

        let uuid = match record.wait_uuid().await {
            Ok(uuid) => uuid,
            Err(e) => {
                debug!(%window, error = %e, "membership unknown without identity");
                return;
            }
        };

        let (desktops, activities) = tokio::join!(
            self.native().get_window_desktops(&uuid),
            self.native().get_window_activities(&uuid)
        );
        let mut complete = true;
        match desktops {
            Ok(desktops) => {
                record.desktops().resolve(desktops.into_iter().collect());
            }
            Err(e) => {
                warn!(%window, %uuid, error = %e, "failed to query window desktops");
                complete = false;
            }
        }
        match activities {
            Ok(activities) => {
                record.activities().resolve(activities.into_iter().collect());
            }
            Err(e) => {
                warn!(%window, %uuid, error = %e, "failed to query window activities");
                complete = false;
            }
        }
        if !complete {
            record.stall_membership();
        }
    }

    async fn read_storage(&self, window: HostWindowId) -> Option<StorageRecord> {
        let key = &self.config().storage_key;
        match self.host().window_value(window, key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(stored) => Some(stored),
                Err(e) => {
                    warn!(%window, error = %e, "ignoring unreadable persisted placement");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(%window, error = %e, "failed to read persisted placement");
                None
            }
        }
    }

    /// Persist once both memberships are first known. If they never become
    /// known here, the signal that completes them does the first save.
    pub(super) fn spawn_initial_save(&self, record: &Arc<WindowRecord>) {
        let workspace = self.clone();
        let record = Arc::clone(record);
        tokio::spawn(async move {
            let known = async {
                record.wait_membership().await && record.wait_host_id().await.is_some()
            };
            let ready = tokio::select! {
                biased;
                _ = record.closed() => false,
                known = known => known,
            };
            if ready && record.take_first_save() {
                workspace.save_storage(&record).await;
            }
        });
    }

    pub(super) fn spawn_save(&self, record: Arc<WindowRecord>) {
        let workspace = self.clone();
        tokio::spawn(async move {
            workspace.save_storage(&record).await;
        });
    }

    /// Write the window's membership to session storage. Does nothing until
    /// the host id and both memberships are known, or once the window closed.
    pub async fn save_storage(&self, record: &WindowRecord) {
        if record.is_closed() {
            return;
        }
        let (Some(window), Some(stored)) = (record.host_id().get(), record.storage_record())
        else {
            return;
        };
        let value = match serde_json::to_value(&stored) {
            Ok(value) => value,
            Err(e) => {
                warn!(%window, error = %e, "failed to encode placement");
                return;
            }
        };
        match self
            .host()
            .set_window_value(window, &self.config().storage_key, value)
            .await
        {
            Ok(()) => debug!(%window, "persisted placement"),
            Err(e) => warn!(%window, error = %e, "failed to persist placement"),
        }
    }

    /// Ask the native bridge to put the window on `activities`/`desktops`.
    ///
    /// Waits only for the window's identity. Both requests are sent before
    /// this returns; their outcome is logged in the background.
    pub async fn move_to(
        &self,
        record: &WindowRecord,
        activities: &[ActivityId],
        desktops: &[DesktopId],
    ) -> Result<(), ClaimError> {
        let uuid = record.wait_uuid().await?;
        let set_activities = self.native().set_window_activities(&uuid, activities);
        let set_desktops = self.native().set_window_desktops(&uuid, desktops);
        tokio::spawn(async move {
            let (activities, desktops) = tokio::join!(set_activities, set_desktops);
            if let Err(e) = activities {
                warn!(%uuid, error = %e, "failed to set window activities");
            }
            if let Err(e) = desktops {
                warn!(%uuid, error = %e, "failed to set window desktops");
            }
        });
        Ok(())
    }
}
