//! Placement policy: every new tab ends up in a window on the desktop and
//! activity the user is looking at.

use std::sync::Arc;

use deskpin_common::{
    ActivityId, DeskpinError, DesktopId, HostWindowId, ResolvableFuture, TabId,
};
use tracing::{debug, info, warn};

use crate::registry::Workspace;
use crate::window::WindowRecord;

/// Why a tab was left where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The host did not say which tab or window.
    MissingIds,
    /// The tab was placed before (e.g. restored from a previous session).
    AlreadyPlaced,
    /// A window involved can no longer be resolved.
    Unresolved,
}

/// Outcome of placing one tab.
#[derive(Debug, Clone)]
pub enum Placement {
    Skipped(SkipReason),
    /// Moved into an existing window.
    Reused {
        window: HostWindowId,
        /// The originating window, if it was closed because the tab left it.
        relinquished: Option<HostWindowId>,
    },
    /// Moved into a window created for it.
    Created(Arc<WindowRecord>),
}

/// First window in `focus_order` that lives on `desktop` in `activity`.
pub fn select_target<'a>(
    focus_order: &'a [Arc<WindowRecord>],
    desktop: &DesktopId,
    activity: &ActivityId,
) -> Option<&'a Arc<WindowRecord>> {
    focus_order
        .iter()
        .find(|record| record.matches(desktop, activity))
}

/// Place a newly created tab.
pub async fn place_tab(
    workspace: &Workspace,
    tab: Option<TabId>,
    window: Option<HostWindowId>,
) -> Result<Placement, DeskpinError> {
    let (Some(tab), Some(origin)) = (tab, window) else {
        debug!(?tab, ?window, "tab event without ids");
        return Ok(Placement::Skipped(SkipReason::MissingIds));
    };

    let desktop = workspace.current_desktop();
    let activity = workspace.current_activity();
    let record = workspace
        .window_by_id(origin)
        .unwrap_or_else(|| workspace.register_present(origin));

    let host = workspace.host();
    let marker = &workspace.config().tab_marker_key;
    if host.tab_marker(tab, marker).await? {
        debug!(%tab, "tab already placed");
        return Ok(Placement::Skipped(SkipReason::AlreadyPlaced));
    }
    host.set_tab_marker(tab, marker, true).await?;

    if !record.wait_membership().await {
        warn!(%tab, window = %origin, "origin window membership unknown, leaving tab");
        return Ok(Placement::Skipped(SkipReason::Unresolved));
    }

    let focus_order = workspace.focus_order();
    if let Some(target) = select_target(&focus_order, &desktop, &activity) {
        let Some(target) = target.wait_host_id().await else {
            warn!(%tab, "target window closed before it existed, leaving tab");
            return Ok(Placement::Skipped(SkipReason::Unresolved));
        };
        host.move_tab(tab, target, -1).await?;
        host.focus_window(target).await?;
        host.activate_tab(tab).await?;

        let was_fresh = workspace.take_fresh(origin);
        let relinquished = if was_fresh && target != origin {
            match host.close_window(origin).await {
                Ok(()) => Some(origin),
                Err(e) => {
                    debug!(window = %origin, error = %e, "could not close emptied window");
                    None
                }
            }
        } else {
            None
        };
        info!(%tab, window = %target, "tab placed in existing window");
        return Ok(Placement::Reused {
            window: target,
            relinquished,
        });
    }

    let (host_id, resolver) = ResolvableFuture::pending();
    let created = workspace.register_future(host_id, activity.clone(), desktop.clone());
    let window = match host.create_window(Some(tab)).await {
        Ok(window) => window,
        Err(e) => {
            workspace.discard(&created);
            return Err(e.into());
        }
    };
    resolver.resolve(window);
    workspace.take_fresh(origin);
    info!(%tab, %window, %desktop, %activity, "tab placed in new window");

    if let Err(e) = workspace
        .move_to(&created, &[activity.clone()], &[desktop.clone()])
        .await
    {
        warn!(%window, error = %e, "new window not pinned");
    }
    let switch = workspace
        .native()
        .switch_to_activity_desktop(&activity, &desktop);
    tokio::spawn(async move {
        if let Err(e) = switch.await {
            warn!(error = %e, "failed to switch desktop");
        }
    });

    Ok(Placement::Created(created))
}
