//! The workspace: every tracked window plus the current desktop and activity.
//!
//! All registry structures live behind one mutex and are only touched in
//! short synchronous sections, so a record is never half-inserted.

mod events;
mod lifecycle;


use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use deskpin_common::{
    ActivityId, DebouncedValue, DeskpinError, DesktopId, HostWindowId, ResolvableFuture,
    WindowUuid,
};
use deskpin_config::WorkspaceConfig;
use deskpin_native::NativeClient;
use tracing::{debug, info};

use crate::host::WindowHost;
use crate::window::WindowRecord;

#[derive(Default)]
struct Registry {
    by_id: HashMap<HostWindowId, Arc<WindowRecord>>,
    by_uuid: HashMap<WindowUuid, Arc<WindowRecord>>,
    /// Most recently focused first.
    focus: Vec<Arc<WindowRecord>>,
    /// Windows announced as created that have not received a placed tab.
    fresh: HashSet<HostWindowId>,
    /// Removals that matched no record, in case the record is still being
    /// created and indexes its host id later.
    unmatched_removals: VecDeque<HostWindowId>,
}

const UNMATCHED_REMOVALS: usize = 64;

impl Registry {
    /// The record for `window`, including one whose host id is known but
    /// not indexed yet.
    fn find(&self, window: HostWindowId) -> Option<Arc<WindowRecord>> {
        self.by_id.get(&window).cloned().or_else(|| {
            self.focus
                .iter()
                .find(|record| record.host_id().get() == Some(window))
                .cloned()
        })
    }

    fn remember_removal(&mut self, window: HostWindowId) {
        if self.unmatched_removals.len() == UNMATCHED_REMOVALS {
            self.unmatched_removals.pop_front();
        }
        self.unmatched_removals.push_back(window);
    }

    fn take_removal(&mut self, window: HostWindowId) -> bool {
        match self.unmatched_removals.iter().position(|w| *w == window) {
            Some(at) => {
                self.unmatched_removals.remove(at);
                true
            }
            None => false,
        }
    }

    fn forget(&mut self, record: &Arc<WindowRecord>) {
        self.focus.retain(|r| !Arc::ptr_eq(r, record));
        self.by_id.retain(|_, r| !Arc::ptr_eq(r, record));
        self.by_uuid.retain(|_, r| !Arc::ptr_eq(r, record));
    }
}

struct WorkspaceInner {
    native: NativeClient,
    host: Arc<dyn WindowHost>,
    config: WorkspaceConfig,
    desktop: DebouncedValue<DesktopId>,
    activity: DebouncedValue<ActivityId>,
    registry: Mutex<Registry>,
}

/// Shared handle to the window registry.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

impl Workspace {
    /// Query the current desktop and activity, subscribe to native signals
    /// and start tracking every window the host already has.
    pub async fn connect(
        native: NativeClient,
        host: Arc<dyn WindowHost>,
        config: WorkspaceConfig,
    ) -> Result<Self, DeskpinError> {
        let (activity, desktop) =
            tokio::try_join!(native.get_current_activity(), native.get_current_desktop())?;
        info!(%activity, %desktop, "connected to native bridge");

        let grace = config.debounce();
        let workspace = Self {
            inner: Arc::new(WorkspaceInner {
                native,
                host,
                config,
                desktop: DebouncedValue::new(desktop, grace),
                activity: DebouncedValue::new(activity, grace),
                registry: Mutex::new(Registry::default()),
            }),
        };

        let weak: Weak<WorkspaceInner> = Arc::downgrade(&workspace.inner);
        workspace.inner.native.on_signal(move |signal| {
            if let Some(inner) = weak.upgrade() {
                Workspace { inner }.on_native_signal(signal);
            }
        });

        let windows = workspace.inner.host.list_windows().await?;
        info!(count = windows.len(), "tracking existing windows");
        for window in windows {
            workspace.register_present(window);
        }
        Ok(workspace)
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn native(&self) -> &NativeClient {
        &self.inner.native
    }

    pub fn host(&self) -> &Arc<dyn WindowHost> {
        &self.inner.host
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.inner.config
    }

    /// Desktop believed current, lagging switches by the debounce period.
    pub fn current_desktop(&self) -> DesktopId {
        self.inner.desktop.get()
    }

    pub fn current_activity(&self) -> ActivityId {
        self.inner.activity.get()
    }

    pub fn window_by_id(&self, window: HostWindowId) -> Option<Arc<WindowRecord>> {
        self.registry().by_id.get(&window).cloned()
    }

    pub fn window_by_uuid(&self, uuid: &WindowUuid) -> Option<Arc<WindowRecord>> {
        self.registry().by_uuid.get(uuid).cloned()
    }

    /// Snapshot of the focus order, most recent first.
    pub fn focus_order(&self) -> Vec<Arc<WindowRecord>> {
        self.registry().focus.clone()
    }

    pub fn window_count(&self) -> usize {
        self.registry().focus.len()
    }

    pub fn is_fresh(&self, window: HostWindowId) -> bool {
        self.registry().fresh.contains(&window)
    }

    /// Clear the fresh flag, reporting whether it was set.
    pub(crate) fn take_fresh(&self, window: HostWindowId) -> bool {
        self.registry().fresh.remove(&window)
    }

    /// Start tracking an existing window, or return its record if tracked.
    pub fn register_present(&self, window: HostWindowId) -> Arc<WindowRecord> {
        let record = {
            let mut registry = self.registry();
            if let Some(existing) = registry.by_id.get(&window) {
                return Arc::clone(existing);
            }
            let record = Arc::new(WindowRecord::present(window));
            registry.by_id.insert(window, Arc::clone(&record));
            registry.focus.insert(0, Arc::clone(&record));
            record
        };
        debug!(%window, "tracking present window");

        self.spawn_claim(&record);
        self.spawn_present_membership(&record, window);
        self.spawn_initial_save(&record);
        record
    }

    /// Track a window that is being created for `activity`/`desktop`. It
    /// takes the front of the focus order right away and is indexed by host
    /// id once `host_id` resolves.
    pub fn register_future(
        &self,
        host_id: ResolvableFuture<HostWindowId>,
        activity: ActivityId,
        desktop: DesktopId,
    ) -> Arc<WindowRecord> {
        let record = Arc::new(WindowRecord::future(
            host_id,
            BTreeSet::from([activity]),
            BTreeSet::from([desktop]),
        ));
        self.registry().focus.insert(0, Arc::clone(&record));
        debug!("tracking window being created");

        self.spawn_host_id_index(&record);
        self.spawn_claim(&record);
        self.spawn_initial_save(&record);
        record
    }

    fn index_host_id(&self, record: &Arc<WindowRecord>, window: HostWindowId) {
        let mut registry = self.registry();
        if record.is_closed() {
            return;
        }
        if registry.take_removal(window) {
            registry.forget(record);
            record.mark_closed();
            info!(%window, "window removed before it was indexed");
            return;
        }
        registry.fresh.remove(&window);
        registry.by_id.insert(window, Arc::clone(record));
    }

    fn index_uuid(&self, record: &Arc<WindowRecord>, uuid: &WindowUuid) {
        let mut registry = self.registry();
        if record.is_closed() {
            return;
        }
        registry.by_uuid.insert(uuid.clone(), Arc::clone(record));
    }

    fn focus(&self, window: HostWindowId) {
        let mut registry = self.registry();
        let Some(record) = registry.by_id.get(&window).cloned() else {
            return;
        };
        registry.focus.retain(|r| !Arc::ptr_eq(r, &record));
        registry.focus.insert(0, record);
    }

    fn mark_fresh(&self, window: HostWindowId) {
        let mut registry = self.registry();
        if !registry.by_id.contains_key(&window) {
            registry.fresh.insert(window);
        }
    }

    fn remove(&self, window: HostWindowId) {
        let mut registry = self.registry();
        registry.fresh.remove(&window);
        let Some(record) = registry.find(window) else {
            registry.remember_removal(window);
            return;
        };
        registry.forget(&record);
        record.mark_closed();
        info!(%window, remaining = registry.focus.len(), "window removed");
    }

    /// Drop a record whose window never came to exist.
    pub(crate) fn discard(&self, record: &Arc<WindowRecord>) {
        self.registry().forget(record);
        record.mark_closed();
    }
}
