//! Per-window state: host id, claimed identity and desktop/activity membership.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use deskpin_common::{
    ActivityId, ClaimError, DesktopId, HostWindowId, ResolvableFuture, WindowUuid,
};

use crate::storage::StorageRecord;

/// A set of desktops or activities a window belongs to.
///
/// The first value arrives once (from storage, a native query or the caller);
/// signal-driven updates replace it afterwards.
#[derive(Debug)]
pub struct Membership<T> {
    first: ResolvableFuture<BTreeSet<T>>,
    latest: Mutex<Option<BTreeSet<T>>>,
}

impl<T: Ord + Clone> Membership<T> {
    pub fn pending() -> Self {
        let (first, _) = ResolvableFuture::pending();
        Self {
            first,
            latest: Mutex::new(None),
        }
    }

    pub fn known(set: BTreeSet<T>) -> Self {
        Self {
            first: ResolvableFuture::resolved(set),
            latest: Mutex::new(None),
        }
    }

    /// Supply the initial value. Ignored once any value is known.
    pub fn resolve(&self, set: BTreeSet<T>) -> bool {
        self.first.resolve(set)
    }

    /// Replace the value, resolving it first if it was still pending.
    pub fn update(&self, set: BTreeSet<T>) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(set.clone());
        self.first.resolve(set);
    }

    pub fn is_resolved(&self) -> bool {
        self.first.is_resolved()
    }

    /// Current value, `None` while unresolved.
    pub fn get(&self) -> Option<BTreeSet<T>> {
        let latest = self
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        latest.or_else(|| self.first.get())
    }

    pub async fn wait(&self) -> BTreeSet<T> {
        let first = self.first.wait().await;
        self.get().unwrap_or(first)
    }

    /// Empty means every member; unresolved never matches.
    pub fn admits(&self, member: &T) -> bool {
        self.get()
            .map(|set| set.is_empty() || set.contains(member))
            .unwrap_or(false)
    }
}

/// One tracked host window.
#[derive(Debug)]
pub struct WindowRecord {
    host_id: ResolvableFuture<HostWindowId>,
    identity: ResolvableFuture<Result<WindowUuid, ClaimError>>,
    desktops: Membership<DesktopId>,
    activities: Membership<ActivityId>,
    /// Set once membership can no longer arrive by itself.
    stalled: ResolvableFuture<()>,
    closed: ResolvableFuture<()>,
    /// Set by whoever performs the first write-back.
    first_save_taken: AtomicBool,
}

impl WindowRecord {
    fn with(
        host_id: ResolvableFuture<HostWindowId>,
        desktops: Membership<DesktopId>,
        activities: Membership<ActivityId>,
    ) -> Self {
        let (identity, _) = ResolvableFuture::pending();
        let (stalled, _) = ResolvableFuture::pending();
        let (closed, _) = ResolvableFuture::pending();
        Self {
            host_id,
            identity,
            desktops,
            activities,
            stalled,
            closed,
            first_save_taken: AtomicBool::new(false),
        }
    }

    /// A window that already exists; membership is discovered later.
    pub fn present(host_id: HostWindowId) -> Self {
        Self::with(
            ResolvableFuture::resolved(host_id),
            Membership::pending(),
            Membership::pending(),
        )
    }

    /// A window being created for a known desktop/activity pair.
    pub fn future(
        host_id: ResolvableFuture<HostWindowId>,
        activities: BTreeSet<ActivityId>,
        desktops: BTreeSet<DesktopId>,
    ) -> Self {
        Self::with(
            host_id,
            Membership::known(desktops),
            Membership::known(activities),
        )
    }

    pub fn host_id(&self) -> &ResolvableFuture<HostWindowId> {
        &self.host_id
    }

    /// Wait for the host id; `None` if the window went away first.
    pub async fn wait_host_id(&self) -> Option<HostWindowId> {
        tokio::select! {
            biased;
            id = self.host_id.wait() => Some(id),
            _ = self.closed.wait() => None,
        }
    }

    pub fn desktops(&self) -> &Membership<DesktopId> {
        &self.desktops
    }

    pub fn activities(&self) -> &Membership<ActivityId> {
        &self.activities
    }

    /// The claimed uuid, if the claim has succeeded.
    pub fn uuid(&self) -> Option<WindowUuid> {
        self.identity.get().and_then(Result::ok)
    }

    /// Wait for the claim to finish either way.
    pub async fn wait_uuid(&self) -> Result<WindowUuid, ClaimError> {
        self.identity.wait().await
    }

    pub(crate) fn settle_identity(&self, outcome: Result<WindowUuid, ClaimError>) -> bool {
        if outcome.is_err() {
            self.stalled.resolve(());
        }
        self.identity.resolve(outcome)
    }

    /// Give up on membership that has not arrived yet.
    pub(crate) fn stall_membership(&self) {
        self.stalled.resolve(());
    }

    pub fn is_membership_known(&self) -> bool {
        self.desktops.is_resolved() && self.activities.is_resolved()
    }

    /// Wait until both memberships are known. Returns `false` if they never
    /// will be: the claim failed, a membership query failed or the window
    /// closed first.
    pub async fn wait_membership(&self) -> bool {
        let known = async {
            tokio::join!(self.desktops.wait(), self.activities.wait());
        };
        tokio::select! {
            biased;
            _ = known => true,
            _ = self.stalled.wait() => self.is_membership_known(),
        }
    }

    /// `true` when this window is on `desktop` and in `activity`.
    pub fn matches(&self, desktop: &DesktopId, activity: &ActivityId) -> bool {
        self.desktops.admits(desktop) && self.activities.admits(activity)
    }

    /// The record to persist, once both memberships are known.
    pub fn storage_record(&self) -> Option<StorageRecord> {
        let activities = self.activities.get()?;
        let desktops = self.desktops.get()?;
        Some(StorageRecord::new(&activities, &desktops))
    }

    /// Claim the first write-back of this window's membership. Returns
    /// `true` exactly once per record.
    pub(crate) fn take_first_save(&self) -> bool {
        !self.first_save_taken.swap(true, Ordering::AcqRel)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_resolved()
    }

    /// Resolves once the window has been removed.
    pub async fn closed(&self) {
        self.closed.wait().await
    }

    /// Releases everyone still waiting on this record.
    pub(crate) fn mark_closed(&self) {
        self.closed.resolve(());
        self.stalled.resolve(());
        self.identity.resolve(Err(ClaimError::Closed));
    }
}
