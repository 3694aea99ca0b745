//! Subscription handle returned by [`SyncEngine::subscribe`](super::SyncEngine::subscribe).

use leadline_types::sync::{SubscriptionTarget, SyncSnapshot};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Owner of one live feed.
///
/// The view is read through a `watch` channel. Cancelling (explicitly or by
/// dropping the handle) tears the feed down; repeated cancels are no-ops.
#[derive(Debug)]
pub struct SubscriptionHandle {
    target: SubscriptionTarget,
    view: watch::Receiver<SyncSnapshot>,
    token: CancellationToken,
}

impl SubscriptionHandle {
    pub(crate) fn new(
        target: SubscriptionTarget,
        view: watch::Receiver<SyncSnapshot>,
        token: CancellationToken,
    ) -> Self {
        Self {
            target,
            view,
            token,
        }
    }

    pub fn target(&self) -> &SubscriptionTarget {
        &self.target
    }

    /// Copy of the current view.
    pub fn snapshot(&self) -> SyncSnapshot {
        self.view.borrow().clone()
    }

    /// An independent receiver for observers (WebSocket pumps, watchers).
    pub fn watch(&self) -> watch::Receiver<SyncSnapshot> {
        self.view.clone()
    }

    /// Wait for the next published snapshot.
    ///
    /// Returns `None` once the subscription task has exited and nothing
    /// further will be published.
    pub async fn changed(&mut self) -> Option<SyncSnapshot> {
        self.view.changed().await.ok()?;
        Some(self.view.borrow_and_update().clone())
    }

    /// Wait until the view satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&SyncSnapshot) -> bool,
    ) -> Option<SyncSnapshot> {
        self.view
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .ok()
            .map(|snapshot| snapshot.clone())
    }

    /// Tear down the feed. Safe to call any number of times, including
    /// while the initial fetch is still in flight.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
