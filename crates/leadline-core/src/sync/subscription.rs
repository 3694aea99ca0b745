//! The per-subscription task: open feed, fetch, merge, drain, reconnect.
//!
//! One task owns one view exclusively. The feed is opened before the fetch
//! so that writes landing during the fetch are buffered in the feed and
//! deduplicated after the fetch merges.

use std::sync::Arc;

use futures_util::StreamExt;
use leadline_types::config::ReconnectConfig;
use leadline_types::error::RepositoryError;
use leadline_types::lead::{Lead, LeadUid};
use leadline_types::message::Message;
use leadline_types::sync::{FeedEvent, FeedStatus, SubscriptionTarget, SyncSnapshot, ViewData};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backoff::Backoff;
use super::timeline::Timeline;
use crate::repository::{Feed, FeedSource, LeadRepository, MessageRepository};

/// Result of fetching the target's current state.
enum Fetched {
    Session(Vec<Message>),
    Roster(Vec<Lead>),
    Unbound,
}

/// Why a connect or drain step stopped.
enum Stop {
    Cancelled,
    Failed(RepositoryError),
    Disconnected,
}

enum View {
    Session(Timeline),
    Roster(Vec<Lead>),
}

/// Mutable state owned by the subscription task.
struct ViewState {
    target: SubscriptionTarget,
    view: View,
    status: FeedStatus,
    revision: u64,
    tx: watch::Sender<SyncSnapshot>,
}

impl ViewState {
    fn new(target: SubscriptionTarget, tx: watch::Sender<SyncSnapshot>) -> Self {
        let view = match target {
            SubscriptionTarget::Session { .. } => View::Session(Timeline::new()),
            SubscriptionTarget::Roster => View::Roster(Vec::new()),
        };
        Self {
            target,
            view,
            status: FeedStatus::Connecting,
            revision: 0,
            tx,
        }
    }

    fn publish(&self) {
        let data = match &self.view {
            View::Session(timeline) => ViewData::Session(timeline.to_vec()),
            View::Roster(leads) => ViewData::Roster(leads.clone()),
        };
        self.tx.send_replace(SyncSnapshot {
            target: self.target.clone(),
            status: self.status,
            revision: self.revision,
            data,
        });
    }

    fn set_status(&mut self, status: FeedStatus) {
        if self.status != status {
            self.status = status;
            self.publish();
        }
    }

    /// Merge a fetch result and go live in a single publish.
    fn apply_fetch(&mut self, fetched: Fetched) {
        let changed = match (&mut self.view, fetched) {
            (View::Session(timeline), Fetched::Session(messages)) => timeline.merge(messages) > 0,
            (View::Roster(current), Fetched::Roster(leads)) => replace_roster(current, leads),
            _ => false,
        };
        if changed {
            self.revision += 1;
        }
        self.status = FeedStatus::Live;
        self.publish();
    }

    fn insert_message(&mut self, message: Message) {
        if let View::Session(timeline) = &mut self.view {
            let id = message.id;
            if timeline.insert(message) {
                self.revision += 1;
                self.publish();
            } else {
                debug!(target_view = %self.target, %id, "duplicate message dropped");
            }
        }
    }

    fn replace_roster(&mut self, leads: Vec<Lead>) {
        if let View::Roster(current) = &mut self.view {
            if replace_roster(current, leads) {
                self.revision += 1;
                self.publish();
            }
        }
    }
}

fn replace_roster(current: &mut Vec<Lead>, leads: Vec<Lead>) -> bool {
    if *current == leads {
        return false;
    }
    *current = leads;
    true
}

pub(crate) struct Subscription<S> {
    store: Arc<S>,
    token: CancellationToken,
    backoff: Backoff,
    state: ViewState,
}

impl<S> Subscription<S>
where
    S: LeadRepository + MessageRepository + FeedSource + 'static,
{
    pub(crate) fn new(
        store: Arc<S>,
        target: SubscriptionTarget,
        reconnect: ReconnectConfig,
        token: CancellationToken,
        tx: watch::Sender<SyncSnapshot>,
    ) -> Self {
        Self {
            store,
            token,
            backoff: Backoff::new(reconnect),
            state: ViewState::new(target, tx),
        }
    }

    pub(crate) async fn run(mut self) {
        info!(target_view = %self.state.target, "subscription started");
        loop {
            match self.connect().await {
                Ok(Some(feed)) => {
                    self.backoff.reset();
                    match self.drain(feed).await {
                        Stop::Cancelled => break,
                        Stop::Disconnected => {
                            warn!(target_view = %self.state.target, "feed disconnected");
                        }
                        Stop::Failed(e) => {
                            warn!(target_view = %self.state.target, error = %e, "roster refetch failed");
                        }
                    }
                }
                Ok(None) => {
                    info!(target_view = %self.state.target, "session has no lead");
                    self.state.set_status(FeedStatus::Unbound);
                    return;
                }
                Err(Stop::Cancelled) => break,
                Err(Stop::Failed(e)) => {
                    warn!(target_view = %self.state.target, error = %e, "connect failed");
                }
                Err(Stop::Disconnected) => {}
            }

            let Some(delay) = self.backoff.next_delay() else {
                let attempts = self.backoff.attempt();
                warn!(target_view = %self.state.target, attempts, "subscription lost");
                self.state.set_status(FeedStatus::Lost { attempts });
                return;
            };
            self.state.set_status(FeedStatus::Reconnecting {
                attempt: self.backoff.attempt(),
            });
            debug!(target_view = %self.state.target, delay_ms = delay.as_millis() as u64, "reconnecting");
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        self.state.set_status(FeedStatus::Cancelled);
        debug!(target_view = %self.state.target, "subscription cancelled");
    }

    /// Open the feed, then fetch and merge current state.
    ///
    /// Returns `Ok(None)` when the session has no lead.
    async fn connect(&mut self) -> Result<Option<Feed>, Stop> {
        let target = self.state.target.clone();
        let feed = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Err(Stop::Cancelled),
            feed = self.store.open_feed(&target) => feed.map_err(Stop::Failed)?,
        };

        let fetched = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Err(Stop::Cancelled),
            fetched = fetch(self.store.as_ref(), &target) => fetched.map_err(Stop::Failed)?,
        };

        // A result that raced a cancel is discarded.
        if self.token.is_cancelled() {
            return Err(Stop::Cancelled);
        }
        if matches!(fetched, Fetched::Unbound) {
            return Ok(None);
        }
        self.state.apply_fetch(fetched);
        debug!(target_view = %target, revision = self.state.revision, "initial fetch merged");
        Ok(Some(feed))
    }

    async fn drain(&mut self, mut feed: Feed) -> Stop {
        let target = self.state.target.clone();
        loop {
            let event = tokio::select! {
                biased;
                _ = self.token.cancelled() => return Stop::Cancelled,
                event = feed.next() => event,
            };
            let Some(event) = event else {
                return Stop::Disconnected;
            };
            if !event.matches(&target) {
                continue;
            }
            match event {
                FeedEvent::MessageInserted { message } => {
                    if self.token.is_cancelled() {
                        return Stop::Cancelled;
                    }
                    self.state.insert_message(message);
                }
                FeedEvent::LeadChanged { uid, change } => {
                    debug!(%uid, ?change, "lead changed, refetching roster");
                    let leads = tokio::select! {
                        biased;
                        _ = self.token.cancelled() => return Stop::Cancelled,
                        leads = self.store.list_leads() => leads,
                    };
                    match leads {
                        Ok(leads) if !self.token.is_cancelled() => self.state.replace_roster(leads),
                        Ok(_) => return Stop::Cancelled,
                        Err(e) => return Stop::Failed(e),
                    }
                }
            }
        }
    }
}

async fn fetch<S>(store: &S, target: &SubscriptionTarget) -> Result<Fetched, RepositoryError>
where
    S: LeadRepository + MessageRepository,
{
    match target {
        SubscriptionTarget::Session { session_id } => fetch_session(store, session_id).await,
        SubscriptionTarget::Roster => Ok(Fetched::Roster(store.list_leads().await?)),
    }
}

async fn fetch_session<S>(store: &S, session_id: &LeadUid) -> Result<Fetched, RepositoryError>
where
    S: LeadRepository + MessageRepository,
{
    if store.get_lead(session_id).await?.is_none() {
        return Ok(Fetched::Unbound);
    }
    Ok(Fetched::Session(store.list_messages(session_id).await?))
}
