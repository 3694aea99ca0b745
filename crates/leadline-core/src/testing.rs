//! In-memory store used by core unit tests.
//!
//! Implements every collaborator trait with knobs for failures, held fetches
//! and forced feed disconnects.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use leadline_types::error::RepositoryError;
use leadline_types::lead::{Lead, LeadPatch, LeadUid, NewLead};
use leadline_types::message::{Message, MessageId, NewMessage, SenderType};
use leadline_types::sync::{FeedEvent, LeadChange, SubscriptionTarget};
use tokio::sync::{Semaphore, broadcast};
use tokio_util::sync::CancellationToken;

use crate::repository::{Feed, FeedSource, LeadRepository, MessageRepository};

#[derive(Default)]
struct State {
    leads: Vec<Lead>,
    messages: Vec<Message>,
    next_id: i64,
}

/// Decrements the live-feed counter when a feed stream is dropped.
struct FeedGuard(Arc<AtomicUsize>);

impl Drop for FeedGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub(crate) struct MemoryStore {
    state: Mutex<State>,
    events: broadcast::Sender<FeedEvent>,
    kill: Mutex<CancellationToken>,
    fetch_gate: Mutex<Option<Arc<Semaphore>>>,
    fail_writes: AtomicBool,
    fail_feed_opens: AtomicBool,
    feeds_opened: AtomicUsize,
    live_feeds: Arc<AtomicUsize>,
    roster_fetches: AtomicUsize,
    lead_updates: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            state: Mutex::new(State::default()),
            events,
            kill: Mutex::new(CancellationToken::new()),
            fetch_gate: Mutex::new(None),
            fail_writes: AtomicBool::new(false),
            fail_feed_opens: AtomicBool::new(false),
            feeds_opened: AtomicUsize::new(0),
            live_feeds: Arc::new(AtomicUsize::new(0)),
            roster_fetches: AtomicUsize::new(0),
            lead_updates: AtomicUsize::new(0),
        }
    }

    /// Insert a lead directly and announce it on the feed.
    pub(crate) fn seed_lead(&self, email: &str) -> LeadUid {
        let new = NewLead::from_email(email).unwrap();
        let lead = self.store_lead(&new);
        lead.uid
    }

    fn store_lead(&self, new: &NewLead) -> Lead {
        let lead = Lead {
            uid: new.uid.clone(),
            name: new.name.clone(),
            email: new.email.clone(),
            created_at: new.created_at,
            tags: Default::default(),
            notes: String::new(),
        };
        self.state.lock().unwrap().leads.push(lead.clone());
        let _ = self.events.send(FeedEvent::LeadChanged {
            uid: lead.uid.clone(),
            change: LeadChange::Created,
        });
        lead
    }

    pub(crate) fn make_message(&self, uid: &LeadUid, id: i64, text: &str) -> Message {
        NewMessage::new(uid.clone(), uid.as_str(), SenderType::Client, text).with_id(MessageId(id))
    }

    /// Broadcast a message event without storing it.
    pub(crate) fn push_message(&self, message: Message) {
        let _ = self.events.send(FeedEvent::MessageInserted { message });
    }

    /// Block `list_messages`/`list_leads` until [`release_fetches`](Self::release_fetches).
    pub(crate) fn hold_fetches(&self) {
        *self.fetch_gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub(crate) fn release_fetches(&self) {
        if let Some(gate) = self.fetch_gate.lock().unwrap().take() {
            gate.close();
        }
    }

    /// End every open feed stream.
    pub(crate) fn disconnect_feeds(&self) {
        let mut kill = self.kill.lock().unwrap();
        kill.cancel();
        *kill = CancellationToken::new();
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_feed_opens(&self, fail: bool) {
        self.fail_feed_opens.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn feeds_opened(&self) -> usize {
        self.feeds_opened.load(Ordering::SeqCst)
    }

    pub(crate) fn live_feeds(&self) -> usize {
        self.live_feeds.load(Ordering::SeqCst)
    }

    pub(crate) fn roster_fetches(&self) -> usize {
        self.roster_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn lead_updates(&self) -> usize {
        self.lead_updates.load(Ordering::SeqCst)
    }

    pub(crate) fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub(crate) async fn wait_for_feeds(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.feeds_opened() < n {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("feed was never opened");
    }

    async fn pass_gate(&self) {
        let gate = self.fetch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _ = gate.acquire().await;
        }
    }
}

impl LeadRepository for MemoryStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, RepositoryError> {
        self.roster_fetches.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        let mut leads: Vec<Lead> = self.state.lock().unwrap().leads.iter().rev().cloned().collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn get_lead(&self, uid: &LeadUid) -> Result<Option<Lead>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.leads.iter().find(|l| &l.uid == uid).cloned())
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        if self.get_lead(&lead.uid).await?.is_some() {
            return Err(RepositoryError::Conflict(lead.uid.to_string()));
        }
        Ok(self.store_lead(lead))
    }

    async fn update_lead(&self, uid: &LeadUid, patch: &LeadPatch) -> Result<Lead, RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        let updated = {
            let mut state = self.state.lock().unwrap();
            let lead = state
                .leads
                .iter_mut()
                .find(|l| &l.uid == uid)
                .ok_or(RepositoryError::NotFound)?;
            patch.apply(lead);
            lead.clone()
        };
        self.lead_updates.fetch_add(1, Ordering::SeqCst);
        let _ = self.events.send(FeedEvent::LeadChanged {
            uid: uid.clone(),
            change: LeadChange::Updated,
        });
        Ok(updated)
    }
}

impl MessageRepository for MemoryStore {
    async fn list_messages(&self, session_id: &LeadUid) -> Result<Vec<Message>, RepositoryError> {
        self.pass_gate().await;
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .iter()
            .filter(|m| &m.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("insert rejected".to_string()));
        }
        let stored = {
            let mut state = self.state.lock().unwrap();
            if !state.leads.iter().any(|l| l.uid == message.session_id) {
                return Err(RepositoryError::NotFound);
            }
            state.next_id += 1;
            let mut stored = message.clone().with_id(MessageId(state.next_id));
            stored.timestamp = Utc::now();
            state.messages.push(stored.clone());
            stored
        };
        let _ = self.events.send(FeedEvent::MessageInserted {
            message: stored.clone(),
        });
        Ok(stored)
    }
}

impl FeedSource for MemoryStore {
    async fn open_feed(&self, target: &SubscriptionTarget) -> Result<Feed, RepositoryError> {
        if self.fail_feed_opens.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        let mut rx = self.events.subscribe();
        let kill = self.kill.lock().unwrap().clone();
        let target = target.clone();
        self.live_feeds.fetch_add(1, Ordering::SeqCst);
        let guard = FeedGuard(Arc::clone(&self.live_feeds));
        self.feeds_opened.fetch_add(1, Ordering::SeqCst);

        let stream = async_stream::stream! {
            let _guard = guard;
            loop {
                let next = tokio::select! {
                    _ = kill.cancelled() => None,
                    event = rx.recv() => event.ok(),
                };
                match next {
                    Some(event) if event.matches(&target) => yield event,
                    Some(_) => continue,
                    None => break,
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
