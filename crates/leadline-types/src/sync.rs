//! Subscription targets, push-feed events and live view snapshots.
//!
//! These are the data shapes exchanged between the event-stream collaborator,
//! the sync engine, and anything observing a subscription (consoles, WebSocket
//! clients, the suggestion watcher).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::lead::{Lead, LeadUid};
use crate::message::Message;

/// What a subscription follows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubscriptionTarget {
    /// One lead's message timeline.
    Session { session_id: LeadUid },
    /// The global lead roster.
    Roster,
}

impl SubscriptionTarget {
    pub fn session(session_id: impl Into<LeadUid>) -> Self {
        SubscriptionTarget::Session {
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> Option<&LeadUid> {
        match self {
            SubscriptionTarget::Session { session_id } => Some(session_id),
            SubscriptionTarget::Roster => None,
        }
    }
}

impl fmt::Display for SubscriptionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionTarget::Session { session_id } => write!(f, "session:{session_id}"),
            SubscriptionTarget::Roster => write!(f, "roster"),
        }
    }
}

/// Kind of change carried by a lead notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadChange {
    Created,
    Updated,
    Deleted,
}

/// A server-originated notification that a row was written.
///
/// Delivery is at-least-once; consumers must deduplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    MessageInserted { message: Message },
    LeadChanged { uid: LeadUid, change: LeadChange },
}

impl FeedEvent {
    /// Whether this event is relevant to a subscription target.
    pub fn matches(&self, target: &SubscriptionTarget) -> bool {
        match (self, target) {
            (
                FeedEvent::MessageInserted { message },
                SubscriptionTarget::Session { session_id },
            ) => &message.session_id == session_id,
            (FeedEvent::LeadChanged { .. }, SubscriptionTarget::Roster) => true,
            _ => false,
        }
    }
}

/// Lifecycle of a subscription handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeedStatus {
    /// Opening the feed and running the initial fetch.
    Connecting,
    /// Initial fetch merged; applying push events.
    Live,
    /// The feed dropped; waiting to re-subscribe and backfill.
    Reconnecting { attempt: u32 },
    /// The session has no lead. The view stays empty.
    Unbound,
    /// Reconnect attempts exhausted.
    Lost { attempts: u32 },
    /// The handle was cancelled.
    Cancelled,
}

impl FeedStatus {
    /// Terminal states never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FeedStatus::Unbound | FeedStatus::Lost { .. } | FeedStatus::Cancelled
        )
    }

    /// The error a terminal status corresponds to, if any.
    pub fn as_error(&self, target: &SubscriptionTarget) -> Option<SyncError> {
        match self {
            FeedStatus::Lost { attempts } => Some(SyncError::SubscriptionLost {
                attempts: *attempts,
            }),
            FeedStatus::Unbound => target
                .session_id()
                .map(|uid| SyncError::IdentityUnbound(uid.clone())),
            _ => None,
        }
    }
}

/// The data behind a live view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ViewData {
    Session(Vec<Message>),
    Roster(Vec<Lead>),
}

/// Point-in-time copy of a subscription's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub target: SubscriptionTarget,
    pub status: FeedStatus,
    /// Bumped whenever the view content changes.
    pub revision: u64,
    pub data: ViewData,
}

impl SyncSnapshot {
    /// An empty snapshot in the `Connecting` state.
    pub fn empty(target: SubscriptionTarget) -> Self {
        let data = match target {
            SubscriptionTarget::Session { .. } => ViewData::Session(Vec::new()),
            SubscriptionTarget::Roster => ViewData::Roster(Vec::new()),
        };
        Self {
            target,
            status: FeedStatus::Connecting,
            revision: 0,
            data,
        }
    }

    /// Session messages ordered by id (empty for roster views).
    pub fn messages(&self) -> &[Message] {
        match &self.data {
            ViewData::Session(messages) => messages,
            ViewData::Roster(_) => &[],
        }
    }

    /// Roster leads (empty for session views).
    pub fn leads(&self) -> &[Lead] {
        match &self.data {
            ViewData::Roster(leads) => leads,
            ViewData::Session(_) => &[],
        }
    }

    /// The newest message in a session view.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages().last()
    }
}
