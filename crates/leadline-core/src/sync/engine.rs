//! Sync engine: subscriptions plus the write paths feeding them.

use std::sync::Arc;

use leadline_types::config::ReconnectConfig;
use leadline_types::error::{RepositoryError, SyncError};
use leadline_types::lead::{Lead, LeadPatch, LeadUid};
use leadline_types::message::{Message, NewMessage, SenderType};
use leadline_types::sync::{SubscriptionTarget, SyncSnapshot};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::handle::SubscriptionHandle;
use super::subscription::Subscription;
use crate::repository::{FeedSource, LeadRepository, MessageRepository};

/// Sender id recorded for operator messages when no name is given.
pub const DEFAULT_OPERATOR_SENDER: &str = "operator";

/// Entry point for live views and writes.
///
/// Generic over the store so the engine never names a storage technology.
/// Writes are never applied optimistically: the canonical row comes back
/// through the push feed and the same dedup gate as everything else.
pub struct SyncEngine<S> {
    store: Arc<S>,
    reconnect: ReconnectConfig,
}

impl<S> Clone for SyncEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            reconnect: self.reconnect.clone(),
        }
    }
}

impl<S> SyncEngine<S>
where
    S: LeadRepository + MessageRepository + FeedSource + 'static,
{
    pub fn new(store: Arc<S>, reconnect: ReconnectConfig) -> Self {
        Self { store, reconnect }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Establish a live feed for `target`.
    ///
    /// Must be called inside a tokio runtime: the feed runs as its own task,
    /// which exits when the handle is cancelled or dropped.
    pub fn subscribe(&self, target: SubscriptionTarget) -> SubscriptionHandle {
        let (tx, rx) = watch::channel(SyncSnapshot::empty(target.clone()));
        let token = CancellationToken::new();
        let subscription = Subscription::new(
            Arc::clone(&self.store),
            target.clone(),
            self.reconnect.clone(),
            token.clone(),
            tx,
        );
        tokio::spawn(subscription.run());
        SubscriptionHandle::new(target, rx, token)
    }

    /// Write a message with the default sender id for its side.
    pub async fn append(
        &self,
        session_id: &LeadUid,
        sender_type: SenderType,
        text: &str,
    ) -> Result<Message, SyncError> {
        self.append_as(session_id, sender_type, None, text).await
    }

    /// Write a message on behalf of a named sender.
    ///
    /// Client messages always carry the lead uid as sender id. Operator
    /// messages use `sender_name`, falling back to `operator`.
    pub async fn append_as(
        &self,
        session_id: &LeadUid,
        sender_type: SenderType,
        sender_name: Option<&str>,
        text: &str,
    ) -> Result<Message, SyncError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SyncError::InvalidInput("message text is empty".to_string()));
        }

        self.require_lead(session_id).await?;

        let sender_id = match sender_type {
            SenderType::Client => session_id.to_string(),
            SenderType::Operator => sender_name
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_OPERATOR_SENDER)
                .to_string(),
        };
        let new = NewMessage::new(session_id.clone(), sender_id, sender_type, text);

        match self.store.insert_message(&new).await {
            Ok(message) => {
                debug!(session_id = %session_id, id = %message.id, %sender_type, "message appended");
                Ok(message)
            }
            Err(RepositoryError::NotFound) => Err(SyncError::IdentityUnbound(session_id.clone())),
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "message write failed");
                Err(SyncError::write_failed(e))
            }
        }
    }

    /// Operator edit of a lead profile (last writer wins).
    pub async fn update_lead(&self, uid: &LeadUid, patch: &LeadPatch) -> Result<Lead, SyncError> {
        if patch.is_empty() {
            return self.require_lead(uid).await;
        }
        match self.store.update_lead(uid, patch).await {
            Ok(lead) => {
                debug!(%uid, "lead profile updated");
                Ok(lead)
            }
            Err(RepositoryError::NotFound) => Err(SyncError::IdentityUnbound(uid.clone())),
            Err(e) => {
                warn!(%uid, error = %e, "lead update failed");
                Err(SyncError::write_failed(e))
            }
        }
    }

    /// Add a tag to a lead. A duplicate or blank tag writes nothing.
    pub async fn add_tag(&self, uid: &LeadUid, tag: &str) -> Result<Lead, SyncError> {
        let mut lead = self.require_lead(uid).await?;
        if !lead.add_tag(tag) {
            return Ok(lead);
        }
        self.update_lead(uid, &LeadPatch { tags: Some(lead.tags), notes: None })
            .await
    }

    /// Remove a tag from a lead. Removing an absent tag writes nothing.
    pub async fn remove_tag(&self, uid: &LeadUid, tag: &str) -> Result<Lead, SyncError> {
        let mut lead = self.require_lead(uid).await?;
        if !lead.remove_tag(tag) {
            return Ok(lead);
        }
        self.update_lead(uid, &LeadPatch { tags: Some(lead.tags), notes: None })
            .await
    }

    /// Replace a lead's notes.
    pub async fn set_notes(&self, uid: &LeadUid, notes: &str) -> Result<Lead, SyncError> {
        self.update_lead(
            uid,
            &LeadPatch {
                tags: None,
                notes: Some(notes.to_string()),
            },
        )
        .await
    }

    async fn require_lead(&self, uid: &LeadUid) -> Result<Lead, SyncError> {
        match self.store.get_lead(uid).await {
            Ok(Some(lead)) => Ok(lead),
            Ok(None) => Err(SyncError::IdentityUnbound(uid.clone())),
            Err(e) => Err(SyncError::write_failed(e)),
        }
    }
}
