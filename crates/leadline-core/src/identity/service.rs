//! Resume and register visitors.

use leadline_types::error::{RepositoryError, SyncError};
use leadline_types::lead::{Lead, NewLead};
use leadline_types::message::SenderType;
use tracing::{info, warn};

use super::visitor::{VisitorState, VisitorStore};
use crate::repository::{FeedSource, LeadRepository, MessageRepository};
use crate::sync::SyncEngine;

/// Sender id of automated messages.
pub const SYSTEM_SENDER: &str = "system";

fn welcome_text(email: &str) -> String {
    format!(
        "Welcome aboard. Your details are verified for {email}, and you are now \
connected to our team. Send a message any time."
    )
}

/// Binds the local visitor to a lead.
pub struct IdentityService<S, V> {
    engine: SyncEngine<S>,
    visitors: V,
}

impl<S, V> IdentityService<S, V>
where
    S: LeadRepository + MessageRepository + FeedSource + 'static,
    V: VisitorStore,
{
    pub fn new(engine: SyncEngine<S>, visitors: V) -> Self {
        Self { engine, visitors }
    }

    /// Re-bind a returning visitor.
    ///
    /// Stored state pointing at a lead that no longer exists is cleared and
    /// treated as a new visitor.
    pub async fn resume(&self) -> Result<Option<Lead>, RepositoryError> {
        let Some(state) = self.visitors.load().await? else {
            return Ok(None);
        };
        match self.engine.store().get_lead(&state.uid).await? {
            Some(lead) => {
                info!(uid = %lead.uid, "resumed visitor");
                Ok(Some(lead))
            }
            None => {
                warn!(uid = %state.uid, "stored visitor has no lead, clearing");
                self.visitors.clear().await?;
                Ok(None)
            }
        }
    }

    /// Register a new visitor.
    ///
    /// Local state is saved only after the lead insert succeeds. The welcome
    /// message is best-effort.
    pub async fn register(&self, email: &str) -> Result<Lead, SyncError> {
        let new = NewLead::from_email(email).map_err(SyncError::InvalidInput)?;
        let lead = self
            .engine
            .store()
            .insert_lead(&new)
            .await
            .map_err(SyncError::write_failed)?;

        let state = VisitorState {
            uid: lead.uid.clone(),
            email: lead.email.clone(),
        };
        if let Err(e) = self.visitors.save(&state).await {
            warn!(uid = %lead.uid, error = %e, "failed to persist visitor state");
        }
        info!(uid = %lead.uid, "registered visitor");

        if let Err(e) = self
            .engine
            .append_as(
                &lead.uid,
                SenderType::Operator,
                Some(SYSTEM_SENDER),
                &welcome_text(&lead.email),
            )
            .await
        {
            warn!(uid = %lead.uid, error = %e, "failed to send welcome message");
        }
        Ok(lead)
    }

    /// Resume, or register with `email` when there is nothing to resume.
    ///
    /// `email` is asked for lazily so interactive callers only prompt when needed.
    pub async fn resume_or_register<F>(&self, email: F) -> Result<Lead, SyncError>
    where
        F: FnOnce() -> Result<String, SyncError>,
    {
        match self.resume().await {
            Ok(Some(lead)) => return Ok(lead),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not resume visitor, registering"),
        }
        let email = email()?;
        self.register(&email).await
    }

    /// Forget the local visitor.
    pub async fn forget(&self) -> Result<(), RepositoryError> {
        self.visitors.clear().await
    }

    pub fn engine(&self) -> &SyncEngine<S> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use leadline_types::config::ReconnectConfig;
    use leadline_types::lead::LeadUid;

    use super::*;
    use crate::testing::MemoryStore;

    #[derive(Clone, Default)]
    struct MemoryVisitors {
        state: Arc<Mutex<Option<VisitorState>>>,
    }

    impl MemoryVisitors {
        fn get(&self) -> Option<VisitorState> {
            self.state.lock().unwrap().clone()
        }
    }

    impl VisitorStore for MemoryVisitors {
        async fn load(&self) -> Result<Option<VisitorState>, RepositoryError> {
            Ok(self.get())
        }

        async fn save(&self, state: &VisitorState) -> Result<(), RepositoryError> {
            *self.state.lock().unwrap() = Some(state.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<(), RepositoryError> {
            *self.state.lock().unwrap() = None;
            Ok(())
        }
    }

    fn service(store: &Arc<MemoryStore>) -> (IdentityService<MemoryStore, MemoryVisitors>, MemoryVisitors) {
        let visitors = MemoryVisitors::default();
        let engine = SyncEngine::new(Arc::clone(store), ReconnectConfig::default());
        (IdentityService::new(engine, visitors.clone()), visitors)
    }

    #[tokio::test]
    async fn register_persists_state_and_sends_welcome() {
        let store = Arc::new(MemoryStore::new());
        let (identity, visitors) = service(&store);

        let lead = identity.register(" new@visitor.io ").await.unwrap();
        assert_eq!(lead.name, "new");
        assert_eq!(visitors.get().unwrap().uid, lead.uid);
        assert_eq!(store.message_count(), 1);

        let resumed = identity.resume().await.unwrap().unwrap();
        assert_eq!(resumed.uid, lead.uid);
    }

    #[tokio::test]
    async fn failed_registration_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let (identity, visitors) = service(&store);

        store.fail_writes(true);
        let err = identity.register("x@y.z").await.unwrap_err();
        assert!(matches!(err, SyncError::WriteFailed(_)));
        assert!(visitors.get().is_none());

        let err = identity.register("not-an-email").await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidInput(_)));
        assert!(visitors.get().is_none());
    }

    #[tokio::test]
    async fn stale_state_is_cleared_on_resume() {
        let store = Arc::new(MemoryStore::new());
        let (identity, visitors) = service(&store);
        visitors
            .save(&VisitorState {
                uid: LeadUid::from("lead_gone"),
                email: "gone@example.com".to_string(),
            })
            .await
            .unwrap();

        assert!(identity.resume().await.unwrap().is_none());
        assert!(visitors.get().is_none());
    }

    #[tokio::test]
    async fn resume_or_register_prompts_only_when_needed() {
        let store = Arc::new(MemoryStore::new());
        let (identity, _visitors) = service(&store);

        let first = identity
            .resume_or_register(|| Ok("first@example.com".to_string()))
            .await
            .unwrap();
        let again = identity
            .resume_or_register(|| panic!("should not prompt"))
            .await
            .unwrap();
        assert_eq!(first.uid, again.uid);
    }
}
