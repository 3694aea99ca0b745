//! Reply-suggestion adapter.
//!
//! Suggestions are assistive only. Every failure of the text-generation
//! collaborator degrades to a fixed local list and never reaches the chat.

pub mod generator;
pub mod prompt;
pub mod service;
pub mod watcher;

pub use generator::{PromptContext, TextGenerator};
pub use service::SuggestionService;
pub use watcher::SuggestionWatcher;

use leadline_types::error::SyncError;
use leadline_types::lead::LeadUid;
use leadline_types::message::{Message, SenderType};
use leadline_types::suggestion::SuggestionSet;

use crate::repository::{FeedSource, LeadRepository, MessageRepository};
use crate::sync::SyncEngine;

/// Send the `n`th (1-based) suggestion as an operator message.
///
/// Goes through [`SyncEngine::append_as`], the same path as typed replies.
pub async fn send_suggestion<S>(
    engine: &SyncEngine<S>,
    session_id: &LeadUid,
    set: &SuggestionSet,
    n: usize,
    operator: Option<&str>,
) -> Result<Message, SyncError>
where
    S: LeadRepository + MessageRepository + FeedSource + 'static,
{
    let text = set.pick(n).ok_or_else(|| {
        SyncError::InvalidInput(format!(
            "no suggestion #{n} (have {})",
            set.suggestions.len()
        ))
    })?;
    engine
        .append_as(session_id, SenderType::Operator, operator, text)
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use leadline_types::config::ReconnectConfig;
    use leadline_types::message::MessageId;
    use leadline_types::suggestion::SuggestionSource;

    use super::*;
    use crate::testing::MemoryStore;

    #[tokio::test]
    async fn picked_suggestion_is_appended_as_operator_message() {
        let store = Arc::new(MemoryStore::new());
        let uid = store.seed_lead("pick@example.com");
        let engine = SyncEngine::new(Arc::clone(&store), ReconnectConfig::default());
        let set = SuggestionSet::fallback(MessageId(1), SuggestionSource::FallbackFailure);

        let sent = send_suggestion(&engine, &uid, &set, 2, Some("kim")).await.unwrap();
        assert_eq!(sent.text, "How else can I assist?");
        assert_eq!(sent.sender_type, SenderType::Operator);
        assert_eq!(sent.sender_id, "kim");
        assert_eq!(store.message_count(), 1);

        let err = send_suggestion(&engine, &uid, &set, 9, None).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidInput(_)));
        assert_eq!(store.message_count(), 1);
    }
}
