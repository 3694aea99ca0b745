//! Suggestion service: trigger rule, collaborator call, fallbacks.

use std::time::Duration;

use leadline_types::config::SuggestionConfig;
use leadline_types::error::SuggestionError;
use leadline_types::message::{Message, MessageId};
use leadline_types::suggestion::{SuggestionSet, SuggestionSource};
use tracing::{debug, warn};

use super::generator::TextGenerator;
use super::prompt::{build_prompt, parse_suggestions};

/// Requests reply suggestions for session timelines.
///
/// A service built without a generator (no credentials) never calls out and
/// always answers with the missing-credentials fallback.
pub struct SuggestionService<G> {
    generator: Option<G>,
    config: SuggestionConfig,
}

impl<G: TextGenerator> SuggestionService<G> {
    pub fn new(generator: Option<G>, config: SuggestionConfig) -> Self {
        Self { generator, config }
    }

    pub fn has_credentials(&self) -> bool {
        self.generator.is_some()
    }

    /// The client message suggestions should answer, if any.
    ///
    /// Only fires when the newest message comes from the client.
    pub fn trigger(messages: &[Message]) -> Option<MessageId> {
        messages
            .last()
            .filter(|m| m.is_from_client())
            .map(|m| m.id)
    }

    /// Suggestions for the current timeline, or `None` when the trigger
    /// does not fire. Never fails.
    pub async fn suggest(&self, messages: &[Message]) -> Option<SuggestionSet> {
        let for_message = Self::trigger(messages)?;
        Some(self.request(for_message, messages).await)
    }

    #[tracing::instrument(skip_all, fields(for_message = %for_message))]
    async fn request(&self, for_message: MessageId, messages: &[Message]) -> SuggestionSet {
        let Some(generator) = &self.generator else {
            debug!("no text generation credentials, using fallback");
            return SuggestionSet::fallback(for_message, SuggestionSource::FallbackNoCredentials);
        };

        match self.generate(generator, messages).await {
            Ok(suggestions) => {
                debug!(provider = generator.name(), count = suggestions.len(), "suggestions generated");
                SuggestionSet {
                    for_message,
                    source: SuggestionSource::Generated,
                    suggestions,
                }
            }
            Err(e) => {
                warn!(provider = generator.name(), error = %e, "suggestion request failed, using fallback");
                SuggestionSet::fallback(for_message, SuggestionSource::FallbackFailure)
            }
        }
    }

    async fn generate(&self, generator: &G, messages: &[Message]) -> Result<Vec<String>, SuggestionError> {
        let prompt = build_prompt(messages, self.config.context_window, self.config.suggestion_limit());
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let raw = tokio::time::timeout(timeout, generator.generate(&prompt))
            .await
            .map_err(|_| SuggestionError::Timeout(self.config.timeout_ms))??;
        parse_suggestions(&raw, self.config.suggestion_limit())
    }
}
