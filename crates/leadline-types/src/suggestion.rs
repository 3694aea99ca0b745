//! Reply suggestion types.

use serde::{Deserialize, Serialize};

use crate::message::MessageId;

/// Upper bound on replies in one set.
pub const MAX_SUGGESTIONS: usize = 3;

/// Shown when no text-generation credentials are configured.
pub const MISSING_CREDENTIALS_FALLBACK: [&str; 3] = [
    "How can I help you today?",
    "I'll look into that for you.",
    "One moment please.",
];

/// Shown when the collaborator fails, times out, or returns garbage.
pub const FAILURE_FALLBACK: [&str; 3] = [
    "I'll check on that for you.",
    "How else can I assist?",
    "Thanks for reaching out!",
];

/// Where a suggestion set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Generated,
    FallbackNoCredentials,
    FallbackFailure,
}

/// Up to three short operator replies for one timeline position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    /// The client message these replies answer.
    pub for_message: MessageId,
    pub source: SuggestionSource,
    pub suggestions: Vec<String>,
}

impl SuggestionSet {
    pub fn fallback(for_message: MessageId, source: SuggestionSource) -> Self {
        let list = match source {
            SuggestionSource::FallbackNoCredentials => MISSING_CREDENTIALS_FALLBACK,
            _ => FAILURE_FALLBACK,
        };
        Self {
            for_message,
            source,
            suggestions: list.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source != SuggestionSource::Generated
    }

    /// Suggestion by 1-based index, as picked from a console.
    pub fn pick(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|i| self.suggestions.get(i))
            .map(String::as_str)
    }
}

/// What an observer should display for the current timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SuggestionState {
    /// Newest message is not from the client (or there is none).
    Cleared,
    /// A request for this client message is in flight.
    Pending { for_message: MessageId },
    Ready(SuggestionSet),
}

impl SuggestionState {
    pub fn suggestions(&self) -> &[String] {
        match self {
            SuggestionState::Ready(set) => &set.suggestions,
            _ => &[],
        }
    }
}
