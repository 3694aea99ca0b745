use thiserror::Error;

use crate::lead::LeadUid;

/// Errors from repository operations (used by trait definitions in leadline-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the sync engine.
///
/// Only `WriteFailed` and `InvalidInput` are meant for user-visible reporting.
/// `SubscriptionLost` appears once reconnect attempts are exhausted, and
/// `IdentityUnbound` is handled as an empty view.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("subscription lost after {attempts} reconnect attempts")]
    SubscriptionLost { attempts: u32 },

    #[error("no lead bound to session '{0}'")]
    IdentityUnbound(LeadUid),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    /// Map a store failure on a write path.
    pub fn write_failed(err: RepositoryError) -> Self {
        SyncError::WriteFailed(err.to_string())
    }
}

/// Why the text-generation collaborator could not produce suggestions.
///
/// Never shown to users: the suggestion adapter substitutes a fallback list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("text generation credentials are not configured")]
    MissingCredentials,

    #[error("suggestion request timed out after {0}ms")]
    Timeout(u64),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("invalid suggestion response: {0}")]
    InvalidResponse(String),
}

/// Errors from the embed-bridge loader.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmbedError {
    #[error("widget loader already installed on this page")]
    AlreadyInstalled,

    #[error("invalid loader script url '{url}': {reason}")]
    InvalidScriptUrl { url: String, reason: String },
}
