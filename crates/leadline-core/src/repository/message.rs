//! Message repository trait definition.
//!
//! Messages are append-only: there is no update or delete.

use leadline_types::error::RepositoryError;
use leadline_types::lead::LeadUid;
use leadline_types::message::{Message, NewMessage};

/// Repository trait for session messages.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MessageRepository: Send + Sync {
    /// All messages of a session, ordered by id ASC.
    fn list_messages(
        &self,
        session_id: &LeadUid,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Insert a message and return it with its server-assigned id.
    ///
    /// Fails with `NotFound` when the session has no lead.
    fn insert_message(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<Message, RepositoryError>> + Send;
}
