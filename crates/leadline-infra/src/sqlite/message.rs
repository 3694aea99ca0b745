//! `MessageRepository` for the SQLite event store.
//!
//! Ids come from `INTEGER PRIMARY KEY AUTOINCREMENT`, so they only ever grow.

use leadline_core::repository::MessageRepository;
use leadline_types::error::RepositoryError;
use leadline_types::lead::LeadUid;
use leadline_types::message::{Message, MessageId, NewMessage, SenderType};
use sqlx::Row;
use tracing::debug;

use super::store::{SqliteEventStore, format_datetime, parse_datetime, query_error};

struct MessageRow {
    id: i64,
    session_id: String,
    sender_id: String,
    sender_type: String,
    message_text: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            sender_id: row.try_get("sender_id")?,
            sender_type: row.try_get("sender_type")?,
            message_text: row.try_get("message_text")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let sender_type: SenderType = self.sender_type.parse().map_err(RepositoryError::Query)?;
        Ok(Message {
            id: MessageId(self.id),
            session_id: LeadUid(self.session_id),
            sender_id: self.sender_id,
            sender_type,
            text: self.message_text,
            timestamp: parse_datetime(&self.created_at)?,
        })
    }
}

pub(super) const MESSAGE_COLUMNS: &str =
    "id, session_id, sender_id, sender_type, message_text, created_at";

pub(super) fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Message, RepositoryError> {
    MessageRow::from_row(row).map_err(query_error)?.into_message()
}

impl MessageRepository for SqliteEventStore {
    async fn list_messages(&self, session_id: &LeadUid) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ? ORDER BY id ASC"
        ))
        .bind(session_id.as_str())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(message_from_row).collect()
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO messages (session_id, sender_id, sender_type, message_text, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.session_id.as_str())
        .bind(&message.sender_id)
        .bind(message.sender_type.to_string())
        .bind(&message.text)
        .bind(format_datetime(&message.timestamp))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => RepositoryError::NotFound,
            _ => query_error(e),
        })?;

        let stored = message.clone().with_id(MessageId(result.last_insert_rowid()));
        debug!(session_id = %stored.session_id, id = %stored.id, "message inserted");
        self.hub.publish_message(&stored);
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::store::test_support::test_store;
    use leadline_core::repository::LeadRepository;
    use leadline_types::lead::NewLead;

    async fn seed(store: &SqliteEventStore, email: &str) -> LeadUid {
        let new = NewLead::from_email(email).unwrap();
        store.insert_lead(&new).await.unwrap();
        new.uid
    }

    #[tokio::test]
    async fn ids_increase_and_list_is_ordered() {
        let (store, _dir) = test_store().await;
        let a = seed(&store, "a@example.com").await;
        let b = seed(&store, "b@example.com").await;

        let m1 = store
            .insert_message(&NewMessage::new(a.clone(), a.as_str(), SenderType::Client, "one"))
            .await
            .unwrap();
        let other = store
            .insert_message(&NewMessage::new(b.clone(), b.as_str(), SenderType::Client, "other"))
            .await
            .unwrap();
        let m2 = store
            .insert_message(&NewMessage::new(a.clone(), "sam", SenderType::Operator, "two"))
            .await
            .unwrap();
        assert!(m1.id < other.id && other.id < m2.id);

        let listed = store.list_messages(&a).await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(listed[1].sender_type, SenderType::Operator);
        assert_eq!(listed[1].sender_id, "sam");
    }

    #[tokio::test]
    async fn message_for_unknown_lead_is_rejected() {
        let (store, _dir) = test_store().await;
        let ghost = LeadUid::from("lead_ghost");
        let err = store
            .insert_message(&NewMessage::new(ghost.clone(), "x", SenderType::Client, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert!(store.list_messages(&ghost).await.unwrap().is_empty());
    }
}
