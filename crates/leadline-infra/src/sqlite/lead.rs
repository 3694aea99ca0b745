//! `LeadRepository` for the SQLite event store.

use std::collections::BTreeSet;

use leadline_core::repository::LeadRepository;
use leadline_types::error::RepositoryError;
use leadline_types::lead::{Lead, LeadPatch, LeadUid, NewLead};
use leadline_types::sync::LeadChange;
use sqlx::Row;
use tracing::debug;

use super::store::{SqliteEventStore, format_datetime, parse_datetime, query_error};

const LEAD_COLUMNS: &str = "uid, name, email, created_at, tags, notes";

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct LeadRow {
    uid: String,
    name: String,
    email: String,
    created_at: String,
    tags: String,
    notes: String,
}

impl LeadRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            uid: row.try_get("uid")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            tags: row.try_get("tags")?,
            notes: row.try_get("notes")?,
        })
    }

    fn into_lead(self) -> Result<Lead, RepositoryError> {
        let tags: BTreeSet<String> = serde_json::from_str(&self.tags)
            .map_err(|e| RepositoryError::Query(format!("invalid tags JSON: {e}")))?;
        Ok(Lead {
            uid: LeadUid(self.uid),
            name: self.name,
            email: self.email,
            created_at: parse_datetime(&self.created_at)?,
            tags,
            notes: self.notes,
        })
    }
}

fn encode_tags(tags: &BTreeSet<String>) -> Result<String, RepositoryError> {
    serde_json::to_string(tags).map_err(|e| RepositoryError::Query(format!("encode tags: {e}")))
}

/// Name stored in `lead_changes.change`.
pub(super) fn change_name(change: LeadChange) -> &'static str {
    match change {
        LeadChange::Created => "created",
        LeadChange::Updated => "updated",
        LeadChange::Deleted => "deleted",
    }
}

/// Append to the change log inside the caller's write transaction.
async fn record_change(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    uid: &LeadUid,
    change: LeadChange,
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT INTO lead_changes (uid, change) VALUES (?, ?)")
        .bind(uid.as_str())
        .bind(change_name(change))
        .execute(&mut **tx)
        .await
        .map_err(query_error)?;
    Ok(())
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Lead>, RepositoryError> {
    rows.iter()
        .map(|row| LeadRow::from_row(row).map_err(query_error)?.into_lead())
        .collect()
}

impl LeadRepository for SqliteEventStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;
        map_rows(&rows)
    }

    async fn get_lead(&self, uid: &LeadUid) -> Result<Option<Lead>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE uid = ?"))
            .bind(uid.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;
        row.map(|r| LeadRow::from_row(&r).map_err(query_error)?.into_lead())
            .transpose()
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query(
            "INSERT INTO leads (uid, name, email, created_at, tags, notes) \
             VALUES (?, ?, ?, ?, '[]', '')",
        )
        .bind(lead.uid.as_str())
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(format_datetime(&lead.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("lead '{}' already exists", lead.uid))
            }
            _ => query_error(e),
        })?;
        record_change(&mut tx, &lead.uid, LeadChange::Created).await?;

        tx.commit().await.map_err(query_error)?;

        debug!(uid = %lead.uid, "lead inserted");
        self.hub.publish_lead(&lead.uid, LeadChange::Created);

        Ok(Lead {
            uid: lead.uid.clone(),
            name: lead.name.clone(),
            email: lead.email.clone(),
            created_at: lead.created_at,
            tags: BTreeSet::new(),
            notes: String::new(),
        })
    }

    async fn update_lead(&self, uid: &LeadUid, patch: &LeadPatch) -> Result<Lead, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let row = sqlx::query(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE uid = ?"))
            .bind(uid.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?
            .ok_or(RepositoryError::NotFound)?;
        let mut lead = LeadRow::from_row(&row).map_err(query_error)?.into_lead()?;
        patch.apply(&mut lead);

        sqlx::query("UPDATE leads SET tags = ?, notes = ? WHERE uid = ?")
            .bind(encode_tags(&lead.tags)?)
            .bind(&lead.notes)
            .bind(uid.as_str())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        record_change(&mut tx, uid, LeadChange::Updated).await?;

        tx.commit().await.map_err(query_error)?;

        debug!(%uid, "lead updated");
        self.hub.publish_lead(uid, LeadChange::Updated);
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::store::test_support::test_store;
    use leadline_core::repository::FeedSource;
    use leadline_types::sync::{FeedEvent, SubscriptionTarget};
    use futures_util::StreamExt;

    #[tokio::test]
    async fn insert_and_get_lead() {
        let (store, _dir) = test_store().await;
        let new = NewLead::from_email("ada@example.com").unwrap();
        store.insert_lead(&new).await.unwrap();

        let lead = store.get_lead(&new.uid).await.unwrap().unwrap();
        assert_eq!(lead.email, "ada@example.com");
        assert_eq!(lead.name, "ada");
        assert!(lead.tags.is_empty());
        assert!(store.get_lead(&LeadUid::from("lead_none")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_uid_is_conflict() {
        let (store, _dir) = test_store().await;
        let new = NewLead::from_email("dup@example.com").unwrap();
        store.insert_lead(&new).await.unwrap();
        let err = store.insert_lead(&new).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (store, _dir) = test_store().await;
        let mut older = NewLead::from_email("older@example.com").unwrap();
        older.created_at -= chrono::Duration::minutes(5);
        let newer = NewLead::from_email("newer@example.com").unwrap();
        store.insert_lead(&older).await.unwrap();
        store.insert_lead(&newer).await.unwrap();

        let leads = store.list_leads().await.unwrap();
        let emails: Vec<&str> = leads.iter().map(|l| l.email.as_str()).collect();
        assert_eq!(emails, vec!["newer@example.com", "older@example.com"]);
    }

    #[tokio::test]
    async fn update_applies_patch_last_writer_wins() {
        let (store, _dir) = test_store().await;
        let new = NewLead::from_email("p@example.com").unwrap();
        store.insert_lead(&new).await.unwrap();

        let tags: BTreeSet<String> = ["vip".to_string(), "warm".to_string()].into();
        store
            .update_lead(&new.uid, &LeadPatch { tags: Some(tags.clone()), notes: Some("first".into()) })
            .await
            .unwrap();
        let lead = store
            .update_lead(&new.uid, &LeadPatch { tags: None, notes: Some("second".into()) })
            .await
            .unwrap();
        assert_eq!(lead.notes, "second");
        assert_eq!(lead.tags, tags);

        let stored = store.get_lead(&new.uid).await.unwrap().unwrap();
        assert_eq!(stored, lead);
    }

    #[tokio::test]
    async fn update_missing_lead_is_not_found() {
        let (store, _dir) = test_store().await;
        let err = store
            .update_lead(&LeadUid::from("lead_missing"), &LeadPatch { tags: None, notes: Some("x".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn lead_writes_append_to_change_log() {
        let (store, _dir) = test_store().await;
        let new = NewLead::from_email("log@example.com").unwrap();
        store.insert_lead(&new).await.unwrap();
        store
            .update_lead(&new.uid, &LeadPatch { tags: None, notes: Some("n".into()) })
            .await
            .unwrap();
        let _ = store.insert_lead(&new).await.unwrap_err();

        let changes: Vec<(i64, String)> =
            sqlx::query_as("SELECT seq, change FROM lead_changes WHERE uid = ? ORDER BY seq")
                .bind(new.uid.as_str())
                .fetch_all(&store.pool.reader)
                .await
                .unwrap();
        assert_eq!(
            changes,
            vec![(1, "created".to_string()), (2, "updated".to_string())]
        );
    }

    #[tokio::test]
    async fn lead_writes_notify_roster_feed() {
        let (store, _dir) = test_store().await;
        let mut feed = store.open_feed(&SubscriptionTarget::Roster).await.unwrap();

        let new = NewLead::from_email("feed@example.com").unwrap();
        store.insert_lead(&new).await.unwrap();
        store
            .update_lead(&new.uid, &LeadPatch { tags: None, notes: Some("n".into()) })
            .await
            .unwrap();

        assert!(matches!(
            feed.next().await,
            Some(FeedEvent::LeadChanged { change: LeadChange::Created, .. })
        ));
        assert!(matches!(
            feed.next().await,
            Some(FeedEvent::LeadChanged { change: LeadChange::Updated, .. })
        ));
    }
}
