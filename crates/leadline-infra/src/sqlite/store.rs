//! SQLite event store: persistence plus push notifications.
//!
//! Implements `LeadRepository`, `MessageRepository` and `FeedSource` from
//! `leadline-core` on one type, so a committed write and its feed event
//! always come from the same place.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use leadline_types::error::RepositoryError;

use super::hub::FeedHub;
use super::pool::DatabasePool;

/// SQLite-backed event store shared by the engine, CLI and HTTP server.
#[derive(Clone)]
pub struct SqliteEventStore {
    pub(super) pool: DatabasePool,
    pub(super) hub: Arc<FeedHub>,
}

impl SqliteEventStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            hub: Arc::new(FeedHub::new()),
        }
    }

    /// Open (and migrate) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        Ok(Self::new(DatabasePool::open(database_url).await?))
    }

    /// Open (and migrate) `{data_dir}/leadline.db`.
    pub async fn open_in(data_dir: &std::path::Path) -> Result<Self, sqlx::Error> {
        Ok(Self::new(DatabasePool::open_in(data_dir).await?))
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    pub fn hub(&self) -> &FeedHub {
        &self.hub
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by the repository impls
// ---------------------------------------------------------------------------

pub(super) fn query_error(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(err.to_string())
}

pub(super) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically.
pub(super) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
