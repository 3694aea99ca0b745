//! Connection pools for the event store.
//!
//! One writer connection appends messages and lead changes; SQLite hands out
//! `AUTOINCREMENT` ids inside that connection's transactions, so ids follow
//! commit order even when several processes share the file. Readers are
//! read-only and serve fetches and the change tail.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

/// File name of the event store inside the data directory.
pub const DATABASE_FILE: &str = "leadline.db";

const READER_CONNECTIONS: u32 = 4;

/// Writers from other processes hold the lock for one short transaction.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

/// Newest ids in the two append-only logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighWater {
    pub message_id: i64,
    pub lead_change: i64,
}

impl DatabasePool {
    /// Open the store at `database_url`, creating and migrating it as needed.
    pub async fn open(database_url: &str) -> Result<Self, sqlx::Error> {
        Self::with_options(SqliteConnectOptions::from_str(database_url)?).await
    }

    /// Open `{data_dir}/leadline.db`.
    pub async fn open_in(data_dir: &Path) -> Result<Self, sqlx::Error> {
        Self::with_options(SqliteConnectOptions::new().filename(data_dir.join(DATABASE_FILE))).await
    }

    async fn with_options(options: SqliteConnectOptions) -> Result<Self, sqlx::Error> {
        let options = options
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT)
            .create_if_missing(true);

        // WAL keeps committed appends durable across crashes at NORMAL.
        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone().synchronous(SqliteSynchronous::Normal))
            .await?;
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }

    /// Current end of the message log and the lead change log.
    pub async fn high_water(&self) -> Result<HighWater, sqlx::Error> {
        let (message_id, lead_change): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COALESCE(MAX(id), 0) FROM messages), \
                    (SELECT COALESCE(MAX(seq), 0) FROM lead_changes)",
        )
        .fetch_one(&self.reader)
        .await?;
        Ok(HighWater {
            message_id,
            lead_change,
        })
    }
}
