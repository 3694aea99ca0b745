//! Cross-process change tail.
//!
//! The [`FeedHub`](super::FeedHub) only sees writes made through this
//! process. When a console and the server share one database file, each
//! process tails the message log and the lead change log for ids past its
//! high-water marks and republishes them locally. Both ids are assigned
//! inside the writing transaction, so a row that commits late still lands
//! above the mark. Rows written by this process are published
//! a second time; subscribers already dedup by message id.

use std::time::Duration;

use leadline_types::error::RepositoryError;
use leadline_types::lead::LeadUid;
use leadline_types::sync::LeadChange;
use sqlx::Row;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::lead::change_name;
use super::message::{MESSAGE_COLUMNS, message_from_row};
use super::pool::HighWater;
use super::store::{SqliteEventStore, query_error};

pub const DEFAULT_TAIL_INTERVAL: Duration = Duration::from_millis(500);

pub struct ChangeTail {
    store: SqliteEventStore,
    mark: HighWater,
}

impl ChangeTail {
    /// Start tailing from the current end of both logs.
    pub async fn start(store: SqliteEventStore) -> Result<Self, RepositoryError> {
        let mark = store.pool.high_water().await.map_err(query_error)?;
        Ok(Self { store, mark })
    }

    /// Publish rows written since the last poll. Returns how many were found.
    pub async fn poll(&mut self) -> Result<usize, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id > ? ORDER BY id ASC"
        ))
        .bind(self.mark.message_id)
        .fetch_all(&self.store.pool.reader)
        .await
        .map_err(query_error)?;

        let mut found = rows.len();
        for row in &rows {
            let message = message_from_row(row)?;
            self.mark.message_id = self.mark.message_id.max(message.id.0);
            self.store.hub.publish_message(&message);
        }

        let rows = sqlx::query("SELECT seq, uid, change FROM lead_changes WHERE seq > ? ORDER BY seq ASC")
            .bind(self.mark.lead_change)
            .fetch_all(&self.store.pool.reader)
            .await
            .map_err(query_error)?;

        found += rows.len();
        for row in &rows {
            let seq: i64 = row.try_get("seq").map_err(query_error)?;
            let uid: String = row.try_get("uid").map_err(query_error)?;
            let change: String = row.try_get("change").map_err(query_error)?;
            let change = if change == change_name(LeadChange::Created) {
                LeadChange::Created
            } else {
                LeadChange::Updated
            };
            self.store.hub.publish_lead(&LeadUid(uid), change);
            self.mark.lead_change = self.mark.lead_change.max(seq);
        }

        if found > 0 {
            debug!(found, "tail republished external writes");
        }
        Ok(found)
    }

    /// Poll every `interval` until `token` is cancelled. Poll errors are
    /// logged and retried on the next tick.
    pub async fn run(mut self, interval: Duration, token: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.poll().await {
                        warn!(error = %e, "change tail poll failed");
                    }
                }
            }
        }
        debug!("change tail stopped");
    }
}

impl SqliteEventStore {
    /// Spawn a [`ChangeTail`] for this store. It stops when `token` is cancelled.
    pub async fn spawn_tail(
        &self,
        interval: Duration,
        token: CancellationToken,
    ) -> Result<JoinHandle<()>, RepositoryError> {
        let tail = ChangeTail::start(self.clone()).await?;
        Ok(tokio::spawn(tail.run(interval, token)))
    }
}
