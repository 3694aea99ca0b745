//! `FeedSource` for the SQLite event store.

use leadline_core::repository::{Feed, FeedSource};
use leadline_types::error::RepositoryError;
use leadline_types::sync::SubscriptionTarget;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use super::store::SqliteEventStore;

impl FeedSource for SqliteEventStore {
    async fn open_feed(&self, target: &SubscriptionTarget) -> Result<Feed, RepositoryError> {
        let mut rx = self.hub.subscribe(target);
        let target = target.clone();
        debug!(%target, "feed opened");

        let stream = async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if event.matches(&target) {
                            yield event;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Missed events are recovered by the reconnect backfill.
                        warn!(%target, skipped, "feed lagged, disconnecting");
                        break;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
