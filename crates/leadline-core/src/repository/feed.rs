//! Push-feed trait definition.

use std::pin::Pin;

use futures_util::Stream;
use leadline_types::error::RepositoryError;
use leadline_types::sync::{FeedEvent, SubscriptionTarget};

/// A live stream of change notifications.
///
/// The stream ending means the feed disconnected. Dropping it cancels the
/// underlying subscription. Delivery is at-least-once.
pub type Feed = Pin<Box<dyn Stream<Item = FeedEvent> + Send>>;

/// Opens push feeds for subscription targets.
pub trait FeedSource: Send + Sync {
    /// Subscribe to changes relevant to `target`.
    ///
    /// Events written after this call returns are guaranteed to be delivered
    /// (unless the feed disconnects first).
    fn open_feed(
        &self,
        target: &SubscriptionTarget,
    ) -> impl std::future::Future<Output = Result<Feed, RepositoryError>> + Send;
}
