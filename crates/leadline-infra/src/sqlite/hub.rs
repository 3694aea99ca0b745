//! In-process notification hub standing in for a hosted pub/sub service.
//!
//! One `broadcast` channel per subscription target, created on first
//! subscribe. Writers publish after their transaction commits.

use dashmap::DashMap;
use leadline_types::lead::LeadUid;
use leadline_types::message::Message;
use leadline_types::sync::{FeedEvent, LeadChange, SubscriptionTarget};
use tokio::sync::broadcast;
use tracing::debug;

/// Buffer size per target channel. A subscriber lagging further than this
/// loses its feed and must reconnect.
const FEED_BUFFER: usize = 256;

#[derive(Default)]
pub struct FeedHub {
    channels: DashMap<SubscriptionTarget, broadcast::Sender<FeedEvent>>,
}

impl FeedHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to all future events for `target`.
    pub fn subscribe(&self, target: &SubscriptionTarget) -> broadcast::Receiver<FeedEvent> {
        self.channels
            .entry(target.clone())
            .or_insert_with(|| broadcast::channel(FEED_BUFFER).0)
            .subscribe()
    }

    pub fn publish_message(&self, message: &Message) {
        let target = SubscriptionTarget::session(message.session_id.clone());
        self.publish(
            target,
            FeedEvent::MessageInserted {
                message: message.clone(),
            },
        );
    }

    pub fn publish_lead(&self, uid: &LeadUid, change: LeadChange) {
        self.publish(
            SubscriptionTarget::Roster,
            FeedEvent::LeadChanged {
                uid: uid.clone(),
                change,
            },
        );
    }

    /// Drop every channel. Open feeds end once they drain their buffers.
    pub fn disconnect_all(&self) {
        self.channels.clear();
    }

    /// Number of targets with a live channel.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn publish(&self, target: SubscriptionTarget, event: FeedEvent) {
        let delivered = self.channels.get(&target).map(|tx| tx.send(event).is_ok());
        match delivered {
            Some(true) => {}
            Some(false) => {
                // Nobody listening any more.
                self.channels
                    .remove_if(&target, |_, tx| tx.receiver_count() == 0);
                debug!(%target, "pruned idle feed channel");
            }
            None => {}
        }
    }
}
