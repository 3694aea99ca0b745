//! Realtime session/roster synchronization.
//!
//! [`SyncEngine`] merges locally issued writes and server-pushed events into
//! live, deduplicated views ordered by server-assigned message id.

pub mod backoff;
pub mod engine;
pub mod handle;
mod subscription;
pub mod timeline;

pub use engine::SyncEngine;
pub use handle::SubscriptionHandle;
pub use timeline::Timeline;
