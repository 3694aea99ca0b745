//! SQLite storage layer: pool, event store and push-notification hub.

pub mod feed;
pub mod hub;
pub mod lead;
pub mod message;
pub mod pool;
pub mod store;
pub mod tail;

pub use hub::FeedHub;
pub use pool::{DATABASE_FILE, DatabasePool, HighWater};
pub use store::SqliteEventStore;
pub use tail::{ChangeTail, DEFAULT_TAIL_INTERVAL};
