//! Repository trait definitions (ports).
//!
//! These traits define the storage and push-feed interface that the
//! infrastructure layer (leadline-infra) implements. The core crate never
//! depends on any specific storage technology.

pub mod feed;
pub mod lead;
pub mod message;

pub use feed::{Feed, FeedSource};
pub use lead::LeadRepository;
pub use message::MessageRepository;
