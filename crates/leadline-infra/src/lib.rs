//! Infrastructure layer for Leadline.
//!
//! Contains implementations of the traits defined in `leadline-core`:
//! the SQLite event store with its push feed, the OpenAI-compatible
//! suggestion generator, and filesystem adapters for config and visitor state.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
