//! Shared domain types for Leadline.
//!
//! This crate contains the core domain types used across the Leadline
//! workspace: Lead, Operator, Message, subscription targets and snapshots,
//! embed-bridge signals, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod embed;
pub mod error;
pub mod lead;
pub mod message;
pub mod operator;
pub mod suggestion;
pub mod sync;
