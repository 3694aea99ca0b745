//! Visitor identity binding.
//!
//! A returning visitor is re-bound to their lead from persisted local state;
//! a new visitor registers with an email.

pub mod service;
pub mod visitor;

pub use service::IdentityService;
pub use visitor::{NoVisitorStore, VisitorState, VisitorStore};
