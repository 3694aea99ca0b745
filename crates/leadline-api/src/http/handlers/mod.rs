//! HTTP request handlers.

pub mod embed;
pub mod lead;
pub mod message;
pub mod suggestion;
pub mod ws;
