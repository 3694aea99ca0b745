//! HTTP/WebSocket API layer for Leadline.
//!
//! Axum-based REST API at `/api/v1/` with the envelope response format,
//! WebSocket feeds under `/ws/`, and the widget loader script.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
