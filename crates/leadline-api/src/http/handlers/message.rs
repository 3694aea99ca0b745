//! Session timeline HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/v1/sessions/{uid}/messages - Timeline ordered by id
//! - POST /api/v1/sessions/{uid}/messages - Append through the sync engine

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use leadline_core::repository::{LeadRepository, MessageRepository};
use leadline_types::error::SyncError;
use leadline_types::lead::LeadUid;
use leadline_types::message::{Message, SenderType};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub sender_type: SenderType,
    pub text: String,
    /// Operator name. Ignored for client messages.
    #[serde(default)]
    pub sender_id: Option<String>,
}

/// GET /api/v1/sessions/{uid}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<ApiResponse<Vec<Message>>>, AppError> {
    let clock = RequestClock::start();
    let uid = LeadUid::from(uid);
    if state.store().get_lead(&uid).await?.is_none() {
        return Err(SyncError::IdentityUnbound(uid).into());
    }
    let messages = state.store().list_messages(&uid).await?;
    Ok(Json(clock.respond(messages)))
}

/// POST /api/v1/sessions/{uid}/messages
pub async fn append_message(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(body): Json<AppendMessageRequest>,
) -> Result<Json<ApiResponse<Message>>, AppError> {
    let clock = RequestClock::start();
    let message = state
        .engine
        .append_as(
            &LeadUid::from(uid),
            body.sender_type,
            body.sender_id.as_deref(),
            &body.text,
        )
        .await?;
    Ok(Json(clock.respond(message)))
}
