//! GET /api/v1/sessions/{uid}/suggestions - reply suggestions for the
//! current timeline. Never fails because of the text-generation provider.

use axum::Json;
use axum::extract::{Path, State};

use leadline_core::repository::{LeadRepository, MessageRepository};
use leadline_types::error::SyncError;
use leadline_types::lead::LeadUid;
use leadline_types::suggestion::SuggestionState;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

pub async fn get_suggestions(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<ApiResponse<SuggestionState>>, AppError> {
    let clock = RequestClock::start();
    let uid = LeadUid::from(uid);
    if state.store().get_lead(&uid).await?.is_none() {
        return Err(SyncError::IdentityUnbound(uid).into());
    }
    let messages = state.store().list_messages(&uid).await?;

    let suggestion = match state.suggestions.suggest(&messages).await {
        Some(set) => SuggestionState::Ready(set),
        None => SuggestionState::Cleared,
    };
    Ok(Json(clock.respond(suggestion)))
}
