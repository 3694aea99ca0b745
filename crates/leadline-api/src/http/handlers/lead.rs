//! Lead roster and profile HTTP handlers.
//!
//! Endpoints:
//! - GET   /api/v1/leads       - The roster, newest first (`?search=` filters)
//! - POST  /api/v1/leads       - Register a lead from an email
//! - GET   /api/v1/leads/{uid} - One lead
//! - PATCH /api/v1/leads/{uid} - Replace tags and/or notes

use std::collections::BTreeSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use leadline_core::repository::LeadRepository;
use leadline_types::error::SyncError;
use leadline_types::lead::{Lead, LeadPatch, LeadUid};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

/// `?search=` filters by name or email, ignoring case.
#[derive(Debug, Default, Deserialize)]
pub struct ListLeadsQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterLeadRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PatchLeadRequest {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PatchLeadRequest {
    /// Tags are trimmed and blanks dropped.
    fn into_patch(self) -> LeadPatch {
        LeadPatch {
            tags: self.tags.map(|tags| {
                tags.iter()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect::<BTreeSet<_>>()
            }),
            notes: self.notes,
        }
    }
}

/// GET /api/v1/leads - List all leads, newest first.
pub async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<ListLeadsQuery>,
) -> Result<Json<ApiResponse<Vec<Lead>>>, AppError> {
    let clock = RequestClock::start();
    let mut leads = state.store().list_leads().await?;
    if let Some(search) = query.search.as_deref() {
        leads.retain(|lead| lead.matches_query(search));
    }
    Ok(Json(clock.respond(leads)))
}

/// POST /api/v1/leads - Register a visitor. Sends the welcome message.
pub async fn register_lead(
    State(state): State<AppState>,
    Json(body): Json<RegisterLeadRequest>,
) -> Result<Json<ApiResponse<Lead>>, AppError> {
    let clock = RequestClock::start();
    let lead = state.remote_identity().register(&body.email).await?;
    Ok(Json(clock.respond(lead)))
}

/// GET /api/v1/leads/{uid}
pub async fn get_lead(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<ApiResponse<Lead>>, AppError> {
    let clock = RequestClock::start();
    let uid = LeadUid::from(uid);
    let lead = state
        .store()
        .get_lead(&uid)
        .await?
        .ok_or(SyncError::IdentityUnbound(uid))?;
    Ok(Json(clock.respond(lead)))
}

/// PATCH /api/v1/leads/{uid} - Operator profile edit (last writer wins).
pub async fn patch_lead(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(body): Json<PatchLeadRequest>,
) -> Result<Json<ApiResponse<Lead>>, AppError> {
    let clock = RequestClock::start();
    let lead = state
        .engine
        .update_lead(&LeadUid::from(uid), &body.into_patch())
        .await?;
    Ok(Json(clock.respond(lead)))
}
