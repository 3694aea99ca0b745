//! GET /widget-loader.js - the host-page loader script.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use leadline_core::embed::render_loader_script;

use crate::state::AppState;

pub async fn loader_script(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        render_loader_script(&state.config.embed),
    )
}
