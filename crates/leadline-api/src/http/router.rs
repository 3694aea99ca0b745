//! Axum router configuration with middleware.
//!
//! REST routes live under `/api/v1/`, WebSocket feeds under `/ws/`, and the
//! widget loader script at the root so host pages can include it directly.
//! Middleware: CORS (any origin, since the loader runs on third-party pages)
//! and request tracing.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use leadline_core::embed::script::LOADER_PATH;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Roster and profiles
        .route(
            "/leads",
            get(handlers::lead::list_leads).post(handlers::lead::register_lead),
        )
        .route(
            "/leads/{uid}",
            get(handlers::lead::get_lead).patch(handlers::lead::patch_lead),
        )
        // Session timelines
        .route(
            "/sessions/{uid}/messages",
            get(handlers::message::list_messages).post(handlers::message::append_message),
        )
        .route(
            "/sessions/{uid}/suggestions",
            get(handlers::suggestion::get_suggestions),
        );

    let ws_routes = Router::new()
        .route("/sessions/{uid}", get(handlers::ws::session_feed))
        .route("/roster", get(handlers::ws::roster_feed));

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/ws", ws_routes)
        .route(LOADER_PATH, get(handlers::embed::loader_script))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use leadline_infra::sqlite::SqliteEventStore;
    use leadline_types::config::GlobalConfig;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());
        let store = SqliteEventStore::connect(&url).await.unwrap();
        let state = AppState::new(store, GlobalConfig::default(), dir.path().to_path_buf(), None);
        (build_router(state), dir)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn register(app: &Router, email: &str) -> String {
        let (status, body) = send(app, "POST", "/api/v1/leads", Some(json!({ "email": email }))).await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["uid"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _dir) = test_app().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn register_then_roster_and_welcome() {
        let (app, _dir) = test_app().await;
        let uid = register(&app, "ada@example.com").await;

        let (status, body) = send(&app, "GET", "/api/v1/leads", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["uid"], uid.as_str());
        assert!(body["meta"]["request_id"].is_string());

        let (_, body) = send(&app, "GET", &format!("/api/v1/sessions/{uid}/messages"), None).await;
        let messages = body["data"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["sender_id"], "system");
        assert_eq!(messages[0]["sender_type"], "operator");
    }

    #[tokio::test]
    async fn roster_search_filters_by_name_or_email() {
        let (app, _dir) = test_app().await;
        register(&app, "ada@example.com").await;
        let grace = register(&app, "grace@navy.mil").await;

        let (status, body) = send(&app, "GET", "/api/v1/leads?search=NAVY", None).await;
        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["uid"], grace.as_str());

        let (_, body) = send(&app, "GET", "/api/v1/leads", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_email_is_validation_error() {
        let (app, _dir) = test_app().await;
        let (status, body) = send(&app, "POST", "/api/v1/leads", Some(json!({ "email": "nope" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn append_orders_by_id_and_triggers_suggestions() {
        let (app, _dir) = test_app().await;
        let uid = register(&app, "grace@example.com").await;
        let path = format!("/api/v1/sessions/{uid}/messages");

        let (status, body) = send(
            &app,
            "POST",
            &path,
            Some(json!({ "sender_type": "client", "text": "  do you ship to Oslo?  " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["text"], "do you ship to Oslo?");
        assert_eq!(body["data"]["sender_id"], uid.as_str());

        let (_, body) = send(&app, "GET", &path, None).await;
        let ids: Vec<i64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids[0] < ids[1]);

        // No API key configured: the missing-credentials fallback.
        let (status, body) = send(&app, "GET", &format!("/api/v1/sessions/{uid}/suggestions"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["state"], "ready");
        assert_eq!(body["data"]["source"], "fallback_no_credentials");
        assert_eq!(body["data"]["suggestions"][0], "How can I help you today?");
    }

    #[tokio::test]
    async fn suggestions_clear_after_operator_reply() {
        let (app, _dir) = test_app().await;
        let uid = register(&app, "lin@example.com").await;
        // Newest message is the operator-side welcome.
        let (_, body) = send(&app, "GET", &format!("/api/v1/sessions/{uid}/suggestions"), None).await;
        assert_eq!(body["data"]["state"], "cleared");
    }

    #[tokio::test]
    async fn unknown_session_is_lead_not_found() {
        let (app, _dir) = test_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/sessions/lead_missing/messages",
            Some(json!({ "sender_type": "operator", "text": "hello?" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "LEAD_NOT_FOUND");

        let (status, _) = send(&app, "GET", "/api/v1/leads/lead_missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let (app, _dir) = test_app().await;
        let uid = register(&app, "sam@example.com").await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{uid}/messages"),
            Some(json!({ "sender_type": "client", "text": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn patch_replaces_tags_and_notes() {
        let (app, _dir) = test_app().await;
        let uid = register(&app, "kim@example.com").await;
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/v1/leads/{uid}"),
            Some(json!({ "tags": [" vip ", "", "b2b"], "notes": "prefers email" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tags"], json!(["b2b", "vip"]));
        assert_eq!(body["data"]["notes"], "prefers email");
    }

    #[tokio::test]
    async fn loader_script_is_javascript() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(Request::builder().uri(LOADER_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("application/javascript"));
    }
}
