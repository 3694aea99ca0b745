//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use leadline_types::error::{RepositoryError, SyncError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Sync engine errors (writes, unbound sessions, bad input).
    Sync(SyncError),
    /// Read-side storage errors.
    Repository(RepositoryError),
    /// Request validation error.
    Validation(String),
}

impl From<SyncError> for AppError {
    fn from(e: SyncError) -> Self {
        AppError::Sync(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl AppError {
    /// Envelope error code and message.
    pub fn code_and_message(&self) -> (&'static str, String) {
        match self {
            AppError::Sync(SyncError::IdentityUnbound(uid)) => {
                ("LEAD_NOT_FOUND", format!("No lead for session '{uid}'"))
            }
            AppError::Sync(SyncError::InvalidInput(msg)) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Sync(e @ SyncError::WriteFailed(_)) => ("WRITE_FAILED", e.to_string()),
            AppError::Sync(e) => ("SYNC_ERROR", e.to_string()),
            AppError::Repository(RepositoryError::NotFound) => {
                ("NOT_FOUND", "Not found".to_string())
            }
            AppError::Repository(RepositoryError::Conflict(msg)) => ("CONFLICT", msg.clone()),
            AppError::Repository(e) => ("STORAGE_ERROR", e.to_string()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = self.code_and_message();
        if code == "WRITE_FAILED" || code == "STORAGE_ERROR" || code == "SYNC_ERROR" {
            tracing::warn!(code, %message, "request failed");
        }
        ApiResponse::error(code, &message, Uuid::now_v7().to_string(), 0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use leadline_types::lead::LeadUid;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn sync_errors_map_to_documented_statuses() {
        assert_eq!(
            status(SyncError::IdentityUnbound(LeadUid::from("lead_x")).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(SyncError::InvalidInput("empty".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(SyncError::WriteFailed("disk full".to_string()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(SyncError::SubscriptionLost { attempts: 3 }.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn repository_errors_map_to_statuses() {
        assert_eq!(status(RepositoryError::Connection.into()), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status(RepositoryError::Conflict("dup".to_string()).into()),
            StatusCode::CONFLICT
        );
    }
}
