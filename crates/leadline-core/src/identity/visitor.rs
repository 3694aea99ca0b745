//! Persisted local visitor state.

use leadline_types::error::RepositoryError;
use leadline_types::lead::LeadUid;
use serde::{Deserialize, Serialize};

/// The opaque identifier (and email) remembered for a returning visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorState {
    pub uid: LeadUid,
    pub email: String,
}

/// Storage for [`VisitorState`] on the visitor's device.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait VisitorStore: Send + Sync {
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<VisitorState>, RepositoryError>> + Send;

    fn save(
        &self,
        state: &VisitorState,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Forget the visitor. Clearing absent state is not an error.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// A store that remembers nothing.
///
/// For callers whose visitor state lives elsewhere, such as the HTTP API
/// where the browser keeps its own identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVisitorStore;

impl VisitorStore for NoVisitorStore {
    async fn load(&self) -> Result<Option<VisitorState>, RepositoryError> {
        Ok(None)
    }

    async fn save(&self, _state: &VisitorState) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
