//! Lead repository trait definition.

use leadline_types::error::RepositoryError;
use leadline_types::lead::{Lead, LeadPatch, LeadUid, NewLead};

/// Repository trait for lead persistence.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait LeadRepository: Send + Sync {
    /// List every lead, newest first (`created_at` DESC).
    fn list_leads(&self)
    -> impl std::future::Future<Output = Result<Vec<Lead>, RepositoryError>> + Send;

    /// Get a lead by uid. Returns `None` if it does not exist.
    fn get_lead(
        &self,
        uid: &LeadUid,
    ) -> impl std::future::Future<Output = Result<Option<Lead>, RepositoryError>> + Send;

    /// Insert a freshly registered lead. Returns `Conflict` on a duplicate uid.
    fn insert_lead(
        &self,
        lead: &NewLead,
    ) -> impl std::future::Future<Output = Result<Lead, RepositoryError>> + Send;

    /// Overwrite the fields present in `patch` (last writer wins).
    ///
    /// Returns `NotFound` if the lead does not exist.
    fn update_lead(
        &self,
        uid: &LeadUid,
        patch: &LeadPatch,
    ) -> impl std::future::Future<Output = Result<Lead, RepositoryError>> + Send;
}
