//! Text-generation collaborator trait.

use leadline_types::error::SuggestionError;

/// A bounded prompt for one suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    /// Operator-persona instruction.
    pub system: String,
    /// Transcript plus the output-format request.
    pub user: String,
}

/// External text generation (an LLM behind some HTTP API).
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait TextGenerator: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Produce a raw completion for the prompt.
    fn generate(
        &self,
        prompt: &PromptContext,
    ) -> impl std::future::Future<Output = Result<String, SuggestionError>> + Send;
}
