//! Connection settings for an OpenAI-compatible endpoint.

use secrecy::SecretString;

use leadline_types::config::SuggestionConfig;

/// Everything needed to construct an [`super::OpenAiCompatGenerator`].
///
/// Holds the API key as a [`SecretString`] so it never shows up in logs.
pub struct OpenAiCompatConfig {
    /// Short name used in logs (e.g. "gemini", "openai").
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    /// Upper bound on completion length. Three short replies fit comfortably.
    pub max_completion_tokens: u32,
    pub temperature: f32,
}

impl OpenAiCompatConfig {
    /// Build from the `[suggestions]` section and an already-resolved key.
    pub fn from_settings(settings: &SuggestionConfig, api_key: SecretString) -> Self {
        Self {
            provider_name: settings.provider.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model.clone(),
            max_completion_tokens: 256,
            temperature: 0.7,
        }
    }
}

/// Read the API key from the environment variable the config names.
///
/// Missing, empty, or whitespace-only values count as no credentials.
pub fn resolve_api_key(env_var: &str) -> Option<SecretString> {
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}
