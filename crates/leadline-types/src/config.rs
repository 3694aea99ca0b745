//! Global configuration types for Leadline.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls
//! feed reconnection, reply suggestions, and the embed footprint.

use serde::{Deserialize, Serialize};

use crate::suggestion::MAX_SUGGESTIONS;

/// Top-level configuration.
///
/// Loaded from `~/.leadline/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub suggestions: SuggestionConfig,

    #[serde(default)]
    pub embed: EmbedConfig,
}

/// `[sync]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// `[sync.reconnect]`: bounded exponential backoff for dropped feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Consecutive failures before the subscription is declared lost.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_initial_delay_ms() -> u64 {
    250
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_attempts() -> u32 {
    8
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// `[suggestions]`: the text-generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible endpoint. Defaults to Gemini's compatibility layer.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Number of trailing messages sent as context.
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Capped at [`MAX_SUGGESTIONS`]; see [`SuggestionConfig::suggestion_limit`].
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl SuggestionConfig {
    /// `max_suggestions` clamped to `1..=MAX_SUGGESTIONS`.
    pub fn suggestion_limit(&self) -> usize {
        self.max_suggestions.clamp(1, MAX_SUGGESTIONS)
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_ms() -> u64 {
    8_000
}

fn default_context_window() -> usize {
    5
}

fn default_max_suggestions() -> usize {
    MAX_SUGGESTIONS
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
            context_window: default_context_window(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

/// `[embed]`: public URL and widget footprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Base URL the loader script is served from.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_expanded_width")]
    pub expanded_width: u32,

    #[serde(default = "default_expanded_height")]
    pub expanded_height: u32,

    #[serde(default = "default_collapsed_size")]
    pub collapsed_size: u32,
}

fn default_public_base_url() -> String {
    "http://localhost:8600".to_string()
}

fn default_expanded_width() -> u32 {
    400
}

fn default_expanded_height() -> u32 {
    650
}

fn default_collapsed_size() -> u32 {
    80
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
            expanded_width: default_expanded_width(),
            expanded_height: default_expanded_height(),
            collapsed_size: default_collapsed_size(),
        }
    }
}
