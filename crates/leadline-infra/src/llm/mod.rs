//! Text-generation providers for reply suggestions.

pub mod openai_compat;

use leadline_types::config::SuggestionConfig;
use secrecy::SecretString;

use self::openai_compat::OpenAiCompatGenerator;
use self::openai_compat::config::{OpenAiCompatConfig, resolve_api_key};

/// Build the configured generator, or `None` when no API key is available.
///
/// The key is read from the environment variable named by
/// `settings.api_key_env`.
pub fn build_generator(settings: &SuggestionConfig) -> Option<OpenAiCompatGenerator> {
    let Some(api_key) = resolve_api_key(&settings.api_key_env) else {
        tracing::info!(
            env_var = %settings.api_key_env,
            "no suggestion API key set, fallback suggestions only"
        );
        return None;
    };
    Some(build_generator_with_key(settings, api_key))
}

/// Build a generator from an explicit key.
pub fn build_generator_with_key(settings: &SuggestionConfig, api_key: SecretString) -> OpenAiCompatGenerator {
    tracing::debug!(provider = %settings.provider, model = %settings.model, "suggestion generator configured");
    OpenAiCompatGenerator::new(OpenAiCompatConfig::from_settings(settings, api_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadline_core::suggest::TextGenerator;

    #[test]
    fn missing_key_yields_no_generator() {
        let settings = SuggestionConfig {
            api_key_env: "LEADLINE_TEST_UNSET_SUGGESTION_KEY".to_string(),
            ..SuggestionConfig::default()
        };
        assert!(build_generator(&settings).is_none());
    }

    #[test]
    fn explicit_key_builds_generator() {
        let settings = SuggestionConfig {
            provider: "mistral".to_string(),
            ..SuggestionConfig::default()
        };
        let generator = build_generator_with_key(&settings, SecretString::from("k"));
        assert_eq!(generator.name(), "mistral");
    }
}
