//! OpenAI-compatible text generation for reply suggestions.
//!
//! One [`OpenAiCompatGenerator`] serves Gemini, OpenAI, Mistral and any other
//! endpoint speaking the chat completions protocol, selected by base URL.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::ExposeSecret;

use leadline_core::suggest::{PromptContext, TextGenerator};
use leadline_types::error::SuggestionError;

use self::config::OpenAiCompatConfig;

/// Suggestion generator backed by an OpenAI-compatible chat endpoint.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompatGenerator {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    max_completion_tokens: u32,
    temperature: f32,
}

impl OpenAiCompatGenerator {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
            max_completion_tokens: config.max_completion_tokens,
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// System instruction first, then the transcript as a single user turn.
    fn build_request(&self, prompt: &PromptContext) -> CreateChatCompletionRequest {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(prompt.system.clone()),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt.user.clone()),
                name: None,
            }),
        ];

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_completion_tokens: Some(self.max_completion_tokens),
            temperature: Some(self.temperature),
            ..Default::default()
        }
    }
}

impl TextGenerator for OpenAiCompatGenerator {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn generate(&self, prompt: &PromptContext) -> Result<String, SuggestionError> {
        let request = self.build_request(prompt);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| SuggestionError::InvalidResponse("completion had no content".to_string()))
    }
}

/// Map an `async_openai::error::OpenAIError` to a [`SuggestionError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> SuggestionError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("API key not valid")
            {
                SuggestionError::MissingCredentials
            } else {
                SuggestionError::Provider(api_err.message.clone())
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401 | 403) => SuggestionError::MissingCredentials,
            _ => SuggestionError::Provider(err.to_string()),
        },
        OpenAIError::JSONDeserialize(_, content) => {
            SuggestionError::InvalidResponse(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => SuggestionError::Provider(msg.clone()),
        _ => SuggestionError::Provider(err.to_string()),
    }
}
