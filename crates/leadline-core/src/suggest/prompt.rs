//! Prompt construction and response parsing for reply suggestions.

use leadline_types::error::SuggestionError;
use leadline_types::message::Message;
use leadline_types::suggestion::MAX_SUGGESTIONS;
use serde::Deserialize;

use super::generator::PromptContext;

const SYSTEM_PROMPT: &str = "You are a helpful chat operator for a company website. \
Reply suggestions must be short, professional, and relevant to the conversation.";

#[derive(Deserialize)]
struct SuggestionPayload {
    suggestions: Vec<String>,
}

/// Build the prompt from the last `window` messages of a timeline.
pub fn build_prompt(messages: &[Message], window: usize, max_suggestions: usize) -> PromptContext {
    let max_suggestions = max_suggestions.min(MAX_SUGGESTIONS);
    let start = messages.len().saturating_sub(window);
    let transcript = messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.sender_type, m.text))
        .collect::<Vec<_>>()
        .join("\n");

    PromptContext {
        system: SYSTEM_PROMPT.to_string(),
        user: format!(
            "Based on the following chat history, suggest {max_suggestions} short replies \
the operator could send next.\n\nChat History:\n{transcript}\n\n\
Respond with JSON only, in the form {{\"suggestions\": [\"...\"]}}."
        ),
    }
}

/// Parse a `{"suggestions": [...]}` completion.
///
/// Tolerates a surrounding Markdown code fence. Entries are trimmed, blanks
/// dropped, and the list truncated to `max` (never more than
/// [`MAX_SUGGESTIONS`]). An empty result is an error.
pub fn parse_suggestions(raw: &str, max: usize) -> Result<Vec<String>, SuggestionError> {
    let body = strip_code_fence(raw.trim());
    let payload: SuggestionPayload = serde_json::from_str(body)
        .map_err(|e| SuggestionError::InvalidResponse(e.to_string()))?;

    let suggestions: Vec<String> = payload
        .suggestions
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(max.min(MAX_SUGGESTIONS))
        .collect();

    if suggestions.is_empty() {
        return Err(SuggestionError::InvalidResponse(
            "no suggestions in response".to_string(),
        ));
    }
    Ok(suggestions)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
