//! OpenAI chat-completions format.

use serde::Deserialize;
use serde_json::json;

use chatrelay_core::{DispatchResult, Usage};

use super::{base_headers, format_failure, PreparedRequest, ProviderAdapter};
use crate::registry::ResolvedEndpoint;

/// `POST /v1/chat/completions` with a single user message.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenAiAdapter;

// ── Response shapes ──

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    pub content: Option<String>,
    /// DeepSeek reasoner models put their chain of thought here.
    pub reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsageInfo {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl From<UsageInfo> for Usage {
    fn from(u: UsageInfo) -> Self {
        Usage::new(u.prompt_tokens, u.completion_tokens)
    }
}

/// Shared by the OpenAI-compatible adapters.
pub(crate) fn build_chat_request(user_message: &str, endpoint: &ResolvedEndpoint) -> PreparedRequest {
    PreparedRequest {
        url: endpoint.url.clone(),
        headers: base_headers(endpoint),
        body: json!({
            "model": endpoint.model,
            "messages": [{ "role": "user", "content": user_message }],
            "max_tokens": endpoint.max_tokens,
            "temperature": endpoint.temperature,
        }),
    }
}

/// Parse a chat-completions body, returning the first choice's message.
pub(crate) fn parse_completion(raw_body: &str) -> Option<(ChoiceMessage, Option<Usage>)> {
    let response: CompletionResponse = serde_json::from_str(raw_body).ok()?;
    let message = response.choices.into_iter().next()?.message?;
    Some((message, response.usage.map(Usage::from)))
}

impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn build_request(&self, user_message: &str, endpoint: &ResolvedEndpoint) -> PreparedRequest {
        build_chat_request(user_message, endpoint)
    }

    fn parse_response(&self, raw_body: &str) -> DispatchResult {
        match parse_completion(raw_body) {
            Some((ChoiceMessage { content: Some(content), .. }, usage)) if !content.is_empty() => {
                DispatchResult::Success {
                    message: content,
                    usage,
                }
            }
            _ => format_failure(),
        }
    }
}
