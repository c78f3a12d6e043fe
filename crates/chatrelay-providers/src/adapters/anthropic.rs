//! Anthropic Messages API format.

use serde::Deserialize;
use serde_json::json;

use chatrelay_core::{DispatchResult, Usage};

use super::{base_headers, format_failure, PreparedRequest, ProviderAdapter};
use crate::registry::ResolvedEndpoint;

/// API version pinned in the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone, Copy, Debug, Default)]
pub struct AnthropicAdapter;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn build_request(&self, user_message: &str, endpoint: &ResolvedEndpoint) -> PreparedRequest {
        let mut headers = base_headers(endpoint);
        headers.push((
            "anthropic-version".to_string(),
            ANTHROPIC_VERSION.to_string(),
        ));

        PreparedRequest {
            url: endpoint.url.clone(),
            headers,
            body: json!({
                "model": endpoint.model,
                "max_tokens": endpoint.max_tokens,
                "temperature": endpoint.temperature,
                "messages": [{ "role": "user", "content": user_message }],
            }),
        }
    }

    fn parse_response(&self, raw_body: &str) -> DispatchResult {
        let Ok(response) = serde_json::from_str::<MessagesResponse>(raw_body) else {
            return format_failure();
        };
        let usage = response
            .usage
            .map(|u| Usage::new(u.input_tokens, u.output_tokens));

        match response.content.into_iter().next().and_then(|block| block.text) {
            Some(text) if !text.is_empty() => DispatchResult::Success {
                message: text,
                usage,
            },
            _ => format_failure(),
        }
    }
}
