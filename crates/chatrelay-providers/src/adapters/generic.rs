//! Generic completion endpoints (`{prompt, max_tokens, temperature}`).
//!
//! The response is probed in order: `choices[0].text`, `response`, `message`.
//! A JSON body with none of them still counts as an answer, with a fixed
//! placeholder text.

use serde_json::{json, Value};

use chatrelay_core::DispatchResult;

use super::{base_headers, format_failure, PreparedRequest, ProviderAdapter};
use crate::registry::ResolvedEndpoint;

pub const UNPROCESSED_REPLY: &str = "I received your message but couldn't process it properly.";

#[derive(Clone, Copy, Debug, Default)]
pub struct GenericAdapter;

impl ProviderAdapter for GenericAdapter {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn build_request(&self, user_message: &str, endpoint: &ResolvedEndpoint) -> PreparedRequest {
        PreparedRequest {
            url: endpoint.url.clone(),
            headers: base_headers(endpoint),
            body: json!({
                "prompt": user_message,
                "max_tokens": endpoint.max_tokens,
                "temperature": endpoint.temperature,
            }),
        }
    }

    fn parse_response(&self, raw_body: &str) -> DispatchResult {
        let Ok(value) = serde_json::from_str::<Value>(raw_body) else {
            return format_failure();
        };

        let text = ["/choices/0/text", "/response", "/message"]
            .iter()
            .filter_map(|path| value.pointer(path).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or(UNPROCESSED_REPLY);

        DispatchResult::success(text)
    }
}
