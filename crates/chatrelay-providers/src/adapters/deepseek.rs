//! DeepSeek — OpenAI-compatible, plus `reasoning_content` as a fallback.

use chatrelay_core::DispatchResult;

use super::openai::{build_chat_request, parse_completion, ChoiceMessage};
use super::{format_failure, PreparedRequest, ProviderAdapter};
use crate::registry::ResolvedEndpoint;

#[derive(Clone, Copy, Debug, Default)]
pub struct DeepSeekAdapter;

impl ProviderAdapter for DeepSeekAdapter {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    fn build_request(&self, user_message: &str, endpoint: &ResolvedEndpoint) -> PreparedRequest {
        build_chat_request(user_message, endpoint)
    }

    fn parse_response(&self, raw_body: &str) -> DispatchResult {
        let Some((message, usage)) = parse_completion(raw_body) else {
            return format_failure();
        };
        let ChoiceMessage {
            content,
            reasoning_content,
        } = message;

        match content
            .filter(|c| !c.is_empty())
            .or_else(|| reasoning_content.filter(|r| !r.is_empty()))
        {
            Some(message) => DispatchResult::Success { message, usage },
            None => format_failure(),
        }
    }
}
