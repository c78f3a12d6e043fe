//! Provider adapters — one per wire format.
//!
//! An adapter is pure: it turns a user message into a `PreparedRequest` and a
//! raw response body back into a `DispatchResult`. All I/O lives in the
//! `Transport`, so adapters can be tested without a network.

mod anthropic;
mod deepseek;
mod generic;
mod openai;

pub use anthropic::AnthropicAdapter;
pub use deepseek::DeepSeekAdapter;
pub use generic::GenericAdapter;
pub use openai::OpenAiAdapter;

use serde_json::Value;

use chatrelay_core::config::AuthScheme;
use chatrelay_core::{DispatchResult, ProviderKind};

use crate::error::DispatchError;
use crate::registry::ResolvedEndpoint;

// ─────────────────────────────────────────────
// PreparedRequest
// ─────────────────────────────────────────────

/// A fully-built HTTP POST, ready for the transport.
#[derive(Clone, PartialEq)]
pub struct PreparedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl PreparedRequest {
    /// Look up a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("PreparedRequest")
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("body", &self.body)
            .finish()
    }
}

// ─────────────────────────────────────────────
// ProviderAdapter trait
// ─────────────────────────────────────────────

/// Request/response translation for one provider family.
pub trait ProviderAdapter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Build the provider-specific request for a single user turn.
    fn build_request(&self, user_message: &str, endpoint: &ResolvedEndpoint) -> PreparedRequest;

    /// Normalize a 2xx response body.
    fn parse_response(&self, raw_body: &str) -> DispatchResult;

    /// Normalize a non-2xx response.
    fn parse_error(&self, status: u16, raw_body: &str) -> DispatchResult {
        DispatchResult::failure(
            DispatchError::Status {
                status,
                message: extract_error_message(raw_body),
            }
            .to_string(),
        )
    }
}

/// The adapter for a provider kind.
pub fn adapter_for(kind: ProviderKind) -> &'static dyn ProviderAdapter {
    match kind {
        ProviderKind::OpenAi => &OpenAiAdapter,
        ProviderKind::Anthropic => &AnthropicAdapter,
        ProviderKind::DeepSeek => &DeepSeekAdapter,
        ProviderKind::Generic => &GenericAdapter,
    }
}

// ─────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────

/// Pull a human-readable message out of a provider error body.
///
/// Recognised shapes: `{"error": {"message": ".."}}`, `{"error": ".."}`,
/// `{"message": ".."}`.
pub fn extract_error_message(raw_body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw_body).ok()?;
    let message = value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| value.get("error").and_then(Value::as_str))
        .or_else(|| value.get("message").and_then(Value::as_str))?;

    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

/// Base headers for a JSON request authenticated per `endpoint.auth_scheme`.
pub(crate) fn base_headers(endpoint: &ResolvedEndpoint) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    if endpoint.credential.is_empty() {
        return headers;
    }
    headers.push(match endpoint.auth_scheme {
        AuthScheme::Bearer => (
            "Authorization".to_string(),
            format!("Bearer {}", endpoint.credential),
        ),
        AuthScheme::ApiKeyHeader => ("x-api-key".to_string(), endpoint.credential.clone()),
    });
    headers
}

/// A format failure, with the common reason text.
pub(crate) fn format_failure() -> DispatchResult {
    DispatchResult::failure(DispatchError::Format.to_string())
}

/// Test fixture shared by the adapter tests.
#[cfg(test)]
pub(crate) fn test_endpoint(url: &str, auth_scheme: AuthScheme) -> ResolvedEndpoint {
    ResolvedEndpoint {
        url: url.to_string(),
        auth_scheme,
        credential: "test-key".to_string(),
        model: "test-model".to_string(),
        max_tokens: 500,
        temperature: 0.7,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
