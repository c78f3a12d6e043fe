//! Core types for Chatrelay — the conversation record, provider identity,
//! normalized dispatch results and connection status.

use serde::{Deserialize, Serialize};

use crate::utils;

// ─────────────────────────────────────────────
// Conversation record
// ─────────────────────────────────────────────

/// Who authored a chat message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// A single entry of the conversation log.
///
/// Fields are private: a message is immutable once created and is only ever
/// appended to (or bulk-cleared from) a `ConversationStore`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    text: String,
    sender: Sender,
    timestamp: String,
}

impl ChatMessage {
    /// Create a message stamped with the current local wall-clock time.
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self::with_timestamp(text, sender, utils::clock_time())
    }

    /// Create a message with an explicit timestamp string.
    pub fn with_timestamp(
        text: impl Into<String>,
        sender: Sender,
        timestamp: impl Into<String>,
    ) -> Self {
        ChatMessage {
            text: text.into(),
            sender,
            timestamp: timestamp.into(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    /// Create a bot message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

// ─────────────────────────────────────────────
// Provider identity
// ─────────────────────────────────────────────

/// The provider family an endpoint speaks.
///
/// Chosen once at configuration time; the dispatcher never inspects URLs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    #[serde(rename = "deepseek")]
    DeepSeek,
    Generic,
}

impl ProviderKind {
    /// Built-in providers in candidate order.
    pub const BUILT_IN: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::DeepSeek,
    ];

    /// Internal name, matching the config key.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────
// Dispatch results
// ─────────────────────────────────────────────

/// Token usage, normalized across provider families.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Build usage from prompt/completion counts; the total is derived.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Provider-agnostic outcome of one adapter call, or of a whole dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchResult {
    /// The provider answered; `message` is never empty.
    Success {
        message: String,
        usage: Option<Usage>,
    },
    Failure { reason: String },
}

impl DispatchResult {
    /// A success without usage metadata.
    pub fn success(message: impl Into<String>) -> Self {
        DispatchResult::Success {
            message: message.into(),
            usage: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        DispatchResult::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchResult::Success { .. })
    }

    /// The reply text, if this is a success.
    pub fn message(&self) -> Option<&str> {
        match self {
            DispatchResult::Success { message, .. } => Some(message),
            DispatchResult::Failure { .. } => None,
        }
    }
}

// ─────────────────────────────────────────────
// Connection status
// ─────────────────────────────────────────────

/// Result of the most recent connectivity probe.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Checking,
    Connected,
    Degraded,
    Failed,
}

impl ConnectionStatus {
    /// Human-readable label for a status indicator.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "Testing API connection...",
            ConnectionStatus::Connected => "API Connected Successfully",
            ConnectionStatus::Degraded => "API Connection Failed - Using Fallback",
            ConnectionStatus::Failed => "API Unavailable - Check Configuration",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionStatus::Checking => "checking",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Degraded => "degraded",
            ConnectionStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
