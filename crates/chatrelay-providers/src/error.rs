//! Failure taxonomy for one dispatch attempt.
//!
//! None of these escape the dispatcher: they are logged, folded into a
//! `DispatchResult::Failure`, and the next candidate is tried.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// Network unreachable, connection reset, TLS failure, …
    #[error("transport error: {0}")]
    Transport(String),

    /// The per-attempt deadline elapsed.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The provider answered with a non-2xx status.
    #[error(
        "HTTP error {status}{}",
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    Status { status: u16, message: Option<String> },

    /// The response body did not have the expected shape.
    #[error("invalid response format")]
    Format,

    /// No endpoint has a credential (or a custom URL) configured.
    #[error("no provider endpoints configured")]
    NoCandidates,

    /// Every candidate was tried and none succeeded.
    #[error("all endpoints failed")]
    Exhausted,
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        DispatchError::Transport(e.to_string())
    }
}
