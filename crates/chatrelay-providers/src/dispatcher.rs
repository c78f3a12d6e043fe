//! Dispatcher — sequential fail-over across candidate endpoints.
//!
//! Candidates are tried strictly in order with one attempt each. The first
//! success short-circuits; every failure is logged and swallowed. Callers
//! only ever see a `DispatchResult`, never an error.

use std::sync::Arc;

use tracing::{debug, info, warn};

use chatrelay_core::config::Config;
use chatrelay_core::DispatchResult;

use crate::error::DispatchError;
use crate::registry::{build_candidates, Candidate};
use crate::transport::{ReqwestTransport, Transport};

pub struct Dispatcher {
    candidates: Vec<Candidate>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("candidates", &self.candidates)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Build candidates from config and a `reqwest` transport.
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, DispatchError> {
        let transport = ReqwestTransport::new(config.request.timeout_secs)?;
        Ok(Self::with_transport(
            build_candidates(config),
            Arc::new(transport),
        ))
    }

    pub fn with_transport(candidates: Vec<Candidate>, transport: Arc<dyn Transport>) -> Self {
        Dispatcher {
            candidates,
            transport,
        }
    }

    /// Candidates in attempt order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Send `user_message` to the first candidate that answers.
    pub async fn send(&self, user_message: &str) -> DispatchResult {
        if self.candidates.is_empty() {
            warn!("{}", DispatchError::NoCandidates);
            return DispatchResult::failure(DispatchError::Exhausted.to_string());
        }

        for (index, candidate) in self.candidates.iter().enumerate() {
            match self.attempt(candidate, user_message).await {
                DispatchResult::Success { message, usage } => {
                    if index > 0 {
                        info!(endpoint = %candidate.label, "Answered by fallback endpoint");
                    }
                    return DispatchResult::Success { message, usage };
                }
                DispatchResult::Failure { reason } => {
                    warn!(endpoint = %candidate.label, %reason, "Endpoint failed, trying next");
                }
            }
        }

        DispatchResult::failure(DispatchError::Exhausted.to_string())
    }

    /// One attempt against one candidate.
    async fn attempt(&self, candidate: &Candidate, user_message: &str) -> DispatchResult {
        let adapter = candidate.adapter();
        let request = adapter.build_request(user_message, &candidate.endpoint);

        debug!(
            endpoint = %candidate.label,
            adapter = adapter.name(),
            url = %request.url,
            model = %candidate.endpoint.model,
            "Dispatching"
        );

        match self.transport.post(&request).await {
            Ok(response) if response.is_success() => adapter.parse_response(&response.body),
            Ok(response) => adapter.parse_error(response.status, &response.body),
            Err(e) => DispatchResult::failure(e.to_string()),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
