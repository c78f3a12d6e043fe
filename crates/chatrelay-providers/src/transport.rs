//! HTTP transport — the only place that touches the network.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use chatrelay_core::utils::truncate_string;

use crate::adapters::PreparedRequest;
use crate::error::DispatchError;

/// Status and body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one POST for a prepared request.
///
/// Implementations return `Err` only when no HTTP response was obtained;
/// non-2xx statuses come back as `Ok` for the adapter to interpret.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: &PreparedRequest) -> Result<HttpResponse, DispatchError>;
}

// ─────────────────────────────────────────────
// reqwest implementation
// ─────────────────────────────────────────────

/// Connection-pooled `reqwest` transport with a per-attempt timeout.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;
        Ok(ReqwestTransport {
            client,
            timeout_secs,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: &PreparedRequest) -> Result<HttpResponse, DispatchError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!(
            url = %request.url,
            status,
            body = %truncate_string(&body, 200),
            "HTTP response"
        );

        Ok(HttpResponse { status, body })
    }
}

impl ReqwestTransport {
    fn classify(&self, err: reqwest::Error) -> DispatchError {
        if err.is_timeout() {
            DispatchError::Timeout(self.timeout_secs)
        } else {
            DispatchError::from(err)
        }
    }
}
