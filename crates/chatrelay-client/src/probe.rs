//! Connection probe — one canary message through the dispatcher.

use tracing::debug;

use chatrelay_core::ConnectionStatus;
use chatrelay_providers::Dispatcher;

/// Fixed low-cost message used only to test connectivity.
pub const CANARY: &str = "Hello";

/// Classify connectivity: any success is `Connected`, anything else `Degraded`.
pub async fn probe(dispatcher: &Dispatcher) -> ConnectionStatus {
    let result = dispatcher.send(CANARY).await;
    debug!(success = result.is_success(), "Probe finished");
    if result.is_success() {
        ConnectionStatus::Connected
    } else {
        ConnectionStatus::Degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::config::Config;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_without_credentials_is_degraded() {
        let dispatcher = Dispatcher::from_config(&Config::default()).unwrap();
        assert_eq!(probe(&dispatcher).await, ConnectionStatus::Degraded);
    }

    #[tokio::test]
    async fn test_probe_sends_canary_and_connects() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"prompt": "Hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hi"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.providers.custom.endpoint.endpoint_url = Some(server.uri());
        let dispatcher = Dispatcher::from_config(&config).unwrap();

        assert_eq!(probe(&dispatcher).await, ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_probe_on_server_error_is_degraded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.providers.custom.endpoint.endpoint_url = Some(server.uri());
        let dispatcher = Dispatcher::from_config(&config).unwrap();

        assert_eq!(probe(&dispatcher).await, ConnectionStatus::Degraded);
    }
}
