//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig`, `RequestDefaults`, `StorageConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProviderKind;
use crate::utils;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Errors raised while validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Please enter an API key")]
    MissingCredential,
    #[error("invalid endpoint URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.chatrelay/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub request: RequestDefaults,
    pub storage: StorageConfig,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// How a credential is presented to the provider.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthScheme {
    /// `Authorization: Bearer <credential>`
    Bearer,
    /// `x-api-key: <credential>`
    ApiKeyHeader,
}

/// Configuration for a single provider endpoint.
///
/// Only `credential` is required; every other field falls back to the
/// provider's registry default, then to `RequestDefaults`.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key / token.
    pub credential: String,
    /// Full endpoint URL (overrides the provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_scheme: Option<AuthScheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 – 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl ProviderConfig {
    /// Whether this provider has a credential set.
    pub fn is_configured(&self) -> bool {
        !self.credential.is_empty()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("credential", &redact(&self.credential))
            .field("endpoint_url", &self.endpoint_url)
            .field("auth_scheme", &self.auth_scheme)
            .field("model_id", &self.model_id)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// The user-supplied endpoint tried after all built-in providers.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomEndpointConfig {
    /// Wire format of the endpoint. Detected from the URL host when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProviderKind>,
    #[serde(flatten)]
    pub endpoint: ProviderConfig,
}

impl CustomEndpointConfig {
    /// A custom endpoint is active as soon as it has a URL.
    pub fn is_configured(&self) -> bool {
        self.endpoint
            .endpoint_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

/// All provider configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
    pub deepseek: ProviderConfig,
    pub custom: CustomEndpointConfig,
}

impl ProvidersConfig {
    /// Get a built-in provider config by kind.
    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        match kind {
            ProviderKind::OpenAi => Some(&self.openai),
            ProviderKind::Anthropic => Some(&self.anthropic),
            ProviderKind::DeepSeek => Some(&self.deepseek),
            ProviderKind::Generic => None,
        }
    }

    /// Mutable access to a built-in provider config by kind.
    pub fn get_mut(&mut self, kind: ProviderKind) -> Option<&mut ProviderConfig> {
        match kind {
            ProviderKind::OpenAi => Some(&mut self.openai),
            ProviderKind::Anthropic => Some(&mut self.anthropic),
            ProviderKind::DeepSeek => Some(&mut self.deepseek),
            ProviderKind::Generic => None,
        }
    }

    /// Whether any endpoint at all is usable.
    pub fn any_configured(&self) -> bool {
        ProviderKind::BUILT_IN
            .iter()
            .filter_map(|kind| self.get(*kind))
            .any(ProviderConfig::is_configured)
            || self.custom.is_configured()
    }
}

// ─────────────────────────────────────────────
// Request defaults
// ─────────────────────────────────────────────

/// Generation parameters shared by every provider unless overridden.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestDefaults {
    pub max_tokens: u32,
    pub temperature: f64,
    /// Upper bound for a single HTTP attempt against one endpoint.
    pub timeout_secs: u64,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

// ─────────────────────────────────────────────
// Storage
// ─────────────────────────────────────────────

/// Where persisted blobs live.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Data directory override; defaults to `~/.chatrelay`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

impl StorageConfig {
    /// Directory holding the blob files.
    pub fn store_dir(&self) -> PathBuf {
        match self.data_dir.as_deref() {
            Some(dir) if !dir.is_empty() => utils::expand_home(dir).join("store"),
            _ => utils::get_store_path(),
        }
    }
}

// ─────────────────────────────────────────────
// Persisted API config blob
// ─────────────────────────────────────────────

/// The `{credential, endpointUrl}` blob saved from the settings dialog.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    pub credential: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("credential", &redact(&self.credential))
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl ApiConfig {
    pub fn new(credential: impl Into<String>, endpoint_url: Option<String>) -> Self {
        ApiConfig {
            credential: credential.into(),
            endpoint_url: endpoint_url.filter(|url| !url.trim().is_empty()),
        }
    }

    /// Reject blobs that cannot produce a working candidate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credential.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        if let Some(url) = &self.endpoint_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        Ok(())
    }

    /// Merge this blob into a config.
    ///
    /// The credential fills every built-in provider that has none of its own;
    /// a non-empty endpoint URL becomes the custom endpoint.
    pub fn apply(&self, config: &mut Config) {
        if self.credential.is_empty() {
            return;
        }
        for kind in ProviderKind::BUILT_IN {
            if let Some(provider) = config.providers.get_mut(kind) {
                if !provider.is_configured() {
                    provider.credential = self.credential.clone();
                }
            }
        }
        if let Some(url) = &self.endpoint_url {
            config.providers.custom.endpoint.endpoint_url = Some(url.clone());
            config.providers.custom.endpoint.credential = self.credential.clone();
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.request.max_tokens, 500);
        assert_eq!(config.request.temperature, 0.7);
        assert_eq!(config.request.timeout_secs, 30);
        assert!(!config.providers.any_configured());
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = serde_json::json!({
            "providers": {
                "openai": {
                    "credential": "sk-test",
                    "modelId": "gpt-4o-mini",
                    "maxTokens": 256
                },
                "custom": {
                    "kind": "generic",
                    "endpointUrl": "http://localhost:8080/generate",
                    "authScheme": "apiKeyHeader"
                }
            },
            "request": { "timeoutSecs": 5 }
        });

        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.providers.openai.credential, "sk-test");
        assert_eq!(config.providers.openai.model_id.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.providers.openai.max_tokens, Some(256));
        assert_eq!(config.providers.custom.kind, Some(ProviderKind::Generic));
        assert_eq!(
            config.providers.custom.endpoint.auth_scheme,
            Some(AuthScheme::ApiKeyHeader)
        );
        assert!(config.providers.custom.is_configured());
        assert_eq!(config.request.timeout_secs, 5);
        // Default preserved
        assert_eq!(config.request.max_tokens, 500);
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let mut config = Config::default();
        config.providers.custom.endpoint.endpoint_url = Some("http://x".into());
        let json = serde_json::to_value(&config).unwrap();

        assert!(json["request"].get("maxTokens").is_some());
        assert!(json["request"].get("max_tokens").is_none());
        assert_eq!(json["providers"]["custom"]["endpointUrl"], "http://x");
    }

    #[test]
    fn test_provider_config_is_configured() {
        let mut providers = ProvidersConfig::default();
        providers.anthropic.credential = "sk-ant-123".to_string();

        assert!(providers.get(ProviderKind::Anthropic).unwrap().is_configured());
        assert!(!providers.get(ProviderKind::OpenAi).unwrap().is_configured());
        assert!(providers.get(ProviderKind::Generic).is_none());
        assert!(providers.any_configured());

        let mut custom_only = ProvidersConfig::default();
        custom_only.custom.endpoint.endpoint_url = Some("http://localhost:8080".into());
        assert!(custom_only.any_configured());
    }

    #[test]
    fn test_custom_endpoint_needs_url() {
        let mut custom = CustomEndpointConfig::default();
        custom.endpoint.credential = "key".into();
        assert!(!custom.is_configured());
        custom.endpoint.endpoint_url = Some("   ".into());
        assert!(!custom.is_configured());
        custom.endpoint.endpoint_url = Some("https://llm.local/v1".into());
        assert!(custom.is_configured());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let mut provider = ProviderConfig::default();
        provider.credential = "sk-very-secret".into();
        let printed = format!("{:?}", provider);
        assert!(!printed.contains("sk-very-secret"));
        assert!(printed.contains("<redacted>"));

        let blob = ApiConfig::new("sk-very-secret", None);
        assert!(!format!("{:?}", blob).contains("sk-very-secret"));
    }

    #[test]
    fn test_api_config_validate() {
        assert!(matches!(
            ApiConfig::new("  ", None).validate(),
            Err(ConfigError::MissingCredential)
        ));
        assert!(matches!(
            ApiConfig::new("key", Some("ftp://x".into())).validate(),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(ApiConfig::new("key", Some("https://x.io".into())).validate().is_ok());
        assert!(ApiConfig::new("key", None).validate().is_ok());
    }

    #[test]
    fn test_api_config_empty_url_is_dropped() {
        let blob = ApiConfig::new("key", Some("".into()));
        assert!(blob.endpoint_url.is_none());
    }

    #[test]
    fn test_api_config_apply_fills_unset_providers() {
        let mut config = Config::default();
        config.providers.anthropic.credential = "own-key".into();

        ApiConfig::new("shared", Some("https://my.llm/api".into())).apply(&mut config);

        assert_eq!(config.providers.openai.credential, "shared");
        assert_eq!(config.providers.anthropic.credential, "own-key");
        assert_eq!(config.providers.deepseek.credential, "shared");
        assert_eq!(config.providers.custom.endpoint.credential, "shared");
        assert_eq!(
            config.providers.custom.endpoint.endpoint_url.as_deref(),
            Some("https://my.llm/api")
        );
    }

    #[test]
    fn test_api_config_blob_shape() {
        let blob = ApiConfig::new("k", Some("https://a.b".into()));
        let json = serde_json::to_value(&blob).unwrap();
        assert_eq!(json["credential"], "k");
        assert_eq!(json["endpointUrl"], "https://a.b");
    }

    #[test]
    fn test_store_dir_override() {
        let storage = StorageConfig {
            data_dir: Some("/tmp/relay".into()),
        };
        assert_eq!(storage.store_dir(), PathBuf::from("/tmp/relay/store"));
        assert!(StorageConfig::default().store_dir().ends_with("store"));
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.request.max_tokens, 500);
        assert!(config.providers.custom.kind.is_none());
    }
}
