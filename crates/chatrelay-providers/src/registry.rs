//! Provider registry — static specs for the built-in provider families,
//! endpoint resolution, and candidate list construction.
//!
//! Each `ProviderSpec` describes how to reach one family by default:
//! endpoint URL, model, auth scheme, and the host keyword used to recognise
//! a custom endpoint that speaks the same wire format.

use tracing::{debug, warn};

use chatrelay_core::config::{AuthScheme, Config, ProviderConfig, RequestDefaults};
use chatrelay_core::ProviderKind;

use crate::adapters::{adapter_for, ProviderAdapter};

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one family
// ─────────────────────────────────────────────

/// Static specification describing one provider family.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Human-readable name for logs. E.g. `"OpenAI"`.
    pub display_name: &'static str,
    /// Endpoint used when the config does not override it.
    pub default_endpoint: Option<&'static str>,
    /// Model used when the config does not override it.
    pub default_model: &'static str,
    pub auth_scheme: AuthScheme,
    /// If a custom endpoint URL contains this substring, it speaks this format.
    pub detect_by_host_keyword: Option<&'static str>,
}

/// All provider specs. Built-ins first, in candidate order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::OpenAi,
        display_name: "OpenAI",
        default_endpoint: Some("https://api.openai.com/v1/chat/completions"),
        default_model: "gpt-3.5-turbo",
        auth_scheme: AuthScheme::Bearer,
        detect_by_host_keyword: Some("openai.com"),
    },
    ProviderSpec {
        kind: ProviderKind::Anthropic,
        display_name: "Anthropic",
        default_endpoint: Some("https://api.anthropic.com/v1/messages"),
        default_model: "claude-3-sonnet-20240229",
        auth_scheme: AuthScheme::ApiKeyHeader,
        detect_by_host_keyword: Some("anthropic.com"),
    },
    ProviderSpec {
        kind: ProviderKind::DeepSeek,
        display_name: "DeepSeek",
        default_endpoint: Some("https://api.deepseek.com/chat/completions"),
        default_model: "deepseek-chat",
        auth_scheme: AuthScheme::Bearer,
        detect_by_host_keyword: Some("deepseek.com"),
    },
    // Generic endpoints have no default URL: they only exist when configured.
    ProviderSpec {
        kind: ProviderKind::Generic,
        display_name: "Generic",
        default_endpoint: None,
        default_model: "",
        auth_scheme: AuthScheme::Bearer,
        detect_by_host_keyword: None,
    },
];

/// Find the spec for a provider kind.
pub fn find_by_kind(kind: ProviderKind) -> &'static ProviderSpec {
    PROVIDERS
        .iter()
        .find(|spec| spec.kind == kind)
        .unwrap_or(&PROVIDERS[PROVIDERS.len() - 1])
}

/// Detect the wire format of a custom endpoint from its URL.
///
/// Falls back to `Generic` when no host keyword matches.
pub fn detect_kind(endpoint_url: &str) -> ProviderKind {
    let url_lower = endpoint_url.to_lowercase();
    PROVIDERS
        .iter()
        .find(|spec| {
            spec.detect_by_host_keyword
                .is_some_and(|kw| url_lower.contains(kw))
        })
        .map(|spec| spec.kind)
        .unwrap_or(ProviderKind::Generic)
}

// ─────────────────────────────────────────────
// Resolved endpoints and candidates
// ─────────────────────────────────────────────

/// A provider config with every field filled in.
#[derive(Clone, PartialEq)]
pub struct ResolvedEndpoint {
    pub url: String,
    pub auth_scheme: AuthScheme,
    pub credential: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl std::fmt::Debug for ResolvedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedEndpoint")
            .field("url", &self.url)
            .field("auth_scheme", &self.auth_scheme)
            .field("credential", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Resolve a provider config: config value > spec default > request default.
///
/// Returns `None` when no endpoint URL can be determined.
pub fn resolve_endpoint(
    spec: &ProviderSpec,
    config: &ProviderConfig,
    defaults: &RequestDefaults,
) -> Option<ResolvedEndpoint> {
    let url = config
        .endpoint_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .or(spec.default_endpoint)?
        .to_string();

    let model = config
        .model_id
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| spec.default_model.to_string());

    let max_tokens = match config.max_tokens.unwrap_or(defaults.max_tokens) {
        0 => {
            let fallback = RequestDefaults::default().max_tokens;
            warn!(
                provider = spec.display_name,
                fallback, "max_tokens must be positive, using default"
            );
            fallback
        }
        n => n,
    };

    let requested = config.temperature.unwrap_or(defaults.temperature);
    let temperature = if requested.is_nan() {
        RequestDefaults::default().temperature
    } else {
        requested.clamp(0.0, 2.0)
    };
    if temperature != requested {
        warn!(
            provider = spec.display_name,
            requested, temperature, "temperature out of range [0, 2], adjusted"
        );
    }

    Some(ResolvedEndpoint {
        url,
        auth_scheme: config.auth_scheme.unwrap_or(spec.auth_scheme),
        credential: config.credential.clone(),
        model,
        max_tokens,
        temperature,
    })
}

/// One concrete (endpoint, adapter) pair the dispatcher may attempt.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub kind: ProviderKind,
    /// Name for logs, e.g. `"Anthropic"` or `"Custom (Generic)"`.
    pub label: String,
    pub endpoint: ResolvedEndpoint,
}

impl Candidate {
    pub fn new(kind: ProviderKind, label: impl Into<String>, endpoint: ResolvedEndpoint) -> Self {
        Candidate {
            kind,
            label: label.into(),
            endpoint,
        }
    }

    /// The adapter that speaks this candidate's wire format.
    pub fn adapter(&self) -> &'static dyn ProviderAdapter {
        adapter_for(self.kind)
    }
}

/// Build the ordered candidate list from configuration.
///
/// 1. Built-in providers with a non-empty credential (OpenAI, Anthropic, DeepSeek).
/// 2. The custom endpoint, if it has a URL.
pub fn build_candidates(config: &Config) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for kind in ProviderKind::BUILT_IN {
        let Some(provider) = config.providers.get(kind) else {
            continue;
        };
        if !provider.is_configured() {
            continue;
        }
        let spec = find_by_kind(kind);
        if let Some(endpoint) = resolve_endpoint(spec, provider, &config.request) {
            candidates.push(Candidate::new(kind, spec.display_name, endpoint));
        }
    }

    let custom = &config.providers.custom;
    if custom.is_configured() {
        let url = custom.endpoint.endpoint_url.as_deref().unwrap_or_default();
        let kind = custom.kind.unwrap_or_else(|| detect_kind(url));
        let spec = find_by_kind(kind);
        if let Some(endpoint) = resolve_endpoint(spec, &custom.endpoint, &config.request) {
            candidates.push(Candidate::new(
                kind,
                format!("Custom ({})", spec.display_name),
                endpoint,
            ));
        }
    }

    debug!(
        candidates = ?candidates.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
        "Built dispatch candidates"
    );
    candidates
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn with_credential(credential: &str) -> ProviderConfig {
        ProviderConfig {
            credential: credential.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_by_kind() {
        assert_eq!(find_by_kind(ProviderKind::Anthropic).display_name, "Anthropic");
        assert_eq!(
            find_by_kind(ProviderKind::DeepSeek).default_model,
            "deepseek-chat"
        );
        assert!(find_by_kind(ProviderKind::Generic).default_endpoint.is_none());
    }

    #[test]
    fn test_all_kinds_have_unique_specs() {
        for spec in PROVIDERS {
            assert_eq!(find_by_kind(spec.kind).display_name, spec.display_name);
        }
        assert_eq!(PROVIDERS.len(), 4);
    }

    #[test]
    fn test_detect_kind_by_host() {
        assert_eq!(
            detect_kind("https://api.openai.com/v1/chat/completions"),
            ProviderKind::OpenAi
        );
        assert_eq!(
            detect_kind("https://API.ANTHROPIC.COM/v1/messages"),
            ProviderKind::Anthropic
        );
        assert_eq!(
            detect_kind("https://api.deepseek.com/chat/completions"),
            ProviderKind::DeepSeek
        );
        assert_eq!(detect_kind("http://localhost:11434/api/generate"), ProviderKind::Generic);
    }

    #[test]
    fn test_resolve_uses_spec_defaults() {
        let spec = find_by_kind(ProviderKind::OpenAi);
        let endpoint =
            resolve_endpoint(spec, &with_credential("k"), &RequestDefaults::default()).unwrap();

        assert_eq!(endpoint.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(endpoint.model, "gpt-3.5-turbo");
        assert_eq!(endpoint.auth_scheme, AuthScheme::Bearer);
        assert_eq!(endpoint.max_tokens, 500);
        assert_eq!(endpoint.temperature, 0.7);
    }

    #[test]
    fn test_resolve_config_overrides_defaults() {
        let spec = find_by_kind(ProviderKind::Anthropic);
        let config = ProviderConfig {
            credential: "k".into(),
            endpoint_url: Some("https://proxy.local/v1/messages".into()),
            model_id: Some("claude-3-5-haiku-20241022".into()),
            max_tokens: Some(64),
            temperature: Some(0.1),
            auth_scheme: Some(AuthScheme::Bearer),
        };
        let endpoint = resolve_endpoint(spec, &config, &RequestDefaults::default()).unwrap();

        assert_eq!(endpoint.url, "https://proxy.local/v1/messages");
        assert_eq!(endpoint.model, "claude-3-5-haiku-20241022");
        assert_eq!(endpoint.max_tokens, 64);
        assert_eq!(endpoint.temperature, 0.1);
        assert_eq!(endpoint.auth_scheme, AuthScheme::Bearer);
    }

    #[test]
    fn test_resolve_clamps_temperature_and_fixes_zero_tokens() {
        let spec = find_by_kind(ProviderKind::OpenAi);
        let config = ProviderConfig {
            credential: "k".into(),
            max_tokens: Some(0),
            temperature: Some(3.5),
            ..Default::default()
        };
        let endpoint = resolve_endpoint(spec, &config, &RequestDefaults::default()).unwrap();
        assert_eq!(endpoint.temperature, 2.0);
        assert_eq!(endpoint.max_tokens, 500);
    }

    #[test]
    fn test_resolve_generic_requires_url() {
        let spec = find_by_kind(ProviderKind::Generic);
        assert!(resolve_endpoint(spec, &with_credential("k"), &RequestDefaults::default()).is_none());
    }

    #[test]
    fn test_resolved_endpoint_debug_redacts() {
        let spec = find_by_kind(ProviderKind::OpenAi);
        let endpoint =
            resolve_endpoint(spec, &with_credential("sk-secret"), &RequestDefaults::default())
                .unwrap();
        assert!(!format!("{:?}", endpoint).contains("sk-secret"));
    }

    #[test]
    fn test_build_candidates_empty() {
        assert!(build_candidates(&Config::default()).is_empty());
    }

    #[test]
    fn test_build_candidates_order() {
        let mut config = Config::default();
        config.providers.deepseek.credential = "ds".into();
        config.providers.openai.credential = "oa".into();
        config.providers.custom.endpoint.endpoint_url = Some("http://localhost:9000/gen".into());

        let candidates = build_candidates(&config);
        let kinds: Vec<ProviderKind> = candidates.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ProviderKind::OpenAi, ProviderKind::DeepSeek, ProviderKind::Generic]
        );
        assert_eq!(candidates[2].label, "Custom (Generic)");
        assert_eq!(candidates[2].endpoint.url, "http://localhost:9000/gen");
    }

    #[test]
    fn test_build_candidates_skips_missing_credentials() {
        let mut config = Config::default();
        config.providers.anthropic.credential = "ant".into();

        let candidates = build_candidates(&config);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, ProviderKind::Anthropic);
    }

    #[test]
    fn test_custom_kind_detected_from_url() {
        let mut config = Config::default();
        config.providers.custom.endpoint.endpoint_url =
            Some("https://api.anthropic.com/v1/messages".into());
        config.providers.custom.endpoint.credential = "k".into();

        let candidates = build_candidates(&config);
        assert_eq!(candidates[0].kind, ProviderKind::Anthropic);
        assert_eq!(candidates[0].label, "Custom (Anthropic)");
        assert_eq!(candidates[0].endpoint.auth_scheme, AuthScheme::ApiKeyHeader);
    }

    #[test]
    fn test_custom_explicit_kind_wins() {
        let mut config = Config::default();
        config.providers.custom.kind = Some(ProviderKind::OpenAi);
        config.providers.custom.endpoint.endpoint_url = Some("http://localhost:1234/v1".into());

        let candidates = build_candidates(&config);
        assert_eq!(candidates[0].kind, ProviderKind::OpenAi);
        assert_eq!(candidates[0].endpoint.model, "gpt-3.5-turbo");
    }
}
