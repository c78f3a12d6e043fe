//! Config loader — reads `~/.chatrelay/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.chatrelay/config.json`
//! 3. Environment variables `CHATRELAY_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ConfigError, ProviderConfig};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    migrate_config(&mut raw);

    let config: Config = match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<(), ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Moves a top-level `apiKey` / `apiUrl` pair (the old single-endpoint
/// settings shape) into `providers.custom`.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(root) = raw.as_object_mut() else {
        return;
    };

    let api_key = root.remove("apiKey");
    let api_url = root.remove("apiUrl");
    if api_key.is_none() && api_url.is_none() {
        return;
    }

    let providers = root
        .entry("providers")
        .or_insert_with(|| serde_json::json!({}));
    let Some(providers) = providers.as_object_mut() else {
        return;
    };
    let custom = providers
        .entry("custom")
        .or_insert_with(|| serde_json::json!({}));
    let Some(custom) = custom.as_object_mut() else {
        return;
    };

    if let Some(key) = api_key {
        custom.entry("credential").or_insert(key);
    }
    if let Some(url) = api_url.filter(|u| !u.is_null()) {
        custom.entry("endpointUrl").or_insert(url);
    }
    debug!("Migrated apiKey/apiUrl → providers.custom");
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `CHATRELAY_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `CHATRELAY_PROVIDERS__<NAME>__CREDENTIAL` → `providers.<name>.credential`
/// - `CHATRELAY_PROVIDERS__<NAME>__ENDPOINT_URL` → `providers.<name>.endpoint_url`
/// - `CHATRELAY_PROVIDERS__<NAME>__MODEL_ID` → `providers.<name>.model_id`
/// - `CHATRELAY_REQUEST__MAX_TOKENS` → `request.max_tokens`
/// - `CHATRELAY_REQUEST__TEMPERATURE` → `request.temperature`
/// - `CHATRELAY_REQUEST__TIMEOUT_SECS` → `request.timeout_secs`
/// - `CHATRELAY_STORAGE__DATA_DIR` → `storage.data_dir`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from any `CHATRELAY_*` variable source.
fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    apply_provider_env(&mut config.providers.openai, "OPENAI", &var);
    apply_provider_env(&mut config.providers.anthropic, "ANTHROPIC", &var);
    apply_provider_env(&mut config.providers.deepseek, "DEEPSEEK", &var);
    apply_provider_env(&mut config.providers.custom.endpoint, "CUSTOM", &var);

    if let Some(n) = var("CHATRELAY_REQUEST__MAX_TOKENS").and_then(|v| v.parse::<u32>().ok()) {
        config.request.max_tokens = n;
    }
    if let Some(t) = var("CHATRELAY_REQUEST__TEMPERATURE").and_then(|v| v.parse::<f64>().ok()) {
        config.request.temperature = t;
    }
    if let Some(s) = var("CHATRELAY_REQUEST__TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
        config.request.timeout_secs = s;
    }

    if let Some(val) = var("CHATRELAY_STORAGE__DATA_DIR") {
        config.storage.data_dir = Some(val);
    }

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env(
    provider: &mut ProviderConfig,
    name: &str,
    var: &impl Fn(&str) -> Option<String>,
) {
    if let Some(val) = var(&format!("CHATRELAY_PROVIDERS__{name}__CREDENTIAL")) {
        provider.credential = val;
    }
    if let Some(val) = var(&format!("CHATRELAY_PROVIDERS__{name}__ENDPOINT_URL")) {
        provider.endpoint_url = Some(val);
    }
    if let Some(val) = var(&format!("CHATRELAY_PROVIDERS__{name}__MODEL_ID")) {
        provider.model_id = Some(val);
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
