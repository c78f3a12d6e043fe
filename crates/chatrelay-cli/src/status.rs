//! `chatrelay status` — show configuration, candidate order and a live probe.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use chatrelay_core::config::{get_config_path, Config, ProviderConfig};
use chatrelay_core::ProviderKind;
use chatrelay_providers::registry::find_by_kind;

use crate::helpers;

/// Run the status command.
pub async fn run(config: Config, config_path: Option<&Path>) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "Chatrelay Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );
    println!(
        "  {:<18} {}",
        "Store:".bold(),
        config.storage.store_dir().display()
    );
    println!(
        "  {:<18} {} | max_tokens: {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", config.request.temperature).dimmed(),
        config.request.max_tokens.to_string().dimmed(),
        config.request.timeout_secs.to_string().dimmed(),
    );

    let mut session = helpers::open_session(config)?;

    // Providers (saved API settings included)
    println!();
    println!("  {}", "Providers:".bold());
    let providers = &session.config().providers;
    for kind in ProviderKind::BUILT_IN {
        let spec = find_by_kind(kind);
        let line = providers
            .get(kind)
            .map(provider_line)
            .unwrap_or_else(|| "· not configured".dimmed().to_string());
        println!("    {:<20} {}", spec.display_name, line);
    }
    let custom = match providers.custom.endpoint.endpoint_url.as_deref() {
        Some(url) if providers.custom.is_configured() => format!("{} {}", "✓".green(), url),
        _ => "· not configured".dimmed().to_string(),
    };
    println!("    {:<20} {}", "Custom endpoint", custom);

    // Attempt order
    println!();
    if !providers.any_configured() {
        println!(
            "  {:<18} {}",
            "Attempt order:".bold(),
            "(none, replies will use fallback mode)".dimmed()
        );
    } else if let Some(dispatcher) = session.dispatcher() {
        let order: Vec<&str> = dispatcher
            .candidates()
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        println!("  {:<18} {}", "Attempt order:".bold(), order.join(" → "));
    }

    let status = session.check_connection().await;
    println!("  {:<18} {}", "Connection:".bold(), helpers::status_line(status));
    println!();

    Ok(())
}

fn provider_line(provider: &ProviderConfig) -> String {
    if !provider.is_configured() {
        return "· not configured".dimmed().to_string();
    }
    match provider.model_id.as_deref() {
        Some(model) => format!("{} (key set, model {})", "✓".green(), model),
        None => format!("{} (key set)", "✓".green()),
    }
}
