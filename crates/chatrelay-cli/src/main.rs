//! Chatrelay CLI — entry point.
//!
//! # Commands
//!
//! - `chatrelay chat [-m MESSAGE]` — one-shot send or interactive REPL
//! - `chatrelay status` — configuration, candidate order and a live probe
//! - `chatrelay config --credential KEY [--endpoint URL]` — save API settings
//! - `chatrelay history` — print the stored conversation
//! - `chatrelay clear` — reset the conversation

mod helpers;
mod repl;
mod status;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use chatrelay_core::config::{load_config, ApiConfig, Config};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Chatrelay — terminal chat client for LLM HTTP APIs
#[derive(Parser)]
#[command(name = "chatrelay", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.chatrelay/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Print replies as HTML
        #[arg(long, default_value_t = false)]
        html: bool,
    },

    /// Show configuration, candidate order and connection status
    Status,

    /// Save the API credential and optional custom endpoint
    Config {
        /// API key used for every endpoint without its own
        #[arg(long)]
        credential: String,

        /// Custom endpoint URL, tried after the built-in providers
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Print the stored conversation
    History {
        /// Print messages as HTML
        #[arg(long, default_value_t = false)]
        html: bool,
    },

    /// Reset the conversation to the greeting
    Clear,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(helpers::expand_tilde);

    match cli.command {
        Commands::Chat {
            message,
            logs,
            html,
        } => {
            init_logging(logs);
            run_chat(load_config(config_path.as_deref()), message, html).await
        }
        Commands::Status => {
            init_logging(false);
            status::run(load_config(config_path.as_deref()), config_path.as_deref()).await
        }
        Commands::Config {
            credential,
            endpoint,
        } => {
            init_logging(false);
            run_config(load_config(config_path.as_deref()), credential, endpoint).await
        }
        Commands::History { html } => {
            init_logging(false);
            run_history(load_config(config_path.as_deref()), html)
        }
        Commands::Clear => {
            init_logging(false);
            run_clear(load_config(config_path.as_deref()))
        }
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_chat(config: Config, message: Option<String>, html: bool) -> Result<()> {
    let mut session = helpers::open_session(config)?;

    match message {
        Some(msg) => {
            info!("processing single message");
            match session.send_message(&msg).await {
                Some(outcome) => helpers::print_reply(&outcome, html),
                None => eprintln!("{}", "Nothing to send.".dimmed()),
            }
        }
        None => repl::run(session, html).await?,
    }

    Ok(())
}

async fn run_config(config: Config, credential: String, endpoint: Option<String>) -> Result<()> {
    let mut session = helpers::open_session(config)?;
    let status = session
        .save_api_config(ApiConfig::new(credential, endpoint))
        .await
        .context("failed to save API configuration")?;

    println!();
    println!("  {} API configuration saved", "✓".green());
    println!("  {}", helpers::status_line(status));
    println!();
    Ok(())
}

fn run_history(config: Config, html: bool) -> Result<()> {
    let session = helpers::open_session(config)?;
    println!();
    for message in session.messages() {
        helpers::print_message(message, html);
    }
    println!();
    Ok(())
}

fn run_clear(config: Config) -> Result<()> {
    let mut session = helpers::open_session(config)?;
    session.clear().context("failed to clear conversation")?;
    println!("{}", "Conversation cleared.".dimmed());
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("chatrelay=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
