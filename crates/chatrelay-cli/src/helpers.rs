//! Shared CLI helpers — session setup, path expansion, message printing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use chatrelay_client::{ChatSession, ReplySource, SendOutcome};
use chatrelay_core::config::Config;
use chatrelay_core::formatting::format_message;
use chatrelay_core::{ChatMessage, ConnectionStatus, FileBlobStore, Sender};

/// Open a session over the file-backed blob store configured in `config`.
pub fn open_session(config: Config) -> Result<ChatSession> {
    let store_dir = config.storage.store_dir();
    let blobs = FileBlobStore::new(Some(store_dir.clone()))
        .with_context(|| format!("failed to open store: {}", store_dir.display()))?;
    Ok(ChatSession::open(config, Arc::new(blobs)))
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Message body as it should be printed.
pub fn render(text: &str, html: bool) -> String {
    if html {
        format_message(text)
    } else {
        text.to_string()
    }
}

/// Print one stored message with its sender and time.
pub fn print_message(message: &ChatMessage, html: bool) {
    let who = match message.sender() {
        Sender::User => "You".green().bold(),
        Sender::Bot => "Assistant".cyan().bold(),
    };
    println!("{} {}", who, message.timestamp().dimmed());
    println!("{}", render(message.text(), html));
    println!();
}

/// Print the reply produced by one send.
pub fn print_reply(outcome: &SendOutcome, html: bool) {
    println!();
    println!(
        "{} {}",
        "Assistant".cyan().bold(),
        outcome.reply.timestamp().dimmed()
    );
    println!("{}", render(outcome.reply.text(), html));
    match &outcome.source {
        ReplySource::Live { usage: Some(usage) } => println!(
            "{}",
            format!("({} tokens)", usage.total_tokens).dimmed()
        ),
        ReplySource::Live { usage: None } => {}
        ReplySource::Fallback { reason } => {
            println!("{}", format!("(fallback reply: {reason})").yellow())
        }
    }
    println!();
}

/// Colored status marker.
pub fn status_badge(status: ConnectionStatus) -> ColoredString {
    match status {
        ConnectionStatus::Checking => "●".blue(),
        ConnectionStatus::Connected => "●".green(),
        ConnectionStatus::Degraded => "●".yellow(),
        ConnectionStatus::Failed => "●".red(),
    }
}

/// Badge plus label, e.g. `● API Connected Successfully`.
pub fn status_line(status: ConnectionStatus) -> String {
    format!("{} {}", status_badge(status), status.label())
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Chatrelay".cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Type a message, /history, /status, /clear, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
