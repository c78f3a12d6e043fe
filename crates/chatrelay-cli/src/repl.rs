//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tokio::sync::watch;
use tracing::{debug, warn};

use chatrelay_client::ChatSession;
use chatrelay_core::ConnectionStatus;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// One line of REPL input.
#[derive(Debug, PartialEq)]
enum ReplInput<'a> {
    Exit,
    Clear,
    Status,
    History,
    Message(&'a str),
}

fn parse_input(input: &str) -> Option<ReplInput<'_>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if is_exit_command(trimmed) {
        return Some(ReplInput::Exit);
    }
    Some(match trimmed.to_lowercase().as_str() {
        "/clear" => ReplInput::Clear,
        "/status" => ReplInput::Status,
        "/history" => ReplInput::History,
        _ => ReplInput::Message(trimmed),
    })
}

/// Run the interactive REPL loop.
pub async fn run(mut session: ChatSession, html: bool) -> Result<()> {
    helpers::print_banner();

    // The startup check runs in the background; results print as they land.
    let watcher = tokio::spawn(print_status_changes(session.subscribe_status()));
    let _ = session.start_connection_check();

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let Some(command) = parse_input(&input) else {
            continue;
        };
        let _ = editor.add_history_entry(input.as_str());

        match command {
            ReplInput::Exit => {
                println!("\nGoodbye!");
                break;
            }
            ReplInput::Clear => match session.clear() {
                Ok(()) => println!("{}\n", "Conversation cleared.".dimmed()),
                Err(e) => eprintln!("\nError: {e}\n"),
            },
            ReplInput::Status => {
                println!("  {}\n", helpers::status_line(session.status()));
                let _ = session.start_connection_check();
            }
            ReplInput::History => {
                println!();
                for message in session.messages() {
                    helpers::print_message(message, html);
                }
            }
            ReplInput::Message(text) => {
                debug!(input = text, "processing input");
                helpers::print_thinking();
                let outcome = session.send_message(text).await;
                helpers::clear_thinking();
                if let Some(outcome) = outcome {
                    helpers::print_reply(&outcome, html);
                }
            }
        }
    }

    watcher.abort();
    save_history(&mut editor);
    Ok(())
}

/// Print every settled status until the sender goes away.
async fn print_status_changes(mut rx: watch::Receiver<ConnectionStatus>) {
    while rx.changed().await.is_ok() {
        if let Some(line) = settled_line(*rx.borrow_and_update()) {
            println!("\n  {line}\n");
        }
    }
}

fn settled_line(status: ConnectionStatus) -> Option<String> {
    match status {
        ConnectionStatus::Checking => None,
        settled => Some(helpers::status_line(settled)),
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        warn!("failed to save history: {e}");
    }
}

/// `~/.chatrelay/history/cli_history`
fn history_path() -> std::path::PathBuf {
    chatrelay_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
