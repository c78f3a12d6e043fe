//! Chatrelay client — the chat session and its connection probe.

pub mod probe;
pub mod session;

pub use probe::{probe, CANARY};
pub use session::{ChatSession, ReplySource, SendOutcome, SessionError};
