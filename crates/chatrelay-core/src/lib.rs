//! Chatrelay core — data model, configuration, persistence, fallback replies
//! and message formatting.
//!
//! # Architecture
//!
//! - [`types`] — `ChatMessage`, `ProviderKind`, `DispatchResult`, `ConnectionStatus`
//! - [`config`] — typed config schema + JSON/env loader
//! - [`blob`] — key → blob storage (file-backed or in-memory)
//! - [`store`] — the append-only `ConversationStore`
//! - [`fallback`] — keyword-matched canned replies
//! - [`formatting`] — message text → escaped HTML

pub mod blob;
pub mod config;
pub mod fallback;
pub mod formatting;
pub mod store;
pub mod types;
pub mod utils;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore, StoreError};
pub use store::ConversationStore;
pub use types::{ChatMessage, ConnectionStatus, DispatchResult, ProviderKind, Sender, Usage};
