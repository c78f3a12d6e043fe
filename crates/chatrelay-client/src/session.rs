//! Chat session — the send flow.
//!
//! A `ChatSession` owns the conversation store, the dispatcher built from the
//! current configuration, and the latest `ConnectionStatus`. Every mutating
//! operation takes `&mut self`, so sends, saves and clears never interleave.
//! Connection checks can also run in the background and publish through the
//! status channel while sends continue.
//!
//! ```text
//! user text → Dispatcher::send → Success ─────────────┐
//!                              └ Failure → fallback ──┴→ append user + bot → persist
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use chatrelay_core::blob::API_CONFIG_KEY;
use chatrelay_core::config::{ApiConfig, Config, ConfigError};
use chatrelay_core::fallback;
use chatrelay_core::{
    BlobStore, ChatMessage, ConnectionStatus, ConversationStore, DispatchResult, StoreError, Usage,
};
use chatrelay_providers::{DispatchError, Dispatcher};

use crate::probe::probe;

/// Errors surfaced by session operations that the caller must act on.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where a bot reply came from.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplySource {
    /// A provider answered.
    Live { usage: Option<Usage> },
    /// Every endpoint failed; the reply is canned.
    Fallback { reason: String },
}

/// The bot message appended by one send, and its origin.
#[derive(Clone, Debug, PartialEq)]
pub struct SendOutcome {
    pub reply: ChatMessage,
    pub source: ReplySource,
}

pub struct ChatSession {
    /// Configuration before any saved `ApiConfig` is merged in.
    base_config: Config,
    /// Effective configuration the dispatcher was built from.
    config: Config,
    blobs: Arc<dyn BlobStore>,
    store: ConversationStore,
    /// `None` when the HTTP client could not be built.
    dispatcher: Option<Arc<Dispatcher>>,
    status: Arc<watch::Sender<ConnectionStatus>>,
    /// Bumped by every connection check; only the latest one may publish.
    check_generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("store", &self.store)
            .field("dispatcher", &self.dispatcher)
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    /// Restore history, merge the saved `ApiConfig`, and build the dispatcher.
    ///
    /// The status starts at `Checking`; call [`check_connection`](Self::check_connection)
    /// or [`start_connection_check`](Self::start_connection_check) to run the
    /// startup probe.
    pub fn open(config: Config, blobs: Arc<dyn BlobStore>) -> Self {
        let mut store = ConversationStore::new(Arc::clone(&blobs));
        if let Err(e) = store.restore() {
            warn!("Failed to restore conversation: {}", e);
        }

        let mut effective = config.clone();
        if let Some(api_config) = load_api_config(blobs.as_ref()) {
            api_config.apply(&mut effective);
        }

        let (status, _) = watch::channel(ConnectionStatus::Checking);
        let dispatcher = build_dispatcher(&effective);
        if dispatcher.is_none() {
            status.send_replace(ConnectionStatus::Failed);
        }

        ChatSession {
            base_config: config,
            config: effective,
            blobs,
            store,
            dispatcher,
            status: Arc::new(status),
            check_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Send one user message and append the reply.
    ///
    /// Returns `None` (and appends nothing) if `text` is blank.
    pub async fn send_message(&mut self, text: &str) -> Option<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let user = ChatMessage::user(text);

        let result = match &self.dispatcher {
            Some(dispatcher) => dispatcher.send(text).await,
            None => DispatchResult::failure(DispatchError::NoCandidates.to_string()),
        };

        let (reply_text, source) = match result {
            DispatchResult::Success { message, usage } => (message, ReplySource::Live { usage }),
            DispatchResult::Failure { reason } => {
                debug!(%reason, "Using fallback reply");
                (fallback::respond(text), ReplySource::Fallback { reason })
            }
        };

        // Both messages land together so a dropped send leaves no orphan.
        let reply = ChatMessage::bot(reply_text);
        self.store.append(user);
        self.store.append(reply.clone());
        if let Err(e) = self.store.persist() {
            warn!("Failed to persist conversation: {}", e);
        }

        Some(SendOutcome { reply, source })
    }

    /// Validate and persist new API settings, rebuild the dispatcher, reprobe.
    pub async fn save_api_config(
        &mut self,
        api_config: ApiConfig,
    ) -> Result<ConnectionStatus, SessionError> {
        api_config.validate()?;

        let blob = serde_json::to_string(&api_config).map_err(StoreError::from)?;
        self.blobs.set(API_CONFIG_KEY, &blob)?;
        info!(?api_config, "API configuration saved");

        let mut effective = self.base_config.clone();
        api_config.apply(&mut effective);
        self.dispatcher = build_dispatcher(&effective);
        self.config = effective;
        // Supersedes any in-flight check against the old dispatcher.

        Ok(self.check_connection().await)
    }

    /// Run the connection probe and publish the result.
    pub async fn check_connection(&mut self) -> ConnectionStatus {
        let generation = self.next_generation();
        let Some(dispatcher) = &self.dispatcher else {
            self.set_status(ConnectionStatus::Failed);
            return ConnectionStatus::Failed;
        };

        self.set_status(ConnectionStatus::Checking);
        let status = probe(dispatcher).await;
        if self.check_generation.load(Ordering::SeqCst) == generation {
            self.set_status(status);
        }
        status
    }

    /// Start the connection probe on a background task.
    ///
    /// The status becomes `Checking` immediately and the result is published
    /// through the status channel, unless a newer check or a config save has
    /// started in the meantime. The session stays usable while it runs.
    pub fn start_connection_check(&self) -> JoinHandle<ConnectionStatus> {
        let generation = self.next_generation();
        let Some(dispatcher) = self.dispatcher.clone() else {
            self.set_status(ConnectionStatus::Failed);
            return tokio::spawn(async { ConnectionStatus::Failed });
        };

        self.set_status(ConnectionStatus::Checking);
        let sender = Arc::clone(&self.status);
        let latest = Arc::clone(&self.check_generation);
        tokio::spawn(async move {
            let status = probe(&dispatcher).await;
            if latest.load(Ordering::SeqCst) == generation {
                publish(&sender, status);
            } else {
                debug!(?status, "Discarding superseded connection check");
            }
            status
        })
    }

    /// Reset the conversation to the greeting and drop the persisted log.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.clear()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.store.all()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Observe status changes. Only the latest value is kept.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// The effective configuration, saved settings included.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatcher(&self) -> Option<&Dispatcher> {
        self.dispatcher.as_deref()
    }

    fn next_generation(&self) -> u64 {
        self.check_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn set_status(&self, status: ConnectionStatus) {
        publish(&self.status, status);
    }
}

fn publish(sender: &watch::Sender<ConnectionStatus>, status: ConnectionStatus) {
    let previous = sender.send_replace(status);
    if previous != status {
        info!("Connection status: {} → {}", previous, status);
    }
}

fn build_dispatcher(config: &Config) -> Option<Arc<Dispatcher>> {
    match Dispatcher::from_config(config) {
        Ok(dispatcher) => Some(Arc::new(dispatcher)),
        Err(e) => {
            warn!("Failed to build dispatcher: {}", e);
            None
        }
    }
}

fn load_api_config(blobs: &dyn BlobStore) -> Option<ApiConfig> {
    let blob = match blobs.get(API_CONFIG_KEY) {
        Ok(blob) => blob?,
        Err(e) => {
            warn!("Failed to read saved API config: {}", e);
            return None;
        }
    };
    match serde_json::from_str(&blob) {
        Ok(api_config) => Some(api_config),
        Err(e) => {
            warn!("Ignoring unreadable API config: {}", e);
            None
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
