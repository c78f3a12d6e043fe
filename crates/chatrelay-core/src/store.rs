//! Conversation store — append-only in-memory log with blob persistence.
//!
//! Blob format (JSONL under [`CHAT_HISTORY_KEY`]):
//! - One line per message: `{"text":"hello","sender":"user","timestamp":"09:15 am"}`
//!
//! The log only grows, except on [`ConversationStore::clear`], which resets
//! it to the single seeded greeting.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::blob::{BlobStore, StoreError, CHAT_HISTORY_KEY};
use crate::types::ChatMessage;

/// The bot greeting every fresh conversation starts with.
pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

pub struct ConversationStore {
    messages: Vec<ChatMessage>,
    blobs: Arc<dyn BlobStore>,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("messages", &self.messages.len())
            .finish()
    }
}

impl ConversationStore {
    /// Create a store in its seeded state. Nothing is read from `blobs` yet.
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        ConversationStore {
            messages: seeded(),
            blobs,
        }
    }

    /// Append a message to the end of the log.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// All messages, oldest first.
    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Reset to the seeded greeting and drop the persisted blob.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.messages = seeded();
        self.blobs.remove(CHAT_HISTORY_KEY)?;
        debug!("Conversation cleared");
        Ok(())
    }

    /// Serialize the whole log and overwrite the persisted blob.
    pub fn persist(&self) -> Result<(), StoreError> {
        let mut blob = String::new();
        for message in &self.messages {
            blob.push_str(&serde_json::to_string(message)?);
            blob.push('\n');
        }
        self.blobs.set(CHAT_HISTORY_KEY, &blob)?;
        debug!("Persisted conversation ({} messages)", self.messages.len());
        Ok(())
    }

    /// Replace the log with the persisted one, if any.
    ///
    /// Unreadable lines are skipped. When no blob exists, or it holds no
    /// readable message, the store keeps its seeded state.
    pub fn restore(&mut self) -> Result<(), StoreError> {
        let Some(blob) = self.blobs.get(CHAT_HISTORY_KEY)? else {
            return Ok(());
        };

        let mut messages = Vec::new();
        for (idx, line) in blob.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ChatMessage>(line) {
                Ok(msg) => messages.push(msg),
                Err(e) => warn!("Skipping unreadable history line {}: {}", idx + 1, e),
            }
        }

        if messages.is_empty() {
            return Ok(());
        }

        debug!("Restored conversation with {} messages", messages.len());
        self.messages = messages;
        Ok(())
    }
}

fn seeded() -> Vec<ChatMessage> {
    vec![ChatMessage::bot(GREETING)]
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{FileBlobStore, MemoryBlobStore};
    use crate::types::Sender;
    use tempfile::tempdir;

    fn make_store() -> (ConversationStore, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        (ConversationStore::new(blobs.clone()), blobs)
    }

    #[test]
    fn test_new_store_is_seeded() {
        let (store, _) = make_store();
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].text(), GREETING);
        assert_eq!(store.all()[0].sender(), Sender::Bot);
    }

    #[test]
    fn test_append_preserves_order() {
        let (mut store, _) = make_store();
        store.append(ChatMessage::user("one"));
        store.append(ChatMessage::bot("two"));

        let texts: Vec<&str> = store.all().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec![GREETING, "one", "two"]);
    }

    #[test]
    fn test_clear_resets_to_greeting() {
        let (mut store, blobs) = make_store();
        store.append(ChatMessage::user("hello"));
        store.persist().unwrap();

        store.clear().unwrap();

        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].text(), GREETING);
        assert_eq!(blobs.get(CHAT_HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_persist_restore_round_trip() {
        let (mut store, blobs) = make_store();
        store.append(ChatMessage::with_timestamp("hi", Sender::User, "10:00 am"));
        store.append(ChatMessage::with_timestamp("hello!", Sender::Bot, "10:01 am"));
        store.persist().unwrap();

        let mut restored = ConversationStore::new(blobs);
        restored.restore().unwrap();

        assert_eq!(restored.all(), store.all());
    }

    #[test]
    fn test_restore_without_blob_keeps_seed() {
        let (mut store, _) = make_store();
        store.restore().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].text(), GREETING);
    }

    #[test]
    fn test_restore_skips_corrupt_lines() {
        let (mut store, blobs) = make_store();
        blobs
            .set(
                CHAT_HISTORY_KEY,
                "{\"text\":\"a\",\"sender\":\"user\",\"timestamp\":\"t\"}\nnot json\n\n{\"text\":\"b\",\"sender\":\"bot\",\"timestamp\":\"t\"}\n",
            )
            .unwrap();

        store.restore().unwrap();

        let texts: Vec<&str> = store.all().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_restore_all_corrupt_keeps_seed() {
        let (mut store, blobs) = make_store();
        blobs.set(CHAT_HISTORY_KEY, "garbage\nmore garbage").unwrap();
        store.restore().unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_blob_is_jsonl() {
        let (mut store, blobs) = make_store();
        store.append(ChatMessage::with_timestamp("test message", Sender::User, "t"));
        store.persist().unwrap();

        let blob = blobs.get(CHAT_HISTORY_KEY).unwrap().unwrap();
        let lines: Vec<&str> = blob.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        let msg: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(msg["sender"], "user");
        assert_eq!(msg["text"], "test message");
    }

    #[test]
    fn test_persistence_across_file_stores() {
        let dir = tempdir().unwrap();

        {
            let blobs = Arc::new(FileBlobStore::new(Some(dir.path().to_path_buf())).unwrap());
            let mut store = ConversationStore::new(blobs);
            store.append(ChatMessage::user("Hello"));
            store.append(ChatMessage::bot("Hi! How can I help?"));
            store.persist().unwrap();
        }

        {
            let blobs = Arc::new(FileBlobStore::new(Some(dir.path().to_path_buf())).unwrap());
            let mut store = ConversationStore::new(blobs);
            store.restore().unwrap();
            assert_eq!(store.len(), 3);
            assert_eq!(store.all()[2].text(), "Hi! How can I help?");
        }
    }
}
