//! Manages the persisted chat conversation.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    next_unique_millis, storage::KEY_CHAT_HISTORY, KeyValueStore, Message, Result,
};

/// The ordered message sequence for the single assistant conversation.
///
/// The sequence is loaded once when the chat surface opens and rewritten in
/// full on every append. Past messages are never edited or reordered.
pub struct ChatHistory {
    store: Arc<dyn KeyValueStore>,
    messages: Vec<Message>,
    last_id_millis: i64,
}

impl ChatHistory {
    /// Opens the history, loading any persisted messages. Missing or corrupt
    /// state is logged and treated as an empty sequence.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let messages = match store.get(KEY_CHAT_HISTORY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Message>>(&raw) {
                Ok(messages) => {
                    info!("Loaded {} chat messages", messages.len());
                    messages
                }
                Err(e) => {
                    warn!("Failed to parse chat history, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No persisted chat history found");
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read chat history, starting empty: {}", e);
                Vec::new()
            }
        };

        let last_id_millis = messages
            .iter()
            .filter_map(|m| m.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            store,
            messages,
            last_id_millis,
        }
    }

    /// The full sequence in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Assigns the next generator id for a message.
    pub fn next_id(&mut self) -> String {
        next_unique_millis(&mut self.last_id_millis).to_string()
    }

    /// Appends a message and rewrites the persisted sequence.
    pub fn append(&mut self, message: Message) -> Result<()> {
        self.messages.push(message);
        self.persist()
    }

    /// Appends a user-authored message, assigning its id.
    pub fn push_user(&mut self, text: String) -> Result<()> {
        let id = self.next_id();
        self.append(Message::user(id, text))
    }

    /// Appends an assistant-authored message, assigning its id.
    pub fn push_assistant(&mut self, text: String) -> Result<()> {
        let id = self.next_id();
        self.append(Message::assistant(id, text))
    }

    /// Empties both the in-memory sequence and the persisted storage.
    pub fn clear(&mut self) -> Result<()> {
        info!("Clearing chat history ({} messages)", self.messages.len());
        self.messages.clear();
        self.store.remove(KEY_CHAT_HISTORY)
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.messages)?;
        self.store.set(KEY_CHAT_HISTORY, &json)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{MemoryStore, Message, MessageAction};

    use super::*;

    fn history() -> (Arc<MemoryStore>, ChatHistory) {
        let kv = Arc::new(MemoryStore::new());
        let history = ChatHistory::open(kv.clone() as Arc<dyn KeyValueStore>);
        (kv, history)
    }

    #[test]
    fn append_preserves_prior_order() {
        let (_, mut history) = history();
        history.push_user("hello".into()).expect("append should succeed");
        history
            .push_assistant("hi there".into())
            .expect("append should succeed");
        history.push_user("how are you".into()).expect("append should succeed");

        let texts: Vec<&str> = history.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "hi there", "how are you"]);
        assert!(history.messages()[0].is_user);
        assert!(!history.messages()[1].is_user);
    }

    #[test]
    fn message_ids_are_unique() {
        let (_, mut history) = history();
        for i in 0..30 {
            history.push_user(format!("msg {}", i)).expect("append should succeed");
        }
        let mut ids: Vec<&str> = history.messages().iter().map(|m| m.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 30);
    }

    #[test]
    fn sequence_survives_reopen() {
        let kv = Arc::new(MemoryStore::new());
        {
            let mut history = ChatHistory::open(kv.clone() as Arc<dyn KeyValueStore>);
            history.push_user("hello".into()).expect("append should succeed");
            let id = history.next_id();
            history
                .append(Message::affordance(id, "Retry".into(), MessageAction::Retry))
                .expect("append should succeed");
        }

        let reopened = ChatHistory::open(kv as Arc<dyn KeyValueStore>);
        assert_eq!(reopened.messages().len(), 2);
        assert_eq!(reopened.messages()[1].action, MessageAction::Retry);
    }

    #[test]
    fn clear_yields_empty_sequence_on_next_load() {
        let (kv, mut history) = history();
        history.push_user("hello".into()).expect("append should succeed");
        history.clear().expect("clear should succeed");
        assert!(history.messages().is_empty());

        let reopened = ChatHistory::open(kv as Arc<dyn KeyValueStore>);
        assert!(reopened.messages().is_empty());
    }

    #[test]
    fn open_survives_corrupt_history() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(KEY_CHAT_HISTORY, "[{broken").expect("set should succeed");
        let history = ChatHistory::open(kv as Arc<dyn KeyValueStore>);
        assert!(history.messages().is_empty());
    }
}
