//! Note-taking application library with an AI chat assistant.
//!
//! This library provides the persistence core of the application: the note
//! collection, the chat history, the preference scalars, and the chat
//! request/response cycle against the OpenAI chat-completions API.

mod chat;
mod chat_history;
mod cli;
mod config;
mod errors;
mod helper;
mod message;
mod note;
mod note_store;
mod settings;
mod storage;
mod types;

// Re-export key components
pub use chat::*;
pub use chat_history::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use message::*;
pub use note::*;
pub use note_store::*;
pub use settings::*;
pub use storage::*;
pub use types::*;
