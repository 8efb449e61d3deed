//! CLI module for the astronotes application
//!
//! This module handles the command-line interface for interacting with the
//! note stores, the settings, and the chat assistant.

use std::{
    io::{stdin, stdout, Write},
    sync::Arc,
};

use log::info;

use crate::{
    Background, ChatHistory, ChatSession, Commands, Config, FileStore, KeyValueStore,
    MessageAction, NotePatch, NoteStore, OpenAiClient, Result, Settings,
};

/// CLI Application handler - processes CLI commands against the stores
pub struct App {
    notes: NoteStore,
    chat: ChatSession<OpenAiClient>,
    settings: Settings,
}

impl App {
    /// Create a new CLI application backed by the configured data directory
    pub fn new(config: &Config) -> Result<Self> {
        let store = Arc::new(FileStore::new(&config.data_dir)?) as Arc<dyn KeyValueStore>;
        let client = OpenAiClient::new(config.request_timeout())?;

        Ok(Self {
            notes: NoteStore::open(store.clone()),
            chat: ChatSession::new(
                ChatHistory::open(store.clone()),
                Settings::new(store.clone()),
                client,
            ),
            settings: Settings::new(store),
        })
    }

    /// Run the CLI application with the given command
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Add { title, content, tag } => self.add_note(title, content, tag)?,

            Commands::List { json } => self.list_notes(json)?,

            Commands::View { id, json } => self.view_note(&id, json)?,

            Commands::Edit {
                id,
                title,
                content,
                tag,
            } => self.edit_note(&id, title, content, tag)?,

            Commands::Delete { id } => self.delete_note(&id)?,

            Commands::Search { query, limit } => self.search_notes(&query, limit),

            Commands::Chat { message } => self.chat(&message).await,

            Commands::History => self.show_history(),

            Commands::ClearChat => {
                self.chat.clear()?;
                println!("Chat history cleared");
            }

            Commands::SetKey { key } => {
                self.settings.set_api_key(&key)?;
                println!("API key stored");
            }

            Commands::ClearKey => {
                self.settings.clear_api_key()?;
                println!("API key removed");
            }

            Commands::Background { id } => self.background(id)?,
        }

        Ok(())
    }

    fn add_note(&mut self, title: String, content: String, tag: Option<String>) -> Result<()> {
        let note = self.notes.add(title, content, tag)?;
        println!("Note created with ID: {}", note.id);
        Ok(())
    }

    fn list_notes(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self.notes.list())?);
            return Ok(());
        }

        if self.notes.list().is_empty() {
            println!("No notes yet");
            return Ok(());
        }

        for note in self.notes.list() {
            match &note.tag {
                Some(tag) => println!(
                    "{}  {} [{}]  (updated {})",
                    note.id,
                    note.display_title(),
                    tag,
                    note.updated_at.format("%Y-%m-%d %H:%M")
                ),
                None => println!(
                    "{}  {}  (updated {})",
                    note.id,
                    note.display_title(),
                    note.updated_at.format("%Y-%m-%d %H:%M")
                ),
            }
        }
        Ok(())
    }

    fn view_note(&self, id: &str, json: bool) -> Result<()> {
        let Some(note) = self.notes.get(id) else {
            println!("Note not found: {}", id);
            return Ok(());
        };

        if json {
            println!("{}", serde_json::to_string_pretty(note)?);
        } else {
            println!("{}", note.display_title());
            if let Some(tag) = &note.tag {
                println!("Tag: {}", tag);
            }
            println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M"));
            println!("Updated: {}", note.updated_at.format("%Y-%m-%d %H:%M"));
            println!();
            println!("{}", note.content);
        }
        Ok(())
    }

    fn edit_note(
        &mut self,
        id: &str,
        title: Option<String>,
        content: Option<String>,
        tag: Option<String>,
    ) -> Result<()> {
        if self.notes.get(id).is_none() {
            println!("Note not found: {}", id);
            return Ok(());
        }

        self.notes.update(id, NotePatch { title, content, tag })?;
        println!("Note updated: {}", id);
        Ok(())
    }

    fn delete_note(&mut self, id: &str) -> Result<()> {
        if self.notes.get(id).is_none() {
            println!("Note not found: {}", id);
            return Ok(());
        }

        self.notes.delete(id)?;
        println!("Note deleted: {}", id);
        Ok(())
    }

    fn search_notes(&self, query: &str, limit: usize) {
        let matches = self.notes.search(query);
        if matches.is_empty() {
            println!("No notes matched '{}'", query);
            return;
        }

        for note in matches.into_iter().take(limit) {
            println!("{}  {}", note.id, note.display_title());
        }
    }

    /// Runs one send cycle, printing everything the assistant appended.
    /// When a connectivity failure leaves a retry affordance, offers to
    /// activate it.
    async fn chat(&mut self, message: &str) {
        let before = self.chat.messages().len();
        self.chat.send(message).await;
        self.print_appended(before);

        while self.chat.can_retry() && confirm("Retry now?") {
            info!("Retry affordance activated");
            let before = self.chat.messages().len();
            self.chat.retry().await;
            self.print_appended(before);
        }
    }

    fn print_appended(&self, from: usize) {
        for message in &self.chat.messages()[from..] {
            print_message(message);
        }
    }

    fn show_history(&self) {
        if self.chat.messages().is_empty() {
            println!("No chat history");
            return;
        }
        for message in self.chat.messages() {
            print_message(message);
        }
    }

    fn background(&self, id: Option<String>) -> Result<()> {
        match id {
            Some(id) => match Background::from_id(&id) {
                Some(background) => {
                    self.settings.set_background(background)?;
                    println!("Background image updated");
                }
                None => {
                    let known: Vec<&str> = Background::ALL.iter().map(|bg| bg.id()).collect();
                    println!("Unknown background '{}'. Known: {}", id, known.join(", "));
                }
            },
            None => {
                let current = self.settings.background();
                for bg in Background::ALL {
                    let marker = if bg == current { "*" } else { " " };
                    println!("{} {}  {}", marker, bg.id(), bg.name());
                }
            }
        }
        Ok(())
    }
}

fn print_message(message: &crate::Message) {
    let speaker = if message.is_user { "you" } else { "assistant" };
    match message.action {
        MessageAction::None => println!("{}: {}", speaker, message.text),
        MessageAction::Retry | MessageAction::OpenSettings => {
            println!("{}: [{}]", speaker, message.text)
        }
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
