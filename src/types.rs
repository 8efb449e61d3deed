//! Shared types for the astronotes application.

use clap::Subcommand;

use crate::AstroError;

/// A specialized Result type for astronotes operations.
pub type Result<T> = std::result::Result<T, AstroError>;

/// Available subcommands for the astronotes application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    Add {
        /// Title of the note
        #[clap(short = 'T', long, default_value = "")]
        title: String,

        /// Content of the note
        #[clap(short, long, default_value = "")]
        content: String,

        /// Tag to associate with the note
        #[clap(short, long)]
        tag: Option<String>,
    },

    /// List all notes in insertion order
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// View a note by ID
    View {
        /// ID of the note to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// New tag for the note
        #[clap(short, long)]
        tag: Option<String>,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,
    },

    /// Search notes by title or content
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Send a message to the AI assistant
    Chat {
        /// The message to send
        message: String,
    },

    /// Show the chat history
    History,

    /// Clear the chat history
    ClearChat,

    /// Store the OpenAI API key
    SetKey {
        /// The API key to store
        key: String,
    },

    /// Remove the stored OpenAI API key
    ClearKey,

    /// Show or change the background selection
    Background {
        /// Background identifier to select; omit to list the options
        id: Option<String>,
    },
}

/// The closed set of background images the settings screen can choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    Space,
    Space1,
    Space2,
    Space3,
}

impl Background {
    /// All known backgrounds, in display order.
    pub const ALL: [Background; 4] = [
        Background::Space,
        Background::Space1,
        Background::Space2,
        Background::Space3,
    ];

    /// The persisted identifier for this background.
    pub fn id(&self) -> &'static str {
        match self {
            Background::Space => "space",
            Background::Space1 => "space1",
            Background::Space2 => "space2",
            Background::Space3 => "space3",
        }
    }

    /// Human-readable name shown in the settings list.
    pub fn name(&self) -> &'static str {
        match self {
            Background::Space => "Space",
            Background::Space1 => "Space 1",
            Background::Space2 => "Space 2",
            Background::Space3 => "Space 3",
        }
    }

    /// Resolves a persisted identifier; unknown ids are rejected so a stale
    /// value in storage falls back to the default at the call site.
    pub fn from_id(id: &str) -> Option<Background> {
        Background::ALL.into_iter().find(|bg| bg.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::Background;

    #[test]
    fn background_ids_round_trip() {
        for bg in Background::ALL {
            assert_eq!(Background::from_id(bg.id()), Some(bg));
        }
    }

    #[test]
    fn unknown_background_id_is_rejected() {
        assert_eq!(Background::from_id("nebula"), None);
        assert_eq!(Background::from_id(""), None);
    }
}
