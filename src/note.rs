//! Core note data structures for the astronotes application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a single note in our system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Note title, may be empty ("Untitled Note" in display contexts)
    pub title: String,
    /// Note content body
    pub content: String,
    /// Optional free-text label
    pub tag: Option<String>,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a new note with the given title and content.
    ///
    /// The caller supplies a millisecond timestamp that is unique within the
    /// owning store; the id combines it with a slug of the title.
    pub fn new(millis: i64, title: String, content: String, tag: Option<String>) -> Self {
        let now = Utc::now();
        let slug = title.to_lowercase().replace(' ', "-");
        let id = if slug.is_empty() {
            millis.to_string()
        } else {
            format!("{}-{}", millis, slug)
        };

        Note {
            id,
            title,
            content,
            tag,
            created_at: now,
            updated_at: now,
        }
    }

    /// Title for display contexts, falling back for untitled notes.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled Note"
        } else {
            &self.title
        }
    }
}

/// A partial update to a note; only supplied fields are merged.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tag: Option<String>,
}

impl NotePatch {
    /// Applies the supplied fields to the note. `updated_at` is refreshed by
    /// the store, not here.
    pub(crate) fn apply(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(tag) = self.tag {
            note.tag = Some(tag);
        }
    }
}
