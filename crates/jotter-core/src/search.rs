//! Ad hoc note search
//!
//! Case-insensitive substring matching over title and content. The query is
//! matched literally; an empty query matches every note.

use crate::models::Note;

/// A normalized search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }

    /// True when the query matches everything
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Check whether `note`'s title or content contains the query
    pub fn matches(&self, note: &Note) -> bool {
        self.is_empty()
            || note.title.to_lowercase().contains(&self.needle)
            || note.content.to_lowercase().contains(&self.needle)
    }

    /// Keep only matching notes, preserving their order
    pub fn filter(&self, notes: Vec<Note>) -> Vec<Note> {
        if self.is_empty() {
            return notes;
        }
        notes.into_iter().filter(|n| self.matches(n)).collect()
    }
}
