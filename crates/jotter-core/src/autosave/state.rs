//! Autosave state, drafts and edits

use std::fmt;

use uuid::Uuid;

use crate::models::{NewNote, Note, NoteUpdate};

/// Save status of an open note
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveState {
    /// Everything is saved
    Idle,
    /// Local edits wait for the inactivity timer
    Dirty,
    /// A save request is in flight
    Saving,
    /// The last save failed; the draft is kept until the next edit
    Error(String),
}

impl SaveState {
    /// True while the draft holds changes the server has not acknowledged
    pub fn has_unsaved_changes(&self) -> bool {
        !matches!(self, SaveState::Idle)
    }
}

impl fmt::Display for SaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveState::Idle => write!(f, "saved"),
            SaveState::Dirty => write!(f, "unsaved changes"),
            SaveState::Saving => write!(f, "saving..."),
            SaveState::Error(message) => write!(f, "save failed: {}", message),
        }
    }
}

/// Events emitted by an autosave session
#[derive(Debug, Clone)]
pub enum AutosaveEvent {
    StateChanged(SaveState),
    /// The server acknowledged a save
    Saved(Note),
    /// A save failed; the message is meant for the user
    Failed(String),
}

/// A local change to the draft
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    SetTitle(String),
    SetContent(String),
    AppendContent(String),
    SetTags(Vec<String>),
}

/// The client-held copy of the note being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    /// Server id, unknown until the first save creates the note
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
    /// `None` leaves the stored tags alone
    pub tags: Option<Vec<String>>,
}

impl Draft {
    /// An unsaved note
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Start editing an existing note
    pub fn from_note(note: &Note) -> Self {
        Self {
            id: Some(note.id),
            title: note.title.clone(),
            content: note.content.clone(),
            tags: Some(note.tags.clone()),
        }
    }

    pub fn apply(&mut self, edit: Edit) {
        match edit {
            Edit::SetTitle(title) => self.title = title,
            Edit::SetContent(content) => self.content = content,
            Edit::AppendContent(text) => self.content.push_str(&text),
            Edit::SetTags(tags) => self.tags = Some(tags),
        }
    }

    pub(crate) fn to_new_note(&self) -> NewNote {
        NewNote {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Full snapshot of the draft as an update
    pub(crate) fn to_update(&self) -> NoteUpdate {
        NoteUpdate {
            title: Some(self.title.clone()),
            content: Some(self.content.clone()),
            tags: self.tags.clone(),
        }
    }
}
