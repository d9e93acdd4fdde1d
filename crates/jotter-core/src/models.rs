//! Data models for Jotter
//!
//! Defines the note document and the request shapes used to create and
//! update it. Notes serialize with camelCase keys for the HTTP surface.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{NoteError, NoteResult};

/// Opaque identity of the user owning a note
///
/// Supplied by the upstream authenticator; Jotter never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Parse an owner id, rejecting blank values
    pub fn parse(raw: impl AsRef<str>) -> NoteResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(NoteError::validation("owner id must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rich-text note owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier, assigned on creation
    pub id: Uuid,
    /// Owner of the note
    pub owner: OwnerId,
    /// Note title (may be empty)
    pub title: String,
    /// Rich-text markup, stored as an opaque string
    pub content: String,
    /// Tag set, normalized and sorted
    #[serde(default)]
    pub tags: Vec<String>,
    /// When this note was created
    pub created_at: DateTime<Utc>,
    /// When this note was last mutated
    pub last_modified: DateTime<Utc>,
}

impl Note {
    /// Create a new note for `owner` from a create request
    pub fn new(owner: OwnerId, new: NewNote) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            owner,
            title: new.title,
            content: new.content,
            tags: normalize_tags(new.tags.unwrap_or_default()),
            created_at: now,
            last_modified: now,
        }
    }

    /// Apply a partial update
    ///
    /// Only supplied fields are replaced. `last_modified` always advances.
    pub fn apply(&mut self, update: NoteUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(tags) = update.tags {
            self.tags = normalize_tags(tags);
        }
        self.touch();
    }

    /// Advance `last_modified` strictly past its current value
    pub fn touch(&mut self) {
        self.last_modified = next_timestamp(self.last_modified);
    }

    /// Check whether the note belongs to `owner`
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner == owner
    }

    /// Check whether the note carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag.trim())
    }
}

/// Body of a create request
///
/// A missing or `null` title or content is stored as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewNote {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }
}

/// Body of an update request
///
/// `None` keeps the stored value; `Some("")` stores an empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NoteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NoteUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// True when the update carries no fields
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

/// Trim, drop empty entries, dedupe and sort a tag list
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Current time truncated to the millisecond precision the store keeps
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// A timestamp strictly later than `previous`
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_millis();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::parse("alice").unwrap()
    }

    #[test]
    fn test_owner_id_parse() {
        assert_eq!(OwnerId::parse("  bob ").unwrap().as_str(), "bob");
        assert!(OwnerId::parse("").is_err());
        assert!(OwnerId::parse("   ").is_err());
    }

    #[test]
    fn test_note_new() {
        let note = Note::new(owner(), NewNote::new("Groceries", "milk, eggs"));
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk, eggs");
        assert!(note.tags.is_empty());
        assert_eq!(note.created_at, note.last_modified);
        assert!(note.is_owned_by(&owner()));
    }

    #[test]
    fn test_apply_partial_update() {
        let mut note = Note::new(owner(), NewNote::new("Title", "Body"));

        note.apply(NoteUpdate::content("New body"));
        assert_eq!(note.title, "Title");
        assert_eq!(note.content, "New body");

        note.apply(NoteUpdate::title("New title"));
        assert_eq!(note.title, "New title");
        assert_eq!(note.content, "New body");
    }

    #[test]
    fn test_apply_empty_string_clears_field() {
        let mut note = Note::new(owner(), NewNote::new("Title", "Body"));
        note.apply(NoteUpdate::title(""));
        assert_eq!(note.title, "");
        assert_eq!(note.content, "Body");
    }

    #[test]
    fn test_touch_is_strictly_monotonic() {
        let mut note = Note::new(owner(), NewNote::default());
        let mut previous = note.last_modified;
        for _ in 0..50 {
            note.touch();
            assert!(note.last_modified > previous);
            previous = note.last_modified;
        }
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![" work ", "idea", "", "work", "  "]);
        assert_eq!(tags, vec!["idea", "work"]);
    }

    #[test]
    fn test_has_tag() {
        let note = Note::new(
            owner(),
            NewNote::new("t", "c").with_tags(vec!["rust".to_string()]),
        );
        assert!(note.has_tag("rust"));
        assert!(note.has_tag(" rust "));
        assert!(!note.has_tag("go"));
    }

    #[test]
    fn test_update_deserialization_distinguishes_empty_from_missing() {
        let update: NoteUpdate = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert_eq!(update.title, Some(String::new()));
        assert_eq!(update.content, None);

        let update: NoteUpdate = serde_json::from_str(r#"{"content": null}"#).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_note_json_uses_camel_case() {
        let note = Note::new(owner(), NewNote::new("t", "c"));
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("lastModified").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["owner"], "alice");

        let back: Note = serde_json::from_value(json).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn test_new_note_defaults_missing_fields() {
        let new: NewNote = serde_json::from_str(r#"{"title": "Only title"}"#).unwrap();
        assert_eq!(new.title, "Only title");
        assert_eq!(new.content, "");
        assert!(new.tags.is_none());
    }

    #[test]
    fn test_new_note_accepts_null_fields() {
        let new: NewNote =
            serde_json::from_str(r#"{"title": null, "content": "milk", "tags": null}"#).unwrap();
        assert_eq!(new.title, "");
        assert_eq!(new.content, "milk");
        assert!(new.tags.is_none());

        assert!(serde_json::from_str::<NewNote>(r#"{"title": 7}"#).is_err());
    }
}
