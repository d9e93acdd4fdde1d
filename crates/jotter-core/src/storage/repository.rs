//! SQLite note store
//!
//! Persists note documents and answers owner-scoped queries. Every mutation
//! runs in a single transaction so a write either fully applies or leaves
//! the stored note untouched.
//!
//! ## Tables
//!
//! - `notes` - Note records
//! - `tags` - Normalized tag names
//! - `note_tags` - Note-to-tag junction

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Note, OwnerId};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema::{init_schema, needs_init};

/// SQLite-backed collection of notes
pub struct NoteRepository {
    conn: Connection,
}

impl NoteRepository {
    /// Open or create the SQLite database
    pub fn open(config: &Config) -> StorageResult<Self> {
        let path = config.sqlite_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        let conn = Connection::open(&path).map_err(|source| StorageError::Open {
            path: path.clone(),
            source,
        })?;
        debug!("Opened note database at {:?}", path);

        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        Ok(Self { conn })
    }

    // ==================== Mutations ====================

    /// Insert a new note and its tags
    pub fn insert(&mut self, note: &Note) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO notes (id, owner, title, content, created_at, last_modified)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                note.id.to_string(),
                note.owner.as_str(),
                note.title,
                note.content,
                note.created_at.timestamp_millis(),
                note.last_modified.timestamp_millis(),
            ],
        )?;
        insert_tags(&tx, note)?;
        tx.commit()?;
        Ok(())
    }

    /// Overwrite a stored note with `note`
    ///
    /// Returns `false` when no row with this id exists.
    pub fn replace(&mut self, note: &Note) -> StorageResult<bool> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            r#"
            UPDATE notes
            SET title = ?, content = ?, last_modified = ?
            WHERE id = ?
            "#,
            params![
                note.title,
                note.content,
                note.last_modified.timestamp_millis(),
                note.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM note_tags WHERE note_id = ?",
            params![note.id.to_string()],
        )?;
        insert_tags(&tx, note)?;
        prune_unused_tags(&tx)?;
        tx.commit()?;
        Ok(true)
    }

    /// Delete a note
    ///
    /// Returns `false` when no row with this id exists.
    pub fn remove(&mut self, id: Uuid) -> StorageResult<bool> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM notes WHERE id = ?", params![id.to_string()])?;
        prune_unused_tags(&tx)?;
        tx.commit()?;
        Ok(removed > 0)
    }

    // ==================== Queries ====================

    /// Get a note by ID
    pub fn get(&self, id: Uuid) -> StorageResult<Option<Note>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, owner, title, content, created_at, last_modified
                FROM notes WHERE id = ?
                "#,
                params![id.to_string()],
                NoteRow::from_row,
            )
            .optional()?;

        row.map(|row| self.hydrate(row)).transpose()
    }

    /// All notes of `owner`, most recently modified first
    pub fn list_by_owner(&self, owner: &OwnerId) -> StorageResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, owner, title, content, created_at, last_modified
            FROM notes
            WHERE owner = ?
            ORDER BY last_modified DESC, id
            "#,
        )?;

        let rows = stmt
            .query_map(params![owner.as_str()], NoteRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    /// Notes of `owner` carrying `tag`, most recently modified first
    pub fn list_by_owner_and_tag(&self, owner: &OwnerId, tag: &str) -> StorageResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT n.id, n.owner, n.title, n.content, n.created_at, n.last_modified
            FROM notes n
            JOIN note_tags nt ON n.id = nt.note_id
            JOIN tags t ON nt.tag_id = t.id
            WHERE n.owner = ? AND t.name = ?
            ORDER BY n.last_modified DESC, n.id
            "#,
        )?;

        let rows = stmt
            .query_map(params![owner.as_str(), tag.trim()], NoteRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    /// Tags used by `owner` with usage counts
    pub fn tags_with_counts(&self, owner: &OwnerId) -> StorageResult<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.name, COUNT(nt.note_id) as count
            FROM tags t
            JOIN note_tags nt ON t.id = nt.tag_id
            JOIN notes n ON n.id = nt.note_id
            WHERE n.owner = ?
            GROUP BY t.id
            ORDER BY count DESC, t.name
            "#,
        )?;

        let tags = stmt
            .query_map(params![owner.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, i64)>, _>>()?;
        Ok(tags)
    }

    /// Total number of stored notes
    pub fn note_count(&self) -> StorageResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .map_err(Into::into)
    }

    // ==================== Private helpers ====================

    fn hydrate(&self, row: NoteRow) -> StorageResult<Note> {
        let tags = self.get_tags_for_note(&row.id)?;

        let id = Uuid::parse_str(&row.id).map_err(|e| StorageError::InvalidRecord {
            id: row.id.clone(),
            details: e.to_string(),
        })?;
        let owner = OwnerId::parse(&row.owner).map_err(|e| StorageError::InvalidRecord {
            id: row.id.clone(),
            details: e.to_string(),
        })?;

        let created_at = timestamp(&row.id, "created_at", row.created_at)?;
        let last_modified = timestamp(&row.id, "last_modified", row.last_modified)?;

        Ok(Note {
            id,
            owner,
            title: row.title,
            content: row.content,
            tags,
            created_at,
            last_modified,
        })
    }

    fn get_tags_for_note(&self, note_id: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.name FROM tags t
            JOIN note_tags nt ON t.id = nt.tag_id
            WHERE nt.note_id = ?
            ORDER BY t.name
            "#,
        )?;

        let tags = stmt
            .query_map(params![note_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }
}

fn timestamp(id: &str, column: &str, millis: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| StorageError::InvalidRecord {
        id: id.to_string(),
        details: format!("{} out of range: {}", column, millis),
    })
}

// ==================== Internal structs ====================

struct NoteRow {
    id: String,
    owner: String,
    title: String,
    content: String,
    created_at: i64,
    last_modified: i64,
}

impl NoteRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get(4)?,
            last_modified: row.get(5)?,
        })
    }
}

// ==================== Transaction helpers ====================

fn insert_tags(tx: &Transaction, note: &Note) -> StorageResult<()> {
    for tag in &note.tags {
        let tag_id = get_or_create_tag(tx, tag)?;
        tx.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?, ?)",
            params![note.id.to_string(), tag_id],
        )?;
    }
    Ok(())
}

/// Get or create a tag, returning its ID
fn get_or_create_tag(tx: &Transaction, name: &str) -> StorageResult<i64> {
    let existing: Option<i64> = tx
        .query_row("SELECT id FROM tags WHERE name = ?", params![name], |row| {
            row.get(0)
        })
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    tx.execute("INSERT INTO tags (name) VALUES (?)", params![name])?;
    Ok(tx.last_insert_rowid())
}

fn prune_unused_tags(tx: &Transaction) -> StorageResult<()> {
    tx.execute(
        "DELETE FROM tags WHERE id NOT IN (SELECT DISTINCT tag_id FROM note_tags)",
        [],
    )?;
    Ok(())
}
