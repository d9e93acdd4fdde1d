//! Command handlers

pub mod config;
pub mod note;
pub mod write;

use anyhow::{bail, Result};
use uuid::Uuid;

use jotter_core::Note;

use crate::client::ApiClient;

/// Resolve a note id given as a full UUID or a unique prefix
pub async fn resolve_note_id(client: &ApiClient, id: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let notes = client.list_notes(None).await?;
    match_prefix(&notes, id)
}

fn match_prefix(notes: &[Note], prefix: &str) -> Result<Uuid> {
    let prefix = prefix.to_lowercase();
    let matches: Vec<_> = notes
        .iter()
        .filter(|n| n.id.to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => bail!("No note found matching: {}", prefix),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple notes match '{}':", prefix);
            for note in &matches {
                eprintln!("  {} - {}", note.id, note.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
