//! Note command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use jotter_core::{NewNote, NoteUpdate};

use super::resolve_note_id;
use crate::client::ApiClient;
use crate::editor::{confirm, edit_text};
use crate::output::{short_id, Output};

/// List notes, optionally filtered by tag
pub async fn list(client: &ApiClient, tag: Option<String>, output: &Output) -> Result<()> {
    let notes = client.list_notes(tag.as_deref()).await?;
    output.print_notes(&notes);
    Ok(())
}

/// Show a single note
pub async fn show(client: &ApiClient, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_note_id(client, &id).await?;
    let note = client.get_note(uuid).await?;
    output.print_note(&note);
    Ok(())
}

/// Create a note, opening the editor when no content is given
pub async fn create(
    client: &ApiClient,
    title: Option<String>,
    content: Option<String>,
    tags: Vec<String>,
    output: &Output,
) -> Result<()> {
    let content = match content {
        Some(content) => content,
        None => edit_text("")?,
    };

    let mut new = NewNote::new(title.unwrap_or_default(), content);
    if !tags.is_empty() {
        new = new.with_tags(tags);
    }

    let note = client.create(&new).await.context("Failed to create note")?;

    output.success(&format!("Created note: {}", note.id));
    output.print_note(&note);
    Ok(())
}

/// Edit a note's content in $EDITOR
pub async fn edit(client: &ApiClient, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_note_id(client, &id).await?;
    let note = client.get_note(uuid).await?;

    let content = edit_text(&note.content)?;
    if content == note.content {
        output.message("No changes.");
        return Ok(());
    }

    let updated = client
        .update(uuid, &NoteUpdate::content(content))
        .await
        .context("Failed to update note")?;

    output.success("Note updated");
    output.print_note(&updated);
    Ok(())
}

/// Delete a note
pub async fn delete(client: &ApiClient, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_note_id(client, &id).await?;
    let note = client.get_note(uuid).await?;

    if output.should_prompt() {
        println!("Delete note: {} - {}", short_id(&note), note.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    client.delete(uuid).await.context("Failed to delete note")?;

    output.success(&format!("Deleted note: {}", uuid));
    Ok(())
}

/// Search notes by title and content
pub async fn search(client: &ApiClient, query: String, output: &Output) -> Result<()> {
    let notes = client.search(&query).await?;
    output.print_notes(&notes);
    Ok(())
}

/// Download a note as PDF
pub async fn export(
    client: &ApiClient,
    id: String,
    out: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let uuid = resolve_note_id(client, &id).await?;
    let export = client.export(uuid).await?;

    let path = out.unwrap_or_else(|| PathBuf::from(&export.filename));
    std::fs::write(&path, &export.bytes)
        .with_context(|| format!("Failed to write {:?}", path))?;

    output.success(&format!("Exported to {}", path.display()));
    Ok(())
}

/// List tags with usage counts
pub async fn tags(client: &ApiClient, output: &Output) -> Result<()> {
    let tags = client.tags().await?;
    output.print_tags(&tags);
    Ok(())
}
