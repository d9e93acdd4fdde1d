//! Autosaving write command
//!
//! Streams stdin into a note, one line at a time. Saves happen through the
//! autosave protocol: once input pauses for the configured delay, and once
//! more when input ends.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use jotter_core::{Autosaver, Draft, Edit, NoteBackend};

use super::resolve_note_id;
use crate::client::ApiClient;
use crate::output::Output;

pub async fn write(
    client: ApiClient,
    id: Option<String>,
    title: Option<String>,
    delay: Duration,
    output: &Output,
) -> Result<()> {
    let draft = match id {
        Some(id) => {
            let uuid = resolve_note_id(&client, &id).await?;
            Draft::from_note(&client.get_note(uuid).await?)
        }
        None => Draft::default(),
    };

    if !output.is_quiet() && draft.id.is_none() {
        eprintln!("Writing a new note. End input with Ctrl-D.");
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let draft = stream_into(Arc::new(client), draft, title, stdin, delay, output).await?;

    match draft.id {
        Some(id) => output.success(&format!("Saved note: {}", id)),
        None => output.message("Nothing written."),
    }
    Ok(())
}

/// Feed `input` into an autosave session and return the final draft
async fn stream_into<B, R>(
    backend: Arc<B>,
    draft: Draft,
    title: Option<String>,
    input: R,
    delay: Duration,
    output: &Output,
) -> Result<Draft>
where
    B: NoteBackend,
    R: AsyncBufRead + Unpin,
{
    let mut saver = Autosaver::spawn(backend, draft, delay);
    let state = saver.subscribe_state();

    let mut events = saver.take_events();
    let printer = async {
        if let Some(events) = events.as_mut() {
            while let Some(event) = events.recv().await {
                output.autosave_event(&event);
            }
        }
    };

    let session = async {
        if let Some(title) = title {
            saver.edit(Edit::SetTitle(title))?;
        }

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            saver.edit(Edit::AppendContent(format!("{}\n", line)))?;
        }
        Ok::<Draft, anyhow::Error>(saver.finish().await?)
    };

    let (draft, ()) = tokio::join!(session, printer);
    let draft = draft?;

    let last = state.borrow().clone();
    if last.has_unsaved_changes() {
        bail!("Draft not saved ({})", last);
    }
    Ok(draft)
}
