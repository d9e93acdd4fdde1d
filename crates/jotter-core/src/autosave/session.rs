//! Debounced autosave session
//!
//! One tokio task per open note. Edits arrive over a channel, every edit
//! re-arms a single inactivity deadline, and the deadline firing issues one
//! save. While a save is in flight the task keeps taking edits but never
//! starts a second save.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use super::backend::NoteBackend;
use super::state::{AutosaveEvent, Draft, Edit, SaveState};
use crate::models::{NewNote, Note, NoteUpdate};

/// Handle to a running autosave session
pub struct Autosaver {
    edits: mpsc::UnboundedSender<Edit>,
    state_rx: watch::Receiver<SaveState>,
    event_rx: Option<mpsc::UnboundedReceiver<AutosaveEvent>>,
    task: JoinHandle<Draft>,
}

impl Autosaver {
    /// Start a session for `draft`, saving after `delay` of inactivity
    pub fn spawn<B: NoteBackend>(backend: Arc<B>, draft: Draft, delay: Duration) -> Self {
        let (edit_tx, edit_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SaveState::Idle);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let session = Session {
            backend,
            draft,
            delay,
            revision: 0,
            state_tx,
            event_tx,
        };
        let task = tokio::spawn(session.run(edit_rx));

        Self {
            edits: edit_tx,
            state_rx,
            event_rx: Some(event_rx),
            task,
        }
    }

    /// Queue an edit
    pub fn edit(&self, edit: Edit) -> Result<()> {
        self.edits
            .send(edit)
            .map_err(|_| anyhow!("Autosave session has ended"))
    }

    pub fn state(&self) -> SaveState {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe_state(&self) -> watch::Receiver<SaveState> {
        self.state_rx.clone()
    }

    /// Take the event receiver (can only be called once)
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<AutosaveEvent>> {
        self.event_rx.take()
    }

    /// Stop taking edits, flush a pending draft and return the final draft
    pub async fn finish(self) -> Result<Draft> {
        let Autosaver { edits, task, .. } = self;
        drop(edits);
        task.await.context("Autosave task failed")
    }
}

enum SaveRequest {
    Create(NewNote),
    Update(Uuid, NoteUpdate),
}

impl SaveRequest {
    async fn send<B: NoteBackend>(self, backend: Arc<B>) -> Result<Note> {
        match self {
            SaveRequest::Create(note) => backend.create_note(&note).await,
            SaveRequest::Update(id, update) => backend.update_note(id, &update).await,
        }
    }
}

struct Session<B> {
    backend: Arc<B>,
    draft: Draft,
    delay: Duration,
    /// Bumped on every edit so a finished save can tell if it is stale
    revision: u64,
    state_tx: watch::Sender<SaveState>,
    event_tx: mpsc::UnboundedSender<AutosaveEvent>,
}

impl<B: NoteBackend> Session<B> {
    async fn run(mut self, mut edits: mpsc::UnboundedReceiver<Edit>) -> Draft {
        let mut deadline: Option<Instant> = None;
        let mut open = true;

        while open {
            tokio::select! {
                edit = edits.recv() => match edit {
                    Some(edit) => {
                        self.apply(edit);
                        deadline = Some(Instant::now() + self.delay);
                    }
                    None => open = false,
                },
                _ = wait_for(deadline) => {
                    deadline = None;
                    if self.state() == SaveState::Dirty {
                        self.save(&mut edits, &mut deadline, &mut open).await;
                    }
                }
            }
        }

        if self.state() == SaveState::Dirty {
            debug!("Flushing pending draft before closing");
            let mut deadline = None;
            let mut open = false;
            self.save(&mut edits, &mut deadline, &mut open).await;
        }

        self.draft
    }

    fn state(&self) -> SaveState {
        self.state_tx.borrow().clone()
    }

    fn set_state(&self, state: SaveState) {
        if self.state() == state {
            return;
        }
        self.state_tx.send_replace(state.clone());
        let _ = self.event_tx.send(AutosaveEvent::StateChanged(state));
    }

    fn apply(&mut self, edit: Edit) {
        self.draft.apply(edit);
        self.revision += 1;
        if self.state() != SaveState::Saving {
            self.set_state(SaveState::Dirty);
        }
    }

    fn request(&self) -> SaveRequest {
        match self.draft.id {
            Some(id) => SaveRequest::Update(id, self.draft.to_update()),
            None => SaveRequest::Create(self.draft.to_new_note()),
        }
    }

    /// Run one save, taking edits until it completes
    async fn save(
        &mut self,
        edits: &mut mpsc::UnboundedReceiver<Edit>,
        deadline: &mut Option<Instant>,
        open: &mut bool,
    ) {
        let revision = self.revision;
        self.set_state(SaveState::Saving);

        let save = self.request().send(Arc::clone(&self.backend));
        tokio::pin!(save);

        let result = loop {
            tokio::select! {
                result = &mut save => break result,
                edit = edits.recv(), if *open => match edit {
                    Some(edit) => {
                        self.apply(edit);
                        *deadline = Some(Instant::now() + self.delay);
                    }
                    None => *open = false,
                },
            }
        };

        let changed = self.revision != revision;
        match result {
            Ok(note) => {
                if self.draft.id.is_none() {
                    debug!("Draft adopted id {}", note.id);
                    self.draft.id = Some(note.id);
                }
                let _ = self.event_tx.send(AutosaveEvent::Saved(note));
                self.set_state(if changed {
                    SaveState::Dirty
                } else {
                    SaveState::Idle
                });
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!("Autosave failed: {}", message);
                let _ = self.event_tx.send(AutosaveEvent::Failed(message.clone()));
                self.set_state(if changed {
                    SaveState::Dirty
                } else {
                    SaveState::Error(message)
                });
            }
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
