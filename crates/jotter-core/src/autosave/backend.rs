//! Save targets for autosave sessions

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewNote, Note, NoteUpdate, OwnerId};
use crate::service::NoteService;

/// Where an autosave session sends its saves
#[async_trait]
pub trait NoteBackend: Send + Sync + 'static {
    /// Create a note and return it with its server-assigned id
    async fn create_note(&self, note: &NewNote) -> Result<Note>;

    /// Apply an update to an existing note
    async fn update_note(&self, id: Uuid, update: &NoteUpdate) -> Result<Note>;
}

/// Saves straight into a [`NoteService`] as a fixed owner
pub struct ServiceBackend {
    service: Arc<Mutex<NoteService>>,
    owner: OwnerId,
}

impl ServiceBackend {
    pub fn new(service: Arc<Mutex<NoteService>>, owner: OwnerId) -> Self {
        Self { service, owner }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, NoteService>> {
        self.service
            .lock()
            .map_err(|_| anyhow!("Note service lock poisoned"))
    }
}

#[async_trait]
impl NoteBackend for ServiceBackend {
    async fn create_note(&self, note: &NewNote) -> Result<Note> {
        Ok(self.lock()?.create(&self.owner, note.clone())?)
    }

    async fn update_note(&self, id: Uuid, update: &NoteUpdate) -> Result<Note> {
        Ok(self.lock()?.update(id, &self.owner, update.clone())?)
    }
}
