//! Jotter Core Library
//!
//! This crate provides the core functionality for Jotter, a personal notes
//! service: owner-scoped note storage, search, PDF export and the debounced
//! autosave protocol used by editor clients.
//!
//! # Architecture
//!
//! - **SQLite**: Source of truth for notes and tags
//! - **NoteService**: Every read and mutation goes through it, with ownership checks
//!
//! # Quick Start
//!
//! ```text
//! let mut service = NoteService::open(&Config::load()?)?;
//! let owner = OwnerId::parse("alice")?;
//!
//! let note = service.create(&owner, NewNote::new("Groceries", "milk, eggs"))?;
//! let found = service.search(&owner, "egg")?;
//! let pdf = export::render(&note)?;
//! ```
//!
//! # Modules
//!
//! - `service`: Owner-checked note operations (main entry point)
//! - `models`: Notes, owners, create and update requests
//! - `storage`: SQLite persistence
//! - `search`: Case-insensitive note matching
//! - `export`: PDF rendering
//! - `autosave`: Debounced client-side saving
//! - `config`: Application configuration

pub mod autosave;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod search;
pub mod service;
pub mod storage;

pub use autosave::{AutosaveEvent, Autosaver, Draft, Edit, NoteBackend, SaveState};
pub use config::Config;
pub use error::{NoteError, NoteResult};
pub use export::ExportError;
pub use models::{NewNote, Note, NoteUpdate, OwnerId};
pub use service::{parse_note_id, NoteService};
pub use storage::StorageError;
