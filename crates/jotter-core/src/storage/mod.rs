//! Storage layer
//!
//! SQLite is the single source of truth for notes. The schema is versioned
//! and initialized on first open.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use repository::NoteRepository;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
