//! Debounced autosave for an open note
//!
//! An [`Autosaver`] holds the draft of one note and saves it through a
//! [`NoteBackend`] once the user stops typing for the configured delay.
//!
//! ```text
//! Idle --edit--> Dirty --timer--> Saving --ok--> Idle
//!                  ^                 |
//!                  |               error
//!                  +----edit---- Error
//! ```

pub mod backend;
pub mod session;
pub mod state;

pub use backend::{NoteBackend, ServiceBackend};
pub use session::Autosaver;
pub use state::{AutosaveEvent, Draft, Edit, SaveState};
