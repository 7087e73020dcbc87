//! mmlroll - Piano-roll note model and MML generator.
//!
//! This library holds the editable note collection of a piano-roll editor
//! and compiles it into music macro language (MML) text.

pub mod history;
pub mod mml;
pub mod script;
pub mod timeline;

// Re-export commonly used types
pub use mml::{compile, BASE_LENGTH};
pub use script::{EditCommand, ScriptError};
pub use timeline::{
    AddNoteOptions, LayoutConfig, LayoutError, Note, NoteId, Timeline, TimelineEvent,
    TimelineObserver,
};
