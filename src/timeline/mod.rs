//! Timeline data structures for the piano-roll editor.
//!
//! This module provides the note type, the grid layout, and the store that
//! owns the editable note collection and notifies observers on every change.

mod layout;
mod note;
mod observer;
mod store;

pub use layout::{LayoutConfig, LayoutError};
pub use note::{Note, NoteId};
pub use observer::{TimelineEvent, TimelineObserver};
pub use store::{AddNoteOptions, Timeline};

/// Default volume (0-100) of a freshly created timeline.
pub const DEFAULT_VOLUME: u8 = 80;

/// Upper bound of the volume setting.
pub const MAX_VOLUME: u8 = 100;

/// Clamps a signed grid coordinate into an inclusive unsigned range.
///
/// Drag gestures can produce negative or oversized values; they are pulled
/// back onto the grid instead of being rejected.
///
/// # Arguments
///
/// * `value` - Requested coordinate
/// * `min` - Lowest legal value
/// * `max` - Highest legal value (raised to `min` if smaller)
pub(crate) fn clamp_to_grid(value: i64, min: u32, max: u32) -> u32 {
    let max = max.max(min);
    value.clamp(min as i64, max as i64) as u32
}
