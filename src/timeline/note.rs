//! Piano-roll note representation.
//!
//! A note is a pitched event placed on the step grid with a start step and
//! a duration, both measured in steps.

use serde::{Deserialize, Serialize};

/// Unique identifier for a note within a timeline session.
///
/// Ids are handed out by the owning [`Timeline`](super::Timeline) in
/// increasing order and never reused, so a stale id held by a UI gesture
/// can never alias a newer note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(u64);

impl NoteId {
    /// Wraps a raw id value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw ID value (for serialization/debugging).
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the id following this one.
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A scheduled pitched event on the step grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier for this note instance.
    pub id: NoteId,

    /// Start position in steps from the timeline origin.
    pub start_step: u32,

    /// Length in steps. Always at least 1.
    pub duration_steps: u32,

    /// Absolute chromatic pitch index. 0 is C of octave 1.
    pub pitch: u32,
}

impl Note {
    /// Creates a new note.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier allocated by the store
    /// * `start_step` - Start position in steps
    /// * `duration_steps` - Duration in steps (raised to 1 if zero)
    /// * `pitch` - Chromatic pitch index
    pub fn new(id: NoteId, start_step: u32, duration_steps: u32, pitch: u32) -> Self {
        Self {
            id,
            start_step,
            duration_steps: duration_steps.max(1),
            pitch,
        }
    }

    /// Returns the end step of this note (start + duration), exclusive.
    pub fn end_step(&self) -> u32 {
        self.start_step.saturating_add(self.duration_steps)
    }

    /// Checks if this note occupies the given grid cell as its onset.
    pub fn starts_at(&self, step: u32, pitch: u32) -> bool {
        self.start_step == step && self.pitch == pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_creation() {
        let note = Note::new(NoteId::from_raw(3), 4, 2, 48);
        assert_eq!(note.id.as_u64(), 3);
        assert_eq!(note.start_step, 4);
        assert_eq!(note.duration_steps, 2);
        assert_eq!(note.pitch, 48);
        assert_eq!(note.end_step(), 6);
    }

    #[test]
    fn test_zero_duration_raised() {
        let note = Note::new(NoteId::from_raw(0), 0, 0, 48);
        assert_eq!(note.duration_steps, 1);
    }

    #[test]
    fn test_serialized_field_names() {
        let note = Note::new(NoteId::from_raw(7), 0, 4, 48);
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"startStep":0,"durationSteps":4,"pitch":48}"#
        );
    }
}
