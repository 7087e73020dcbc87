//! The timeline store.
//!
//! Owns the note collection of one editing session, applies bounded edits,
//! and publishes the notes plus freshly compiled MML after every change.

use super::layout::LayoutConfig;
use super::note::{Note, NoteId};
use super::observer::TimelineObserver;
use super::{clamp_to_grid, DEFAULT_VOLUME, MAX_VOLUME};
use crate::history::{HistoryManager, StateSnapshot};
use crate::mml;

/// Settings applied when a toggle inserts a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddNoteOptions {
    /// Length of the inserted note in steps.
    pub note_length_steps: u32,
}

impl AddNoteOptions {
    /// Creates options for notes of the given length.
    pub fn with_length(note_length_steps: u32) -> Self {
        Self { note_length_steps }
    }
}

impl Default for AddNoteOptions {
    fn default() -> Self {
        Self::with_length(1)
    }
}

/// Kind of an in-place edit, used to merge repeated drag updates into a
/// single undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Move(NoteId),
    Resize(NoteId),
    Volume,
}

/// The editable note collection of one piano-roll session.
///
/// Notes are kept sorted by start step (stable for ties) so iteration is
/// deterministic for the MML compiler. No two notes share the same
/// (start step, pitch) cell.
pub struct Timeline {
    /// Grid layout, fixed for the session.
    layout: LayoutConfig,

    /// Collection of notes, sorted by start_step.
    notes: Vec<Note>,

    /// Id handed to the next inserted note.
    next_note_id: NoteId,

    /// Volume setting (0-100).
    volume: u8,

    /// Registered observers, notified in registration order.
    observers: Vec<Box<dyn TimelineObserver>>,

    /// Undo/redo snapshots.
    history: HistoryManager,

    /// Last in-place edit, so a drag records one undo step instead of many.
    last_edit: Option<EditKind>,
}

impl Timeline {
    /// Creates an empty timeline over the given layout at the default volume.
    pub fn new(layout: LayoutConfig) -> Self {
        Self::with_volume(layout, DEFAULT_VOLUME)
    }

    /// Creates an empty timeline with a starting volume (clamped to 100).
    ///
    /// The starting volume is configuration, not an edit: it leaves the
    /// undo history empty.
    pub fn with_volume(layout: LayoutConfig, volume: u8) -> Self {
        let timeline = Self {
            layout,
            notes: Vec::new(),
            next_note_id: NoteId::from_raw(0),
            volume: volume.min(MAX_VOLUME),
            observers: Vec::new(),
            history: HistoryManager::new(),
            last_edit: None,
        };
        tracing::debug!(
            total_steps = layout.total_steps(),
            "timeline created: {}",
            timeline.mml()
        );
        timeline
    }

    /// Registers an observer. It receives every state published from now on.
    pub fn add_observer(&mut self, observer: impl TimelineObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Returns the number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Returns the layout this timeline was created with.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the generation horizon in steps.
    pub fn total_steps(&self) -> u32 {
        self.layout.total_steps()
    }

    /// Returns the current volume (0-100).
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Returns all notes, sorted by start step.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Returns an owned copy of the note collection.
    pub fn snapshot(&self) -> Vec<Note> {
        self.notes.clone()
    }

    /// Returns a note by its ID.
    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Returns the number of notes on the timeline.
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Compiles the current state into MML.
    pub fn mml(&self) -> String {
        mml::compile(&self.notes, &self.layout, self.volume)
    }

    /// Adds or removes the note starting at a grid cell.
    ///
    /// If a note starts at exactly `(step, pitch)` it is removed; otherwise a
    /// new note of `options.note_length_steps` steps is inserted there.
    ///
    /// # Returns
    ///
    /// The id of the inserted note, or None if a note was removed
    pub fn toggle_note(&mut self, step: u32, pitch: u32, options: AddNoteOptions) -> Option<NoteId> {
        self.record("Toggle note", None);

        let inserted = match self.notes.iter().position(|n| n.starts_at(step, pitch)) {
            Some(pos) => {
                let removed = self.notes.remove(pos);
                tracing::debug!(id = %removed.id, step, pitch, "removed note");
                None
            }
            None => {
                let id = self.allocate_id();
                let note = Note::new(id, step, options.note_length_steps, pitch);
                // Insert after any notes with the same start step
                let pos = self.notes.partition_point(|n| n.start_step <= step);
                self.notes.insert(pos, note);
                tracing::debug!(%id, step, pitch, length = options.note_length_steps, "added note");
                Some(id)
            }
        };

        self.publish();
        inserted
    }

    /// Moves a note to a new start step and pitch, keeping its duration.
    ///
    /// The pitch is clamped into the layout's key range and the start step so
    /// the note still ends within the timeline. Unknown ids are ignored, as
    /// is a move onto a cell whose onset belongs to another note.
    ///
    /// # Returns
    ///
    /// true if the note was found and placed
    pub fn move_note(&mut self, id: NoteId, new_start_step: i64, new_pitch: i64) -> bool {
        let Some(pos) = self.position_of(id) else {
            tracing::trace!(%id, "move ignored: unknown note");
            return false;
        };

        let duration = self.notes[pos].duration_steps;
        let pitch = clamp_to_grid(
            new_pitch,
            self.layout.pitch_range_start,
            self.layout.pitch_range_end(),
        );
        let step = clamp_to_grid(
            new_start_step,
            0,
            self.total_steps().saturating_sub(duration),
        );

        if self
            .notes
            .iter()
            .any(|n| n.id != id && n.starts_at(step, pitch))
        {
            tracing::trace!(%id, step, pitch, "move ignored: cell occupied");
            return false;
        }

        if !self.notes[pos].starts_at(step, pitch) {
            self.record("Move note", Some(EditKind::Move(id)));
            let note = &mut self.notes[pos];
            note.start_step = step;
            note.pitch = pitch;
            tracing::debug!(%id, step, pitch, "moved note");
        }

        self.sort_notes();
        self.publish();
        true
    }

    /// Changes the duration of a note.
    ///
    /// The duration is clamped so the note lasts at least one step and ends
    /// within the timeline. Unknown ids are ignored.
    ///
    /// # Returns
    ///
    /// true if the note was found
    pub fn resize_note(&mut self, id: NoteId, new_duration_steps: i64) -> bool {
        let Some(pos) = self.position_of(id) else {
            tracing::trace!(%id, "resize ignored: unknown note");
            return false;
        };

        let max_duration = self.total_steps().saturating_sub(self.notes[pos].start_step);
        let duration = clamp_to_grid(new_duration_steps, 1, max_duration);

        if self.notes[pos].duration_steps != duration {
            self.record("Resize note", Some(EditKind::Resize(id)));
            self.notes[pos].duration_steps = duration;
            tracing::debug!(%id, duration, "resized note");
        }

        self.sort_notes();
        self.publish();
        true
    }

    /// Sets the volume (0-100, larger values are clamped).
    ///
    /// The MML is regenerated since the volume is part of its header.
    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(MAX_VOLUME);
        if volume != self.volume {
            self.record("Set volume", Some(EditKind::Volume));
            self.volume = volume;
            tracing::debug!(volume, "volume changed");
        }
        self.publish();
    }

    /// Returns true if there is an edit to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there is an undone edit to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Reverts the last edit.
    ///
    /// If the stored state is invalid the history is cleared.
    ///
    /// # Returns
    ///
    /// true if a state was restored
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop_undo() else {
            return false;
        };
        if !previous.is_valid() {
            tracing::warn!("undo failed: history cleared due to invalid state");
            self.history.clear();
            return false;
        }

        let current = StateSnapshot::new(&self.notes, self.volume, previous.description.clone());
        self.history.push_redo(current);
        tracing::debug!("undo: {}", previous.description);
        self.restore(previous);
        true
    }

    /// Re-applies the last undone edit.
    ///
    /// # Returns
    ///
    /// true if a state was restored
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.pop_redo() else {
            return false;
        };
        if !next.is_valid() {
            tracing::warn!("redo failed: history cleared due to invalid state");
            self.history.clear();
            return false;
        }

        let current = StateSnapshot::new(&self.notes, self.volume, next.description.clone());
        self.history.push_undo_preserve_redo(current);
        tracing::debug!("redo: {}", next.description);
        self.restore(next);
        true
    }

    /// Publishes the current state to every observer: first the notes to
    /// all observers, then the compiled MML.
    pub fn publish(&mut self) {
        let mml = self.mml();
        for observer in &mut self.observers {
            observer.on_notes_changed(&self.notes);
        }
        for observer in &mut self.observers {
            observer.on_mml_generated(&mml);
        }
    }

    fn allocate_id(&mut self) -> NoteId {
        let id = self.next_note_id;
        self.next_note_id = id.next();
        id
    }

    fn position_of(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    fn sort_notes(&mut self) {
        self.notes.sort_by_key(|n| n.start_step);
    }

    /// Saves the pre-edit state for undo. Consecutive in-place edits of the
    /// same kind and note share one snapshot.
    fn record(&mut self, description: &str, kind: Option<EditKind>) {
        if kind.is_some() && kind == self.last_edit {
            return;
        }
        self.history
            .push_undo(StateSnapshot::new(&self.notes, self.volume, description));
        self.last_edit = kind;
    }

    fn restore(&mut self, snapshot: StateSnapshot) {
        self.notes = snapshot.notes;
        self.volume = snapshot.volume;
        self.last_edit = None;
        self.sort_notes();
        self.publish();
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("layout", &self.layout)
            .field("notes", &self.notes)
            .field("volume", &self.volume)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
