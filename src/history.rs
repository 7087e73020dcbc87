use crate::timeline::Note;
use std::collections::HashSet;

/// Maximum number of undo/redo states to keep.
pub const MAX_HISTORY_SIZE: usize = 32;

/// A snapshot of the timeline state at a point in time.
///
/// Contains everything needed to restore the editable state: the notes and
/// the volume. Layout and observers are not part of the history.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    /// The note collection, in store order.
    pub notes: Vec<Note>,

    /// Volume setting (0-100).
    pub volume: u8,

    /// A brief description of what operation created this snapshot.
    pub description: String,
}

impl StateSnapshot {
    /// Creates a new snapshot from the current state.
    ///
    /// # Arguments
    ///
    /// * `notes` - The current note collection
    /// * `volume` - The current volume
    /// * `description` - A brief description of the operation
    pub fn new(notes: &[Note], volume: u8, description: impl Into<String>) -> Self {
        Self {
            notes: notes.to_vec(),
            volume,
            description: description.into(),
        }
    }

    /// Validates that the snapshot can be safely restored.
    ///
    /// A restorable snapshot never holds two notes on the same
    /// (start step, pitch) cell and never repeats an id.
    pub fn is_valid(&self) -> bool {
        let mut cells = HashSet::with_capacity(self.notes.len());
        let mut ids = HashSet::with_capacity(self.notes.len());
        self.notes
            .iter()
            .all(|n| cells.insert((n.start_step, n.pitch)) && ids.insert(n.id))
    }
}

/// Manages undo/redo history using a snapshot-based approach.
///
/// The manager maintains two stacks:
/// - `undo_stack`: Past states that can be reverted to
/// - `redo_stack`: Future states that can be restored after undoing
///
/// When a new edit is applied, the previous state is pushed to the
/// undo stack and the redo stack is cleared (branching creates a new timeline).
#[derive(Debug, Default)]
pub struct HistoryManager {
    /// Stack of states to undo to (most recent last).
    undo_stack: Vec<StateSnapshot>,

    /// Stack of states to redo to (most recent last).
    redo_stack: Vec<StateSnapshot>,
}

/// Pushes onto a bounded stack, dropping the oldest entries past
/// `MAX_HISTORY_SIZE`.
fn push_bounded(stack: &mut Vec<StateSnapshot>, snapshot: StateSnapshot) {
    stack.push(snapshot);
    let overflow = stack.len().saturating_sub(MAX_HISTORY_SIZE);
    stack.drain(..overflow);
}

impl HistoryManager {
    /// Creates a new empty history manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state before an edit and forgets any undone edits.
    pub fn push_undo(&mut self, snapshot: StateSnapshot) {
        self.redo_stack.clear();
        push_bounded(&mut self.undo_stack, snapshot);
    }

    /// Records the state replaced by a redo. Remaining redo states survive.
    pub fn push_undo_preserve_redo(&mut self, snapshot: StateSnapshot) {
        push_bounded(&mut self.undo_stack, snapshot);
    }

    /// Records the state replaced by an undo.
    pub fn push_redo(&mut self, snapshot: StateSnapshot) {
        push_bounded(&mut self.redo_stack, snapshot);
    }

    /// Takes the most recent undo state.
    pub fn pop_undo(&mut self) -> Option<StateSnapshot> {
        self.undo_stack.pop()
    }

    /// Takes the most recent redo state.
    pub fn pop_redo(&mut self) -> Option<StateSnapshot> {
        self.redo_stack.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drops both stacks, used when a stored state fails validation.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Test-only helper methods for HistoryManager.
#[cfg(test)]
impl HistoryManager {
    /// Returns the number of undo states available.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of redo states available.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::NoteId;

    fn note(id: u64, step: u32, pitch: u32) -> Note {
        Note::new(NoteId::from_raw(id), step, 1, pitch)
    }

    #[test]
    fn test_history_push_and_pop() {
        let mut history = HistoryManager::new();
        history.push_undo(StateSnapshot::new(&[], 80, "Toggle note"));

        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo_count(), 1);

        let restored = history.pop_undo().unwrap();
        assert_eq!(restored.description, "Toggle note");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_history_max_size() {
        let mut history = HistoryManager::new();

        for i in 0..MAX_HISTORY_SIZE + 5 {
            history.push_undo(StateSnapshot::new(&[], 80, format!("Action {}", i)));
        }

        assert_eq!(history.undo_count(), MAX_HISTORY_SIZE);

        // Oldest entries are dropped, the most recent survives
        let last = history.pop_undo().unwrap();
        assert_eq!(last.description, format!("Action {}", MAX_HISTORY_SIZE + 4));
    }

    #[test]
    fn test_redo_stack_bounded() {
        let mut history = HistoryManager::new();
        for i in 0..MAX_HISTORY_SIZE + 3 {
            history.push_redo(StateSnapshot::new(&[], 80, format!("Undone {}", i)));
        }
        assert_eq!(history.redo_count(), MAX_HISTORY_SIZE);
        assert_eq!(
            history.pop_redo().unwrap().description,
            format!("Undone {}", MAX_HISTORY_SIZE + 2)
        );
    }

    #[test]
    fn test_redo_cleared_on_new_action() {
        let mut history = HistoryManager::new();
        history.push_undo(StateSnapshot::new(&[], 80, "Action 1"));

        let undone = history.pop_undo().unwrap();
        history.push_redo(undone);
        assert!(history.can_redo());

        history.push_undo(StateSnapshot::new(&[], 80, "Action 2"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_redo_preserves_remaining_states() {
        let mut history = HistoryManager::new();
        for i in 0..3 {
            history.push_undo(StateSnapshot::new(&[], 80, format!("Action {}", i)));
        }
        for _ in 0..3 {
            let undone = history.pop_undo().unwrap();
            history.push_redo(undone);
        }
        assert_eq!(history.redo_count(), 3);

        let redone = history.pop_redo().unwrap();
        history.push_undo_preserve_redo(redone);
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 2);
    }

    #[test]
    fn test_snapshot_validation() {
        let valid = StateSnapshot::new(&[note(0, 0, 48), note(1, 0, 52)], 80, "Valid");
        assert!(valid.is_valid());

        let same_cell = StateSnapshot::new(&[note(0, 0, 48), note(1, 0, 48)], 80, "Cell");
        assert!(!same_cell.is_valid());

        let same_id = StateSnapshot::new(&[note(0, 0, 48), note(0, 4, 48)], 80, "Id");
        assert!(!same_id.is_valid());
    }
}
