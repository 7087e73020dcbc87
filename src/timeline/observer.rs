//! Change notification for timeline observers.

use super::note::Note;
use std::sync::mpsc::Sender;

/// Receives the published state of a [`Timeline`](super::Timeline).
///
/// For every applied mutation the store calls `on_notes_changed` and then
/// `on_mml_generated`, synchronously and from inside the mutating call.
/// Observers must not call back into the store.
pub trait TimelineObserver {
    /// Called with a fresh copy of the note collection.
    fn on_notes_changed(&mut self, notes: &[Note]);

    /// Called with the MML compiled from the same state.
    fn on_mml_generated(&mut self, mml: &str);
}

/// Owned form of a timeline notification, for channel-based observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    /// The note collection changed
    NotesChanged(Vec<Note>),
    /// New MML text was generated
    MmlGenerated(String),
}

/// A channel sender acts as an observer that forwards owned events.
///
/// A disconnected receiver is ignored; the store keeps running.
impl TimelineObserver for Sender<TimelineEvent> {
    fn on_notes_changed(&mut self, notes: &[Note]) {
        let _ = self.send(TimelineEvent::NotesChanged(notes.to_vec()));
    }

    fn on_mml_generated(&mut self, mml: &str) {
        let _ = self.send(TimelineEvent::MmlGenerated(mml.to_string()));
    }
}
