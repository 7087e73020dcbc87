//! Edit scripts.
//!
//! A script is a JSON array of edit commands replayed against a timeline in
//! order, e.g.
//!
//! ```json
//! [
//!   {"op": "toggle", "step": 0, "pitch": 48, "length": 4},
//!   {"op": "resize", "id": 0, "duration": 8},
//!   {"op": "volume", "value": 100}
//! ]
//! ```

use crate::timeline::{AddNoteOptions, NoteId, Timeline};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading an edit script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Script could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Script is not a valid command list
    #[error("script parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_length() -> u32 {
    AddNoteOptions::default().note_length_steps
}

/// One edit applied to a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditCommand {
    /// Add or remove the note starting at a cell
    Toggle {
        step: u32,
        pitch: u32,
        #[serde(default = "default_length")]
        length: u32,
    },
    /// Move a note to a new start step and pitch
    Move { id: NoteId, step: i64, pitch: i64 },
    /// Change the duration of a note
    Resize { id: NoteId, duration: i64 },
    /// Set the volume (0-100)
    Volume { value: u8 },
    /// Revert the last edit
    Undo,
    /// Re-apply the last undone edit
    Redo,
}

impl EditCommand {
    /// Applies this command to a timeline.
    ///
    /// Stale ids and empty undo/redo stacks are no-ops, as on the timeline
    /// itself.
    pub fn apply(&self, timeline: &mut Timeline) {
        match *self {
            EditCommand::Toggle {
                step,
                pitch,
                length,
            } => {
                timeline.toggle_note(step, pitch, AddNoteOptions::with_length(length));
            }
            EditCommand::Move { id, step, pitch } => {
                timeline.move_note(id, step, pitch);
            }
            EditCommand::Resize { id, duration } => {
                timeline.resize_note(id, duration);
            }
            EditCommand::Volume { value } => timeline.set_volume(value),
            EditCommand::Undo => {
                timeline.undo();
            }
            EditCommand::Redo => {
                timeline.redo();
            }
        }
    }
}

/// Parses a script from JSON text.
///
/// # Errors
///
/// Returns error if the text is not a JSON array of commands
pub fn parse_script(json: &str) -> Result<Vec<EditCommand>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Loads a script from a JSON file.
///
/// # Errors
///
/// Returns error if file reading or parsing fails
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<EditCommand>, ScriptError> {
    let json = fs::read_to_string(path)?;
    parse_script(&json)
}

/// Applies every command of a script in order.
pub fn run_script(timeline: &mut Timeline, commands: &[EditCommand]) {
    for command in commands {
        command.apply(timeline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::LayoutConfig;

    fn one_bar() -> Timeline {
        Timeline::new(LayoutConfig::new(1, 16, 49, 0).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        let commands = parse_script(
            r#"[
                {"op": "toggle", "step": 0, "pitch": 48, "length": 4},
                {"op": "toggle", "step": 2, "pitch": 50},
                {"op": "move", "id": 0, "step": -1, "pitch": 60},
                {"op": "resize", "id": 1, "duration": 3},
                {"op": "volume", "value": 90},
                {"op": "undo"},
                {"op": "redo"}
            ]"#,
        )
        .unwrap();

        assert_eq!(commands.len(), 7);
        assert_eq!(
            commands[1],
            EditCommand::Toggle {
                step: 2,
                pitch: 50,
                length: 1
            }
        );
        assert_eq!(
            commands[2],
            EditCommand::Move {
                id: NoteId::from_raw(0),
                step: -1,
                pitch: 60
            }
        );
        assert_eq!(commands[5], EditCommand::Undo);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_script(r#"[{"op": "explode"}]"#),
            Err(ScriptError::Parse(_))
        ));
        assert!(matches!(
            load_script("/nonexistent/script.json"),
            Err(ScriptError::Io(_))
        ));
    }

    #[test]
    fn test_run_staggered_chord() {
        let mut timeline = one_bar();
        let commands = parse_script(
            r#"[
                {"op": "toggle", "step": 0, "pitch": 48, "length": 4},
                {"op": "toggle", "step": 0, "pitch": 52, "length": 4},
                {"op": "resize", "id": 1, "duration": 8}
            ]"#,
        )
        .unwrap();

        run_script(&mut timeline, &commands);
        assert_eq!(timeline.mml(), "l16 v101 [o5co5e]4 o5e4 r8");
    }

    #[test]
    fn test_stale_commands_are_ignored() {
        let mut timeline = one_bar();
        let commands = vec![
            EditCommand::Move {
                id: NoteId::from_raw(9),
                step: 0,
                pitch: 0,
            },
            EditCommand::Resize {
                id: NoteId::from_raw(9),
                duration: 2,
            },
            EditCommand::Undo,
        ];

        run_script(&mut timeline, &commands);
        assert_eq!(timeline.note_count(), 0);
        assert_eq!(timeline.mml(), "l16 v101 r16");
    }

    #[test]
    fn test_command_serialization() {
        let json = serde_json::to_string(&EditCommand::Volume { value: 70 }).unwrap();
        assert_eq!(json, r#"{"op":"volume","value":70}"#);
    }
}
