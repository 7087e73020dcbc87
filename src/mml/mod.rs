//! MML generation from a note snapshot.
//!
//! The compiler walks the chord groups of a snapshot left to right, filling
//! gaps with rests and splitting chords with staggered note-offs into
//! duration segments. Output has the shape
//! `l16 v<vol> (o<oct><name><len> | [<tokens>]<len> | r<len>)*`.

mod segment;

pub use segment::{group_by_start, NoteGroup, Segment};

use crate::timeline::{LayoutConfig, Note, MAX_VOLUME};

/// Base subdivision declared in the MML header (`l16`).
pub const BASE_LENGTH: u32 = 16;

/// MML note names within an octave, sharps written with `+`.
pub const PITCH_NAMES: [&str; 12] = [
    "c", "c+", "d", "d+", "e", "f", "f+", "g", "g+", "a", "a+", "b",
];

/// Converts a pitch index to an MML note token without length.
///
/// # Examples
///
/// ```
/// use mmlroll::mml::pitch_token;
///
/// assert_eq!(pitch_token(48), "o5c");
/// assert_eq!(pitch_token(13), "o2c+");
/// ```
pub fn pitch_token(pitch: u32) -> String {
    let octave = pitch / 12 + 1;
    let name = PITCH_NAMES[(pitch % 12) as usize];
    format!("o{}{}", octave, name)
}

/// Scales a 0-100 volume to the 0-127 MML volume value (rounded down).
pub fn volume_value(volume: u8) -> u32 {
    volume.min(MAX_VOLUME) as u32 * 127 / 100
}

/// Converts a step count to MML length units.
///
/// The result is not rounded: a layout whose bar does not divide evenly
/// into the base subdivision yields fractional lengths.
pub fn length_units(steps: u32, steps_per_bar: u32) -> f64 {
    (steps as f64 * BASE_LENGTH as f64) / steps_per_bar as f64
}

/// Formats a length for output: whole values without a fraction
/// (`4`), others with the shortest exact decimal (`1.3333333333333333`).
fn format_length(units: f64) -> String {
    format!("{}", units)
}

fn rest_token(steps: u32, layout: &LayoutConfig) -> String {
    format!("r{}", format_length(length_units(steps, layout.steps_per_bar)))
}

fn segment_token(segment: &Segment, layout: &LayoutConfig) -> String {
    let length = format_length(length_units(segment.steps, layout.steps_per_bar));
    if segment.is_chord() {
        let voices: String = segment.pitches.iter().map(|&p| pitch_token(p)).collect();
        format!("[{}]{}", voices, length)
    } else {
        let pitch = segment.pitches.first().copied().unwrap_or_default();
        format!("{}{}", pitch_token(pitch), length)
    }
}

/// Compiles a note snapshot into MML text.
///
/// Pure and deterministic: the same notes, layout and volume always yield
/// the same string.
///
/// # Arguments
///
/// * `notes` - Snapshot of the note collection
/// * `layout` - Grid layout supplying the bar length and horizon
/// * `volume` - Volume setting (0-100)
///
/// # Examples
///
/// ```
/// use mmlroll::{compile, LayoutConfig};
///
/// let layout = LayoutConfig::new(1, 16, 49, 0).unwrap();
/// assert_eq!(compile(&[], &layout, 80), "l16 v101 r16");
/// ```
pub fn compile(notes: &[Note], layout: &LayoutConfig, volume: u8) -> String {
    let mut tokens = vec![format!("l{}", BASE_LENGTH), format!("v{}", volume_value(volume))];
    let mut current_step = 0u32;

    for group in group_by_start(notes) {
        if group.start_step > current_step {
            tokens.push(rest_token(group.start_step - current_step, layout));
        }
        tokens.extend(
            group
                .segments()
                .iter()
                .map(|segment| segment_token(segment, layout)),
        );
        // The cursor follows the longest voice of the latest group, even if
        // an earlier group is still sounding past it.
        current_step = group.start_step.saturating_add(group.span());
    }

    let total_steps = layout.total_steps();
    if current_step < total_steps {
        tokens.push(rest_token(total_steps - current_step, layout));
    }

    tokens.join(" ").trim_end().to_string()
}
