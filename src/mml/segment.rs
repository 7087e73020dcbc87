//! Chord grouping and duration segmentation.
//!
//! Notes that start on the same step form a chord group. MML has no way to
//! release one voice of a chord early, so a group whose notes end at
//! different steps is split into consecutive segments, one per distinct
//! note-off point, each listing the voices still sounding.

use crate::timeline::Note;
use std::collections::{BTreeMap, BTreeSet};

/// Notes sharing one start step, in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGroup<'a> {
    /// Common start step of every note in the group.
    pub start_step: u32,

    /// Member notes in the order they appear in the snapshot.
    pub notes: Vec<&'a Note>,
}

/// A stretch of a chord group during which the same set of pitches sounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Pitches sounding throughout the segment, in group order.
    pub pitches: Vec<u32>,

    /// Segment length in steps.
    pub steps: u32,
}

impl Segment {
    /// Returns true if the segment plays more than one pitch.
    pub fn is_chord(&self) -> bool {
        self.pitches.len() > 1
    }
}

/// Groups a note snapshot by start step, ascending.
///
/// Notes with equal start steps keep their relative snapshot order.
pub fn group_by_start(notes: &[Note]) -> Vec<NoteGroup<'_>> {
    let mut by_step: BTreeMap<u32, Vec<&Note>> = BTreeMap::new();
    for note in notes {
        by_step.entry(note.start_step).or_default().push(note);
    }
    by_step
        .into_iter()
        .map(|(start_step, notes)| NoteGroup { start_step, notes })
        .collect()
}

impl NoteGroup<'_> {
    /// Returns the longest duration in the group, in steps.
    pub fn span(&self) -> u32 {
        self.notes
            .iter()
            .map(|n| n.duration_steps)
            .max()
            .unwrap_or(0)
    }

    /// Splits the group into duration segments.
    ///
    /// For each distinct duration `d` in ascending order, the segment running
    /// from the previous boundary to `d` holds every note whose duration
    /// exceeds the previous boundary. Empty segments are skipped.
    pub fn segments(&self) -> Vec<Segment> {
        let boundaries: BTreeSet<u32> = self.notes.iter().map(|n| n.duration_steps).collect();

        let mut segments = Vec::with_capacity(boundaries.len());
        let mut previous = 0;
        for boundary in boundaries {
            let steps = boundary.saturating_sub(previous);
            if steps > 0 {
                let pitches = self
                    .notes
                    .iter()
                    .filter(|n| n.duration_steps > previous)
                    .map(|n| n.pitch)
                    .collect();
                segments.push(Segment { pitches, steps });
            }
            previous = boundary;
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::NoteId;

    fn note(id: u64, start: u32, duration: u32, pitch: u32) -> Note {
        Note::new(NoteId::from_raw(id), start, duration, pitch)
    }

    #[test]
    fn test_grouping_sorted_and_stable() {
        let notes = vec![
            note(0, 8, 1, 60),
            note(1, 0, 1, 52),
            note(2, 8, 1, 55),
            note(3, 0, 1, 48),
        ];
        let groups = group_by_start(&notes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].start_step, 0);
        let pitches: Vec<_> = groups[0].notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![52, 48]);
        assert_eq!(groups[1].start_step, 8);
        let pitches: Vec<_> = groups[1].notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 55]);
    }

    #[test]
    fn test_uniform_chord_is_one_segment() {
        let notes = vec![note(0, 0, 4, 48), note(1, 0, 4, 52)];
        let groups = group_by_start(&notes);
        let segments = groups[0].segments();
        assert_eq!(
            segments,
            vec![Segment {
                pitches: vec![48, 52],
                steps: 4
            }]
        );
        assert!(segments[0].is_chord());
        assert_eq!(groups[0].span(), 4);
    }

    #[test]
    fn test_staggered_note_offs() {
        let notes = vec![note(0, 0, 2, 48), note(1, 0, 8, 55), note(2, 0, 4, 52)];
        let groups = group_by_start(&notes);
        let segments = groups[0].segments();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].pitches, vec![48, 55, 52]);
        assert_eq!(segments[0].steps, 2);
        assert_eq!(segments[1].pitches, vec![55, 52]);
        assert_eq!(segments[1].steps, 2);
        assert_eq!(segments[2].pitches, vec![55]);
        assert_eq!(segments[2].steps, 4);
        assert!(!segments[2].is_chord());

        // Segments tile the group without gaps
        let total: u32 = segments.iter().map(|s| s.steps).sum();
        assert_eq!(total, groups[0].span());
    }

    #[test]
    fn test_zero_length_segment_skipped() {
        let mut silent = note(0, 0, 1, 48);
        silent.duration_steps = 0;
        let notes = vec![silent, note(1, 0, 4, 52)];
        let groups = group_by_start(&notes);
        let segments = groups[0].segments();
        assert_eq!(
            segments,
            vec![Segment {
                pitches: vec![52],
                steps: 4
            }]
        );
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(group_by_start(&[]).is_empty());
    }
}
