//! Grid layout of the piano roll.
//!
//! The layout fixes the length of the timeline (bars x steps per bar) and the
//! playable pitch range. It is supplied once when a timeline is created and
//! never changes afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when building a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The timeline must hold at least one bar
    #[error("bar count must be at least 1")]
    NoBars,
    /// Steps per bar must be positive
    #[error("steps per bar must be at least 1")]
    NoSteps,
    /// Quarter-beat grid lines need steps per bar divisible by 4
    #[error("steps per bar ({0}) must be a multiple of 4")]
    UnevenBeats(u32),
    /// The keyboard must have at least one key
    #[error("key count must be at least 1")]
    NoKeys,
    /// Step count or pitch range does not fit in 32 bits
    #[error("layout dimensions overflow the step or pitch range")]
    TooLarge,
}

/// Grid dimensions shared by the store and the MML compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Number of bars (measures) on the timeline.
    pub bars: u32,

    /// Number of steps in one bar.
    pub steps_per_bar: u32,

    /// Number of keys shown on the keyboard.
    pub key_count: u32,

    /// Pitch index of the lowest key.
    pub pitch_range_start: u32,
}

impl LayoutConfig {
    /// Creates a validated layout.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if any dimension is zero or the bar cannot
    /// be split into quarter beats.
    pub fn new(
        bars: u32,
        steps_per_bar: u32,
        key_count: u32,
        pitch_range_start: u32,
    ) -> Result<Self, LayoutError> {
        let layout = Self {
            bars,
            steps_per_bar,
            key_count,
            pitch_range_start,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Checks the construction-time invariants of this layout.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.bars == 0 {
            return Err(LayoutError::NoBars);
        }
        if self.steps_per_bar == 0 {
            return Err(LayoutError::NoSteps);
        }
        if !self.steps_per_bar.is_multiple_of(4) {
            return Err(LayoutError::UnevenBeats(self.steps_per_bar));
        }
        if self.key_count == 0 {
            return Err(LayoutError::NoKeys);
        }
        self.bars
            .checked_mul(self.steps_per_bar)
            .ok_or(LayoutError::TooLarge)?;
        self.pitch_range_start
            .checked_add(self.key_count - 1)
            .ok_or(LayoutError::TooLarge)?;
        Ok(())
    }

    /// Returns the generation horizon in steps.
    pub fn total_steps(&self) -> u32 {
        self.bars * self.steps_per_bar
    }

    /// Returns the highest playable pitch index.
    pub fn pitch_range_end(&self) -> u32 {
        self.pitch_range_start + self.key_count.saturating_sub(1)
    }
}

impl Default for LayoutConfig {
    /// Eight bars of sixteen steps over 49 keys (C1 to C5).
    fn default() -> Self {
        Self {
            bars: 8,
            steps_per_bar: 16,
            key_count: 49,
            pitch_range_start: 0,
        }
    }
}
