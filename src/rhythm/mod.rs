//! Swing rhythm: ratios, the beat-cycle state machine and tempo helpers.

pub mod cycle;
pub mod ratio;
pub mod tempo;

pub use cycle::{Beat, BeatCycle};
pub use ratio::Ratio;
pub use tempo::{is_valid_tempo, seconds_per_beat, TempoRange};
