//! Aligning a reference swing video with the metronome.
//!
//! Each ratio has a reference clip recorded at the ratio's default tempo,
//! whose impact lands at a known time. Played back at `bpm / default`, the
//! clip's impact must coincide with the audio impact, which comes
//! `impact_index` beats after the first beat.

use crate::rhythm::{seconds_per_beat, Ratio};

/// Where the impact falls in the reference clip, at normal speed.
pub const fn reference_impact_time(ratio: Ratio) -> f64 {
    match ratio {
        Ratio::ThreeToOne => 0.87,
        Ratio::TwoToOne => 1.02,
    }
}

/// Playback speed of the reference clip at `bpm`.
pub fn playback_rate(ratio: Ratio, bpm: f64) -> f64 {
    bpm / ratio.tempo_range().default
}

/// Time from the first beat of a cycle to its impact.
pub fn audio_impact_offset(ratio: Ratio, bpm: f64) -> f64 {
    ratio.impact_index() as f64 * seconds_per_beat(bpm)
}

/// How to start the clip when the first beat sounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VideoStart {
    /// Start playing immediately from this position, in clip seconds.
    Seek(f64),
    /// Start from the beginning after this many seconds.
    Delay(f64),
}

/// Start position for the clip so that its impact meets the audio impact.
/// `user_offset` shifts the clip later (positive) or earlier, in seconds.
pub fn video_start(ratio: Ratio, bpm: f64, playback_rate: f64, user_offset: f64) -> VideoStart {
    let impact_in_clip = reference_impact_time(ratio) / playback_rate;
    let start = impact_in_clip - audio_impact_offset(ratio, bpm) + user_offset;
    if start >= 0.0 {
        VideoStart::Seek(start)
    } else {
        VideoStart::Delay(-start)
    }
}
