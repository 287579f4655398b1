use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{rhythm::Ratio, timing::DEFAULT_TICK_PERIOD, voices};

/// How the engine gets its ticks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingMode {
    /// Worker threads for ticks and beat callbacks. Falls back to `Polled`
    /// when a thread cannot be started.
    #[default]
    Threaded,
    /// The host calls `TempoEngine::poll()` from its own loop.
    Polled,
}

/// Initial settings of a [`TempoEngine`](crate::engine::TempoEngine).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub tempo_bpm: f64,
    pub ratio: Ratio,
    pub sound: String,
    pub volume: f32,
    /// Silence appended after each impact, in seconds.
    pub rest_seconds: f64,
    pub tick_period: Duration,
    /// Lookahead horizon: beats due before `now + schedule_ahead` are queued.
    pub schedule_ahead: f64,
    /// Delay of the first beat after `start()`.
    pub lead_in: f64,
    pub timing: TimingMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: 60.0,
            ratio: Ratio::ThreeToOne,
            sound: voices::DRIVER1.to_string(),
            volume: 1.0,
            rest_seconds: 3.0,
            tick_period: DEFAULT_TICK_PERIOD,
            schedule_ahead: 0.1,
            lead_in: 0.1,
            timing: TimingMode::Threaded,
        }
    }
}

impl EngineConfig {
    /// Defaults for a trainer: the ratio's reference tempo and style.
    pub fn for_ratio(ratio: Ratio) -> Self {
        Self {
            tempo_bpm: ratio.tempo_range().default,
            ratio,
            sound: voices::SoundStyle::default().variant(ratio).to_string(),
            ..Self::default()
        }
    }
}

/// Master volume as the engine stores it: `[0, 1]`, NaN silenced.
pub(crate) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Rest duration as the engine stores it: finite and non-negative.
pub(crate) fn clamp_rest(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}
