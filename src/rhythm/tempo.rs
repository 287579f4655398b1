/// Seconds between two beats at `bpm`.
#[inline]
pub fn seconds_per_beat(bpm: f64) -> f64 {
    60.0 / bpm
}

/// Whether `bpm` can drive a schedule: finite and strictly positive.
#[inline]
pub fn is_valid_tempo(bpm: f64) -> bool {
    bpm.is_finite() && bpm > 0.0
}

/// Tempo bounds offered for a ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl TempoRange {
    pub fn clamp(&self, bpm: f64) -> f64 {
        if bpm.is_nan() {
            return self.default;
        }
        bpm.clamp(self.min, self.max)
    }

    pub fn contains(&self, bpm: f64) -> bool {
        (self.min..=self.max).contains(&bpm)
    }
}
