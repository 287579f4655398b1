use crate::MIN_TIME;

/*
Exponential Ramp Envelope
=========================

Percussive cues do not need a full ADSR. Every sound in this crate is shaped
the same way a browser audio graph shapes a one-shot:

    param.setValueAtTime(start, t0)
    param.exponentialRampToValueAtTime(target, t0 + duration)

i.e. the value jumps to `start`, glides exponentially to `target`, then holds
at `target` until the voice is stopped.

  Level
  start ┐
        │╲
        │ ╲
        │  ╲__
        │     ‾‾‾──────── target (held)
    0.0 └──────────────────────→ Time
        t0        t0+duration

The Math
--------

An exponential ramp multiplies the level by the same factor every sample:

    value(t) = start · (target / start)^(t / duration)

Per sample that is a constant coefficient:

    coeff = (target / start)^(1 / (duration · sample_rate))

so `level *= coeff` each sample, and after `duration · sample_rate` samples
the level has arrived at `target`. The remaining-sample counter snaps the
level to exactly `target` to avoid float drift.

Both `start` and `target` must have the same sign and be non-zero for the
ramp to be defined. Values are clamped to at least `MIN_LEVEL`.

The same ramp drives amplitude (gain envelopes) and frequency (pitch sweeps).
*/

/// Smallest level an exponential ramp may start from or aim at.
pub const MIN_LEVEL: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle, // Not triggered yet, level = 0
    Ramp, // Gliding from start to target
    Hold, // Arrived at target, holding
}

pub struct ExpEnvelope {
    start: f32,
    target: f32,
    duration: f32,

    state: EnvelopeState,
    level: f32,
    coeff: f32,
    remaining_samples: u32,
}

impl ExpEnvelope {
    pub fn new(start: f32, target: f32, duration: f32) -> Self {
        Self {
            start: start.max(MIN_LEVEL),
            target: target.max(MIN_LEVEL),
            duration: duration.max(MIN_TIME),
            state: EnvelopeState::Idle,
            level: 0.0,
            coeff: 1.0,
            remaining_samples: 0,
        }
    }

    /// Jump to the start level and begin the ramp.
    pub fn note_on(&mut self, sample_rate: f32) {
        let samples = (self.duration * sample_rate).round().max(1.0);
        self.coeff = (self.target / self.start).powf(1.0 / samples);
        self.remaining_samples = samples as u32;
        self.level = self.start;
        self.state = EnvelopeState::Ramp;
    }

    /// Current value, then advance one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let value = self.level;

        if let EnvelopeState::Ramp = self.state {
            self.remaining_samples -= 1;
            if self.remaining_samples == 0 {
                self.level = self.target;
                self.state = EnvelopeState::Hold;
            } else {
                self.level *= self.coeff;
            }
        }

        value
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, EnvelopeState::Idle)
    }

    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
        self.remaining_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn start_level(&self) -> f32 {
        self.start
    }

    pub fn target_level(&self) -> f32 {
        self.target
    }
}
