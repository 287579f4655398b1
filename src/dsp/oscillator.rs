use std::f32::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Seed for the noise generator. Noise bursts must sound identical on every
/// beat, so the generator restarts from this seed on `reset`.
const NOISE_SEED: u64 = 0x5717_6C0C;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

/// Phase-accumulating oscillator.
///
/// Phase is kept in `[0, 1)` and advanced by `frequency / sample_rate` each
/// sample, so the frequency can change per sample without discontinuities.
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
    rng: StdRng,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            rng: StdRng::seed_from_u64(NOISE_SEED),
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorWaveform::Saw)
    }

    pub fn square() -> Self {
        Self::new(OscillatorWaveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn noise() -> Self {
        Self::new(OscillatorWaveform::Noise)
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Restart at phase zero (and at the start of the noise sequence).
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.rng = StdRng::seed_from_u64(NOISE_SEED);
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = match self.waveform {
            OscillatorWaveform::Sine => (TAU * self.phase).sin(),
            OscillatorWaveform::Saw => 2.0 * self.phase - 1.0,
            OscillatorWaveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            OscillatorWaveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
            OscillatorWaveform::Noise => self.rng.gen_range(-1.0..1.0),
        };

        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();

        value
    }

    /// Fill `out` at a constant frequency.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }
}
