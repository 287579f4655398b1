//! Convolution reverb - one fixed impulse response, applied with the FFT.
//!
//! Every reverberant cue in this crate is a short one-shot (well under a
//! second), rendered completely before it is queued for playback. That lets
//! the reverb be a single linear convolution of the whole dry buffer with the
//! impulse response instead of a streaming, partitioned convolver:
//!
//! ```text
//! dry ──→ zero-pad ──→ FFT ──┐
//!                            ├──→ (×) ──→ IFFT ──→ wet (dry.len + ir.len - 1)
//! IR  ──→ zero-pad ──→ FFT ──┘   (IR spectrum computed once, cached)
//! ```
//!
//! The FFT length is the next power of two that holds the longest allowed
//! input plus the impulse response, so circular wrap-around never folds the
//! tail back onto the start.
//!
//! # Impulse Response
//!
//! The room is a burst of white noise with a quadratic fade:
//!
//! ```text
//! ir[i] = noise[i] · (1 - i / len)²
//! ```
//!
//! Raw, its energy grows with its length, so the response is normalised to
//! unit energy: the wet signal then sits at roughly the level of the dry one
//! and the send gain alone decides how much room is heard.

use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Length of the built-in room response.
pub const IMPULSE_SECONDS: f32 = 0.5;

const IMPULSE_SEED: u64 = 0x0DEC_A7ED;

/// Decaying-noise impulse response, normalised to unit energy.
pub fn decaying_noise_impulse(sample_rate: f32, seconds: f32) -> Vec<f32> {
    let len = ((sample_rate * seconds) as usize).max(1);
    let mut rng = StdRng::seed_from_u64(IMPULSE_SEED);

    let mut impulse: Vec<f32> = (0..len)
        .map(|i| {
            let decay = (1.0 - i as f32 / len as f32).powi(2);
            rng.gen_range(-1.0f32..1.0) * decay
        })
        .collect();

    let energy: f32 = impulse.iter().map(|x| x * x).sum();
    if energy > 0.0 {
        let scale = energy.sqrt().recip();
        for sample in &mut impulse {
            *sample *= scale;
        }
    }

    impulse
}

pub struct Convolver {
    impulse_len: usize,
    fft_len: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    impulse_spectrum: Vec<Complex<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Convolver {
    /// Prepare a convolver for inputs of up to `max_input_len` samples.
    pub fn new(impulse: &[f32], max_input_len: usize) -> Self {
        let impulse_len = impulse.len().max(1);
        let fft_len = (max_input_len.max(1) + impulse_len - 1).next_power_of_two();

        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);

        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let mut scratch = vec![Complex::new(0.0, 0.0); scratch_len];

        let mut impulse_spectrum = vec![Complex::new(0.0, 0.0); fft_len];
        for (bin, &sample) in impulse_spectrum.iter_mut().zip(impulse) {
            bin.re = sample;
        }
        forward.process_with_scratch(&mut impulse_spectrum, &mut scratch);

        Self {
            impulse_len,
            fft_len,
            forward,
            inverse,
            impulse_spectrum,
            buffer: vec![Complex::new(0.0, 0.0); fft_len],
            scratch,
        }
    }

    /// Longest input that convolves without wrap-around.
    pub fn max_input_len(&self) -> usize {
        self.fft_len - self.impulse_len + 1
    }

    pub fn impulse_len(&self) -> usize {
        self.impulse_len
    }

    /// Full linear convolution of `input` with the impulse response.
    ///
    /// The result is `input.len() + impulse_len - 1` samples long. Input past
    /// `max_input_len` is ignored.
    pub fn convolve(&mut self, input: &[f32]) -> Vec<f32> {
        let input = &input[..input.len().min(self.max_input_len())];
        if input.is_empty() {
            return Vec::new();
        }

        self.buffer.fill(Complex::new(0.0, 0.0));
        for (bin, &sample) in self.buffer.iter_mut().zip(input) {
            bin.re = sample;
        }

        self.forward
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        for (bin, ir) in self.buffer.iter_mut().zip(&self.impulse_spectrum) {
            *bin *= *ir;
        }
        self.inverse
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        // rustfft leaves the inverse unnormalised.
        let scale = 1.0 / self.fft_len as f32;
        let out_len = input.len() + self.impulse_len - 1;
        self.buffer[..out_len].iter().map(|c| c.re * scale).collect()
    }
}
