//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! Oscillators, envelopes and filters are allocation-free per sample and can
//! be embedded directly inside nodes. The convolver allocates its FFT buffers
//! once up front and is used when a cue is rendered, never on the audio
//! thread.

/// FFT convolution and the decaying-noise room response.
pub mod convolver;
/// Exponential ramp envelope (gain envelopes and pitch sweeps).
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Oscillator waveforms and noise sources.
pub mod oscillator;

pub use envelope::EnvelopeState;
