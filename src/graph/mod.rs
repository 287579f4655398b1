//! Composable building blocks for constructing cue graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with the ergonomics needed
//! for sound design: a trigger event and block-based rendering. The
//! `extensions` module adds fluent helpers so cues can be authored with a
//! clear, chainable API.

/// Multiply two signals together (gain stage).
pub mod amplify;
/// Exponential gain envelope node.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.through()`, `.boxed()`).
pub mod extensions;
/// State-variable filter node.
pub mod filter;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators with optional pitch sweep, and noise.
pub mod oscillator;
/// Serial chaining of two nodes (source → effect).
pub mod through;
