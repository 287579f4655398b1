//! Titanium driver voice (`driver1`).
//!
//! The impact is a bright metallic "ping": a sine that shoots up from 400 Hz
//! to 3 kHz in 50 ms, like the sound of a titanium face at contact.
//!
//! # How It Works
//!
//! 1. Sine oscillator swept exponentially 400 Hz → 3 kHz over 50 ms
//! 2. Low-pass at 2.5 kHz keeps the top of the sweep from getting shrill
//! 3. Gain drops 0.4 → 0.01 over the full 0.3 s
//! 4. A reverb send gives the ping some space
//!
//! Approach beats use the shared high tick.

use crate::{
    graph::{envelope::EnvNode, extensions::NodeExt, filter::FilterNode, oscillator::OscNode},
    synth::Patch,
    voices::{ticks::high_tick, REVERB_SEND},
};

pub fn titanium(is_impact: bool) -> Patch {
    if !is_impact {
        return high_tick();
    }

    let ping = OscNode::sine()
        .with_frequency(400.0)
        .sweep_to(3_000.0, 0.05)
        .through(FilterNode::lowpass(2_500.0))
        .amplify(EnvNode::decay(0.4, 0.3));

    Patch::new(ping, 0.3).with_reverb(REVERB_SEND)
}
