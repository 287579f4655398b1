//! Wedge approach voice (`approach1`).
//!
//! The impact is a short burst of high-passed noise: the "tss" of a wedge
//! brushing through turf rather than a pitched tone.
//!
//! # How It Works
//!
//! 1. White noise source
//! 2. High-pass at 1 kHz removes the rumble
//! 3. Gain 0.7 → 0.01 over 150 ms, cut at 200 ms
//! 4. Reverb send
//!
//! Approach beats use the shared triangle click.

use crate::{
    graph::{envelope::EnvNode, extensions::NodeExt, filter::FilterNode, oscillator::OscNode},
    synth::Patch,
    voices::{ticks::click, REVERB_SEND},
};

pub fn wedge(is_impact: bool) -> Patch {
    if !is_impact {
        return click();
    }

    let burst = OscNode::noise()
        .through(FilterNode::highpass(1_000.0))
        .amplify(EnvNode::decay(0.7, 0.15));

    Patch::new(burst, 0.2).with_reverb(REVERB_SEND)
}
