//! Precision approach voice (`approach3`).
//!
//! Dry digital square beeps, 1.5 kHz on the impact and 1 kHz otherwise.
//! No reverb: every beat is as short and exact as possible.

use crate::{
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode},
    synth::Patch,
};

pub fn precision(is_impact: bool) -> Patch {
    let (frequency, gain) = if is_impact { (1_500.0, 0.6) } else { (1_000.0, 0.3) };

    let beep = OscNode::square()
        .with_frequency(frequency)
        .amplify(EnvNode::decay(gain, 0.05));

    Patch::new(beep, 0.1)
}
