//! Short approach-beat cues shared by several voices.

use crate::{
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode},
    synth::Patch,
};

/// 800 Hz sine tick, 0.4 → 0.01 over 50 ms.
pub fn high_tick() -> Patch {
    let tick = OscNode::sine()
        .with_frequency(800.0)
        .amplify(EnvNode::decay(0.4, 0.05));

    Patch::new(tick, 0.1)
}

/// Very short 1.2 kHz triangle click. Decays further than the other cues
/// (down to 0.001) so it reads as a click, not a tone.
pub fn click() -> Patch {
    let click = OscNode::triangle()
        .with_frequency(1_200.0)
        .amplify(EnvNode::ramp(0.4, 0.001, 0.03));

    Patch::new(click, 0.05)
}
