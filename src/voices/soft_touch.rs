//! Soft-touch approach voice (`approach2`).
//!
//! Round sine tones. The impact rings out like a small bell for 0.4 s with a
//! reverb send; approach beats are a quieter, shorter 800 Hz tone.

use crate::{
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode},
    synth::Patch,
    voices::REVERB_SEND,
};

pub fn soft_touch(is_impact: bool) -> Patch {
    if is_impact {
        let bell = OscNode::sine()
            .with_frequency(1_200.0)
            .amplify(EnvNode::decay(1.2, 0.4));
        Patch::new(bell, 0.4).with_reverb(REVERB_SEND)
    } else {
        let tone = OscNode::sine()
            .with_frequency(800.0)
            .amplify(EnvNode::decay(0.5, 0.1));
        Patch::new(tone, 0.15)
    }
}
