//! Pro-rhythm driver voice (`driver3`): a plain metronome.
//!
//! Same sine for every beat, higher and longer on the impact. Only the
//! impact gets the room.

use crate::{
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode},
    synth::Patch,
    voices::REVERB_SEND,
};

pub fn pro_rhythm(is_impact: bool) -> Patch {
    let (frequency, gain, decay) = if is_impact {
        (1_200.0, 1.0, 0.15)
    } else {
        (800.0, 0.6, 0.05)
    };

    let tone = OscNode::sine()
        .with_frequency(frequency)
        .amplify(EnvNode::decay(gain, decay));

    let patch = Patch::new(tone, 0.2);
    if is_impact {
        patch.with_reverb(REVERB_SEND)
    } else {
        patch
    }
}
