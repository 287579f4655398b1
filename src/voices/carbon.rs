//! Carbon driver voice (`driver2`).
//!
//! A falling sawtooth "whoosh" for the impact and a hollow square beep for
//! the approach beats. The loudest of the driver voices: the impact starts
//! above unity gain and relies on the output clamp.

use crate::{
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode},
    synth::Patch,
    voices::REVERB_SEND,
};

pub fn carbon(is_impact: bool) -> Patch {
    if is_impact {
        // Saw drops 800 → 100 Hz while the gain decays over 0.3 s
        let whoosh = OscNode::sawtooth()
            .with_frequency(800.0)
            .sweep_to(100.0, 0.2)
            .amplify(EnvNode::decay(1.5, 0.3));

        Patch::new(whoosh, 0.3).with_reverb(REVERB_SEND)
    } else {
        let beep = OscNode::square()
            .with_frequency(600.0)
            .amplify(EnvNode::decay(0.5, 0.05));

        Patch::new(beep, 0.1)
    }
}
