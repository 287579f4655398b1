use tracing::debug;

use crate::{
    dsp::convolver::{decaying_noise_impulse, Convolver, IMPULSE_SECONDS},
    graph::node::RenderCtx,
    synth::{patch::Patch, signal::Signal},
    voices::SoundRegistry,
    MAX_BLOCK_SIZE,
};

/// Longest dry cue the room response is sized for.
pub const MAX_CUE_SECONDS: f32 = 0.5;

/// Turns `(variant, is_impact)` into a rendered [`Signal`].
///
/// Cues are bounced ahead of time, on the scheduling side, so the audio
/// callback only ever mixes finished buffers:
///
/// ```text
/// registry ──→ Patch ──→ render blocks ──→ dry ──┬──────────────→ (+) ──→ Signal
///                                                └─→ × send ─→ room ─┘
/// ```
pub struct Synthesizer {
    registry: SoundRegistry,
    sample_rate: f32,
    room: Option<Convolver>,
}

impl Synthesizer {
    pub fn new(registry: SoundRegistry, sample_rate: f32) -> Self {
        Self {
            registry,
            sample_rate,
            room: None,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Follow the output device. The room response is rebuilt lazily.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate != self.sample_rate {
            debug!(from = self.sample_rate, to = sample_rate, "synthesizer sample rate changed");
            self.sample_rate = sample_rate;
            self.room = None;
        }
    }

    pub fn registry(&self) -> &SoundRegistry {
        &self.registry
    }

    /// Build the room response now instead of on the first reverberant cue.
    pub fn prepare(&mut self) {
        self.room();
    }

    /// Render the cue `variant` plays for a beat. Unknown variants use the
    /// registry's fallback; `None` only if that is missing too.
    pub fn render(&mut self, variant: &str, is_impact: bool) -> Option<Signal> {
        let patch = self.registry.patch(variant, is_impact)?;
        Some(self.bounce(patch))
    }

    /// Render a patch from its trigger to its stop time, plus the room tail
    /// when it has a reverb send.
    pub fn bounce(&mut self, mut patch: Patch) -> Signal {
        let sample_rate = self.sample_rate;
        let mut dry = vec![0.0f32; patch.frames(sample_rate)];

        let node = patch.node_mut();
        node.note_on(&RenderCtx::new(sample_rate));
        for (index, block) in dry.chunks_mut(MAX_BLOCK_SIZE).enumerate() {
            let time = (index * MAX_BLOCK_SIZE) as f64 / sample_rate as f64;
            node.render_block(block, &RenderCtx::at(sample_rate, time));
        }

        let send = match patch.reverb_send() {
            Some(send) if send > 0.0 && !dry.is_empty() => send,
            _ => return Signal::new(dry),
        };

        let wet = self.room().convolve(&dry);
        let mut out = dry;
        if wet.len() > out.len() {
            out.resize(wet.len(), 0.0);
        }
        for (o, w) in out.iter_mut().zip(wet.iter()) {
            *o += send * w;
        }
        Signal::new(out)
    }

    fn room(&mut self) -> &mut Convolver {
        let sample_rate = self.sample_rate;
        self.room.get_or_insert_with(|| {
            let impulse = decaying_noise_impulse(sample_rate, IMPULSE_SECONDS);
            let max_input = (MAX_CUE_SECONDS * sample_rate).ceil() as usize;
            Convolver::new(&impulse, max_input)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode},
        voices::{self, SoundRegistry},
    };

    const SAMPLE_RATE: f32 = 8_000.0;

    fn synth() -> Synthesizer {
        Synthesizer::new(SoundRegistry::builtin(), SAMPLE_RATE)
    }

    #[test]
    fn dry_cue_lasts_until_stop_time() {
        let mut synth = synth();
        let patch = Patch::new(OscNode::sine().with_frequency(800.0).amplify(EnvNode::decay(0.4, 0.05)), 0.1);
        let signal = synth.bounce(patch);

        assert_eq!(signal.len(), 800);
        assert!((signal.peak() - 0.4).abs() < 0.05, "peak {}", signal.peak());
    }

    #[test]
    fn reverb_send_adds_room_tail() {
        let mut synth = synth();
        let dry_patch = || Patch::new(OscNode::sine().with_frequency(1_200.0).amplify(EnvNode::decay(1.2, 0.4)), 0.4);

        let dry = synth.bounce(dry_patch());
        let wet = synth.bounce(dry_patch().with_reverb(0.2));

        let tail = (IMPULSE_SECONDS * SAMPLE_RATE) as usize - 1;
        assert_eq!(wet.len(), dry.len() + tail);
        assert!(wet.samples()[dry.len()..].iter().any(|s| s.abs() > 1e-4));
    }

    #[test]
    fn every_builtin_variant_renders_both_beats() {
        let mut synth = synth();
        for id in synth.registry().ids().into_iter().map(str::to_owned).collect::<Vec<_>>() {
            for is_impact in [false, true] {
                let signal = synth.render(&id, is_impact).expect("builtin variant");
                assert!(!signal.is_empty(), "{id} rendered nothing");
                assert!(signal.peak() > 0.05, "{id} impact={is_impact} is silent");
                assert!(signal.samples().iter().all(|s| s.is_finite()));
            }
        }
    }

    #[test]
    fn impact_and_approach_differ() {
        let mut synth = synth();
        let approach = synth.render(voices::DRIVER1, false).expect("driver1");
        let impact = synth.render(voices::DRIVER1, true).expect("driver1");

        assert_ne!(approach.len(), impact.len());
    }

    #[test]
    fn unknown_variant_falls_back() {
        let mut synth = synth();
        let fallback = synth.render(voices::DRIVER1, true).expect("driver1");
        let unknown = synth.render("no-such-sound", true).expect("fallback");

        assert_eq!(fallback, unknown);
    }

    #[test]
    fn empty_registry_renders_nothing() {
        let mut synth = Synthesizer::new(SoundRegistry::empty("missing"), SAMPLE_RATE);
        assert!(synth.render("anything", false).is_none());
    }

    #[test]
    fn sample_rate_change_rescales_cues() {
        let mut synth = synth();
        let before = synth.render(voices::APPROACH3, false).expect("approach3");
        synth.set_sample_rate(SAMPLE_RATE * 2.0);
        let after = synth.render(voices::APPROACH3, false).expect("approach3");

        assert_eq!(after.len(), before.len() * 2);
    }
}
