use crate::{
    dsp::filter::SVFilter,
    graph::node::{GraphNode, RenderCtx},
};

/*
Filter Node
===========

Wraps the state-variable filter so it can sit in a cue chain:

  // Impact ping: keep the sweep from getting shrill
  OscNode::sine().with_frequency(400.0).sweep_to(3000.0, 0.05)
      .through(FilterNode::lowpass(2500.0))

  // Noise burst: drop the rumble, keep the "tss"
  OscNode::noise().through(FilterNode::highpass(1000.0))

Cutoff guide for percussive cues:
  500 Hz    dull thud
  1000 Hz   woody knock (as a high-pass: crisp brush)
  2500 Hz   bright but not piercing
  8000 Hz+  barely filtered

Filter state is cleared on every trigger so each cue starts from silence
rather than from the tail of the previous one.
*/

pub struct FilterNode {
    filter: SVFilter,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::lowpass(cutoff_hz),
        }
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::highpass(cutoff_hz),
        }
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::bandpass(cutoff_hz),
        }
    }

    pub fn with_resonance(mut self, resonance: f32) -> Self {
        self.filter.set_resonance(resonance);
        self
    }

    pub fn cutoff(&self) -> f32 {
        self.filter.cutoff_hz
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.filter.reset();
    }
}
