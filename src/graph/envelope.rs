use crate::{
    dsp::envelope::ExpEnvelope,
    graph::node::{GraphNode, RenderCtx},
};

/// Default floor for exponential gain ramps.
pub const DECAY_FLOOR: f32 = 0.01;

/// Gain envelope node: outputs the envelope level as a control signal.
///
/// Use with `.amplify()` to shape a source:
///
/// ```ignore
/// OscNode::sine().with_frequency(800.0).amplify(EnvNode::decay(0.4, 0.05))
/// ```
pub struct EnvNode {
    env: ExpEnvelope,
}

impl EnvNode {
    /// Jump to `peak`, then fall exponentially to `DECAY_FLOOR` over `seconds`.
    pub fn decay(peak: f32, seconds: f32) -> Self {
        Self::ramp(peak, DECAY_FLOOR, seconds)
    }

    /// Jump to `start`, then glide exponentially to `target` over `seconds`.
    pub fn ramp(start: f32, target: f32, seconds: f32) -> Self {
        Self {
            env: ExpEnvelope::new(start, target, seconds),
        }
    }

    pub fn level(&self) -> f32 {
        self.env.level()
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.env.render(out);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.env.note_on(ctx.sample_rate);
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}
