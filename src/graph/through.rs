use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through connects two nodes in series, passing the output of the first (source)
into the second (effect), which processes the buffer in place:

  Through: [Source] ──→ [Effect] ──→ output

  Amplify: [Signal] ──┬──→ (×) ──→ output
           [Mod]    ──┘

A typical cue chain filters first and shapes the gain last:

  OscNode::sine().with_frequency(400.0).sweep_to(3000.0, 0.05)
      .through(FilterNode::lowpass(2500.0))
      .amplify(EnvNode::decay(0.4, 0.3))
*/

pub struct Through<S, F> {
    source: S,
    effect: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, effect: F) -> Self {
        Self { source, effect }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.effect.render_block(out, ctx);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source.note_on(ctx);
        self.effect.note_on(ctx);
    }

    fn is_active(&self) -> bool {
        self.source.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        envelope::EnvNode, extensions::NodeExt, filter::FilterNode, oscillator::OscNode,
    };

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak(buffer: &[f32]) -> f32 {
        buffer.iter().fold(0.0f32, |acc, x| acc.max(x.abs()))
    }

    #[test]
    fn renders_source_then_effect() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut dry = OscNode::sine().with_frequency(6_000.0);
        let mut wet = OscNode::sine()
            .with_frequency(6_000.0)
            .through(FilterNode::lowpass(500.0));
        dry.note_on(&ctx);
        wet.note_on(&ctx);

        let mut dry_buffer = vec![0.0f32; 1024];
        let mut wet_buffer = vec![0.0f32; 1024];
        dry.render_block(&mut dry_buffer, &ctx);
        wet.render_block(&mut wet_buffer, &ctx);

        assert!(peak(&wet_buffer[256..]) < peak(&dry_buffer[256..]) * 0.3);
    }

    #[test]
    fn forwards_trigger_to_both_stages() {
        let ctx = RenderCtx::new(SAMPLE_RATE);
        let mut node = OscNode::noise()
            .amplify(EnvNode::decay(0.7, 0.15))
            .through(FilterNode::highpass(1_000.0));
        assert!(!node.is_active());

        node.note_on(&ctx);
        assert!(node.is_active());

        let mut buffer = vec![0.0f32; 256];
        node.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().any(|&s| s != 0.0));
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
