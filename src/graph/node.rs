/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Seconds since the node was triggered, at the start of the block
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            time: 0.0,
        }
    }

    /// Context for a block starting `time` seconds into the voice.
    pub fn at(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }
}

/// A block-rendering stage in a cue graph.
///
/// Cue voices are one-shots: they are triggered once with `note_on` and then
/// rendered until the patch's stop time.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Start the voice from its initial state. Stateless nodes ignore it.
    fn note_on(&mut self, _ctx: &RenderCtx) {}

    /// Whether the node still has anything to contribute.
    fn is_active(&self) -> bool {
        true
    }
}

impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        (**self).note_on(ctx)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
