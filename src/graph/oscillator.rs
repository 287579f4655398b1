use crate::dsp::{envelope::ExpEnvelope, oscillator::OscillatorBlock};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Cue Oscillator
==============

The sound source of every cue. Metronome cues do not follow a keyboard, so an
oscillator always runs at a fixed frequency, optionally swept exponentially
to a second frequency right after the trigger:

  OscNode::sine().with_frequency(800.0)              // steady 800 Hz tick
  OscNode::sine().with_frequency(400.0)
      .sweep_to(3000.0, 0.05)                         // rising "ping"
  OscNode::sawtooth().with_frequency(800.0)
      .sweep_to(100.0, 0.2)                           // falling "whoosh"
  OscNode::noise()                                    // unpitched burst

Waveform character:

  Sine      pure, round        ticks and soft bells
  Sawtooth  bright, buzzy      aggressive impact sweeps
  Square    hollow, woody      digital "beep" clicks
  Triangle  soft, mellow       short clicks
  Noise     hiss               struck / brushed textures

The sweep is the same exponential ramp used for gain envelopes (see
`dsp/envelope.rs`), so a pitch glide sounds even across octaves.
*/

const DEFAULT_FREQUENCY: f32 = 440.0;

pub struct OscNode {
    osc: OscillatorBlock,
    frequency: f32,
    sweep: Option<ExpEnvelope>,
}

impl OscNode {
    fn new(osc: OscillatorBlock) -> Self {
        Self {
            osc,
            frequency: DEFAULT_FREQUENCY,
            sweep: None,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorBlock::sine())
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorBlock::sawtooth())
    }

    pub fn square() -> Self {
        Self::new(OscillatorBlock::square())
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorBlock::triangle())
    }

    pub fn noise() -> Self {
        Self::new(OscillatorBlock::noise())
    }

    /// Set the frequency the oscillator starts at.
    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Glide exponentially from the start frequency to `target` over
    /// `seconds`, then hold `target`.
    pub fn sweep_to(mut self, target: f32, seconds: f32) -> Self {
        self.sweep = Some(ExpEnvelope::new(self.frequency, target, seconds));
        self
    }

    /// Frequency the next sample will be rendered at.
    pub fn current_frequency(&self) -> f32 {
        match &self.sweep {
            Some(sweep) if sweep.is_active() => sweep.level(),
            _ => self.frequency,
        }
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        match self.sweep.as_mut().filter(|sweep| sweep.is_active()) {
            Some(sweep) => {
                for sample in out.iter_mut() {
                    let frequency = sweep.next_sample();
                    *sample = self.osc.next_sample(frequency, ctx.sample_rate);
                }
            }
            None => self.osc.render(out, self.frequency, ctx.sample_rate),
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.osc.reset();
        if let Some(sweep) = self.sweep.as_mut() {
            sweep.note_on(ctx.sample_rate);
        }
    }
}
