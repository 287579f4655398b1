pub mod dsp;
pub mod engine; // Lookahead scheduler and the public engine handle
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod io;
pub mod rhythm; // Swing ratios and the beat cycle
pub mod sync;
pub mod synth; // Cue rendering
pub mod timing;
pub mod voices;

pub use engine::{EngineBuilder, EngineConfig, TempoEngine, TimingMode};
pub use error::{EngineError, ParseRatioError};
pub use io::{AudioOutput, CpalOutput, OfflineOutput, OfflineRenderer};
pub use rhythm::{Beat, Ratio};
pub use voices::{SoundRegistry, SoundStyle};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
