// Purpose - the audio clock and master bus the scheduler plans against

pub mod cpal_output;
pub mod mixer;
pub mod offline;

pub use cpal_output::CpalOutput;
pub use mixer::{Mixer, MixerHandle};
pub use offline::{OfflineOutput, OfflineRenderer};

use crate::{error::Result, synth::Signal};

/// Where rendered cues go, and the clock they are timed against.
///
/// `current_time()` is the audio clock in seconds: it advances with the
/// frames the output has actually rendered, not with wall time, and never
/// goes backwards.
pub trait AudioOutput: Send {
    /// Make the output produce sound. Idempotent. Fails while the platform
    /// keeps audio suspended.
    fn unlock(&mut self) -> Result<()>;

    fn is_unlocked(&self) -> bool;

    fn sample_rate(&self) -> f32;

    fn current_time(&self) -> f64;

    /// Play `signal` starting at audio-clock time `start_time`. Returns
    /// `false` if the cue was dropped.
    fn submit(&mut self, signal: Signal, start_time: f64) -> bool;

    /// Master gain for every cue, already sounding or future.
    fn set_master_volume(&mut self, volume: f32);
}
