// Purpose: turn sound variants into rendered cue buffers
// This layer sits above graph nodes and below the scheduler

pub mod patch;
pub mod signal;
pub mod synthesizer;

pub use patch::Patch;
pub use signal::Signal;
pub use synthesizer::Synthesizer;
