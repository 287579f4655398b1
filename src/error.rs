//! Error types for the tempo engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while bringing up audio output or timing.
///
/// None of these reach callers of `TempoEngine::start()`: the engine logs
/// them and stays idle so the caller can retry on a later user gesture.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Output exists but is not currently producing audio
    #[error("audio output is suspended")]
    Suspended,

    /// No default output device
    #[error("no audio output device available")]
    NoOutputDevice,

    /// Device only offers sample formats the mixer cannot write
    #[error("unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    /// Querying the device configuration failed
    #[error("stream config error: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    /// Building the output stream failed
    #[error("stream build error: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Starting the output stream failed
    #[error("stream play error: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// An independent thread could not be started
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The thread owning the audio stream exited
    #[error("audio host thread is gone")]
    AudioThreadGone,
}

/// A ratio string other than `"3:1"` or `"2:1"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown swing ratio `{0}` (expected \"3:1\" or \"2:1\")")]
pub struct ParseRatioError(pub String);
