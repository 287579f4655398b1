use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    error::{EngineError, Result},
    io::{
        mixer::{self, Mixer, MixerHandle},
        AudioOutput,
    },
    synth::Signal,
    MAX_BLOCK_SIZE,
};

/// Output without a device: the audio clock only moves when the paired
/// [`OfflineRenderer`] renders.
///
/// Used for deterministic tests and for bouncing a session to a buffer.
pub struct OfflineOutput {
    handle: MixerHandle,
    available: Arc<AtomicBool>,
    unlocked: bool,
}

/// Pulls audio out of an [`OfflineOutput`], advancing its clock.
pub struct OfflineRenderer {
    mixer: Mixer,
    available: Arc<AtomicBool>,
}

impl OfflineOutput {
    /// An output that unlocks on the first request.
    pub fn new(sample_rate: f32) -> (Self, OfflineRenderer) {
        Self::with_availability(sample_rate, true)
    }

    /// An output that refuses to unlock until
    /// [`OfflineRenderer::set_available`] is called, like a platform that
    /// keeps audio suspended until a user gesture.
    pub fn suspended(sample_rate: f32) -> (Self, OfflineRenderer) {
        Self::with_availability(sample_rate, false)
    }

    fn with_availability(sample_rate: f32, available: bool) -> (Self, OfflineRenderer) {
        let (handle, mixer) = mixer::channel(sample_rate);
        let available = Arc::new(AtomicBool::new(available));
        let output = Self {
            handle,
            available: Arc::clone(&available),
            unlocked: false,
        };
        (output, OfflineRenderer { mixer, available })
    }

    pub fn volume(&self) -> f32 {
        self.handle.volume()
    }
}

impl AudioOutput for OfflineOutput {
    fn unlock(&mut self) -> Result<()> {
        if self.unlocked {
            return Ok(());
        }
        if !self.available.load(Ordering::Acquire) {
            return Err(EngineError::Suspended);
        }
        self.unlocked = true;
        Ok(())
    }

    fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    fn sample_rate(&self) -> f32 {
        self.handle.sample_rate()
    }

    fn current_time(&self) -> f64 {
        self.handle.current_time()
    }

    fn submit(&mut self, signal: Signal, start_time: f64) -> bool {
        self.handle.submit(signal, start_time)
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.handle.set_volume(volume);
    }
}

impl OfflineRenderer {
    /// Render `frames` mono frames.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; frames];
        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.mixer.render_block(block);
        }
        out
    }

    /// Render until the clock has moved `seconds` further.
    pub fn render_seconds(&mut self, seconds: f64) -> Vec<f32> {
        let sample_rate = self.sample_rate() as f64;
        let start = self.current_frame();
        let end = ((self.current_time() + seconds) * sample_rate).round() as u64;
        self.render(end.saturating_sub(start) as usize)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    pub fn current_time(&self) -> f64 {
        self.mixer.current_time()
    }

    pub fn sample_rate(&self) -> f32 {
        self.mixer.sample_rate()
    }

    fn current_frame(&self) -> u64 {
        (self.current_time() * self.sample_rate() as f64).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_output_refuses_unlock_until_available() {
        let (mut output, renderer) = OfflineOutput::suspended(8_000.0);
        assert!(matches!(output.unlock(), Err(EngineError::Suspended)));
        assert!(!output.is_unlocked());

        renderer.set_available(true);
        assert!(output.unlock().is_ok());
        assert!(output.unlock().is_ok());
        assert!(output.is_unlocked());
    }

    #[test]
    fn clock_follows_rendering() {
        let (output, mut renderer) = OfflineOutput::new(8_000.0);
        assert_eq!(output.current_time(), 0.0);

        let audio = renderer.render_seconds(0.25);
        assert_eq!(audio.len(), 2_000);
        assert!((output.current_time() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn submitted_cue_plays_at_its_time() {
        let (mut output, mut renderer) = OfflineOutput::new(1_000.0);
        output.submit(Signal::new(vec![0.5; 4]), 0.01);

        let audio = renderer.render(20);
        assert_eq!(audio.iter().position(|&s| s != 0.0), Some(10));
    }
}
