use std::sync::{
    atomic::{AtomicU32, AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, PushError, RingBuffer};
use tracing::warn;

use crate::{synth::Signal, MAX_BLOCK_SIZE};

/// Cues that can be queued or sounding at once.
pub const MAX_VOICES: usize = 64;

/// Sample rate assumed before a device reports its own.
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;

/// Time a master volume change takes to settle.
pub const GAIN_RAMP_SECONDS: f32 = 0.01;

/*
Realtime Mixer
==============

The audio callback never synthesizes anything. Cues arrive fully rendered,
tagged with the frame they must start on:

  control side                          audio thread
  ────────────                          ────────────
  MixerHandle::submit(signal, t) ──rtrb──→ Mixer::render_block()
                                              │  sum voices at their
                                              │  start frames
                                              │  × master gain (ramped)
  spent buffers dropped here  ←──rtrb──────────┘  retire finished voices

The frame counter the mixer advances is the audio clock the scheduler plans
against, so a cue submitted for time t starts on frame round(t · rate)
exactly, however late or early the tick that queued it ran.
*/

/// Frames rendered so far, shared with the control side.
pub struct FrameClock {
    frames: AtomicU64,
    sample_rate: f32,
}

impl FrameClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            sample_rate,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Audio clock in seconds.
    pub fn seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Frame a time in seconds falls on.
    pub fn frame_at(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.sample_rate as f64).round() as u64
    }

    fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::AcqRel);
    }
}

/// Master volume, stored as `f32` bits.
pub struct MasterGain(AtomicU32);

impl MasterGain {
    pub fn new(volume: f32) -> Self {
        Self(AtomicU32::new(volume.to_bits()))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, volume: f32) {
        self.0.store(volume.to_bits(), Ordering::Relaxed);
    }
}

pub struct ScheduledSignal {
    samples: Vec<f32>,
    start_frame: u64,
    position: usize,
}

/// Control-side end of the mixer.
pub struct MixerHandle {
    tx: Producer<ScheduledSignal>,
    retired: Consumer<Vec<f32>>,
    clock: Arc<FrameClock>,
    gain: Arc<MasterGain>,
}

impl MixerHandle {
    /// Queue `signal` to start at audio-clock time `start_time`. Returns
    /// `false` when the queue is full and the cue was dropped.
    pub fn submit(&mut self, signal: Signal, start_time: f64) -> bool {
        self.collect_retired();
        if signal.is_empty() {
            return true;
        }

        let scheduled = ScheduledSignal {
            samples: signal.into_samples(),
            start_frame: self.clock.frame_at(start_time),
            position: 0,
        };
        match self.tx.push(scheduled) {
            Ok(()) => true,
            Err(PushError::Full(_)) => {
                warn!(start_time, "mixer queue full, dropping cue");
                false
            }
        }
    }

    pub fn set_volume(&self, volume: f32) {
        self.gain.set(volume);
    }

    pub fn volume(&self) -> f32 {
        self.gain.get()
    }

    pub fn current_time(&self) -> f64 {
        self.clock.seconds()
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    /// Drop buffers the audio thread is done with.
    fn collect_retired(&mut self) {
        while let Ok(buffer) = self.retired.pop() {
            drop(buffer);
        }
    }
}

/// Audio-thread end of the mixer.
pub struct Mixer {
    rx: Consumer<ScheduledSignal>,
    retired: Producer<Vec<f32>>,
    voices: Vec<ScheduledSignal>,
    clock: Arc<FrameClock>,
    gain: Arc<MasterGain>,
    current_gain: f32,
    ramp_step: f32,
    temp_buffer: Vec<f32>,
}

/// Connected handle and mixer at `sample_rate`, master volume 1.
pub fn channel(sample_rate: f32) -> (MixerHandle, Mixer) {
    let (tx, rx) = RingBuffer::new(MAX_VOICES);
    let (retired_tx, retired_rx) = RingBuffer::new(MAX_VOICES * 2);
    let clock = Arc::new(FrameClock::new(sample_rate));
    let gain = Arc::new(MasterGain::new(1.0));

    let handle = MixerHandle {
        tx,
        retired: retired_rx,
        clock: Arc::clone(&clock),
        gain: Arc::clone(&gain),
    };
    let mixer = Mixer {
        rx,
        retired: retired_tx,
        voices: Vec::with_capacity(MAX_VOICES),
        clock,
        current_gain: gain.get(),
        gain,
        ramp_step: 1.0 / (GAIN_RAMP_SECONDS * sample_rate).max(1.0),
        temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
    };
    (handle, mixer)
}

impl Mixer {
    /// Render the next `out.len()` mono frames and advance the clock.
    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Ok(signal) = self.rx.pop() {
            if self.voices.len() < MAX_VOICES {
                self.voices.push(signal);
            } else {
                let _ = self.retired.push(signal.samples);
            }
        }

        out.fill(0.0);
        let block_start = self.clock.frames();

        for voice in &mut self.voices {
            // Late cues start right away instead of being skipped.
            let offset = voice.start_frame.saturating_sub(block_start);
            if offset >= out.len() as u64 {
                continue;
            }
            let offset = offset as usize;
            let remaining = &voice.samples[voice.position..];
            let n = remaining.len().min(out.len() - offset);
            for (o, s) in out[offset..offset + n].iter_mut().zip(remaining) {
                *o += s;
            }
            voice.position += n;
        }

        let mut i = 0;
        while i < self.voices.len() {
            if self.voices[i].position >= self.voices[i].samples.len() {
                let done = self.voices.swap_remove(i);
                let _ = self.retired.push(done.samples);
            } else {
                i += 1;
            }
        }

        let target = self.gain.get();
        for sample in out.iter_mut() {
            let delta = target - self.current_gain;
            if delta.abs() <= self.ramp_step {
                self.current_gain = target;
            } else {
                self.current_gain += self.ramp_step.copysign(delta);
            }
            *sample = (*sample * self.current_gain).clamp(-1.0, 1.0);
        }

        self.clock.advance(out.len() as u64);
    }

    /// Render into an interleaved device buffer, same signal on every channel.
    pub fn render_interleaved<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = channels.max(1);
        let total_frames = data.len() / channels;
        let mut frames_written = 0;
        let mut block = std::mem::take(&mut self.temp_buffer);

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let mono = &mut block[..frames_to_render];
            self.render_block(mono);

            let out_off = frames_written * channels;
            for (i, &s) in mono.iter().enumerate() {
                for ch in 0..channels {
                    data[out_off + i * channels + ch] = T::from_sample(s);
                }
            }
            frames_written += frames_to_render;
        }

        self.temp_buffer = block;
    }

    /// Voices queued or sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn current_time(&self) -> f64 {
        self.clock.seconds()
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }
}
