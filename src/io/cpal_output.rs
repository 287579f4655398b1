use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error, info};

use crate::{
    error::{EngineError, Result},
    io::{
        mixer::{self, Mixer, MixerHandle},
        AudioOutput,
    },
    synth::Signal,
};

/// How long `unlock()` waits for the device to come up.
const OPEN_TIMEOUT: Duration = Duration::from_secs(3);

/// Default output device through `cpal`.
///
/// Nothing is opened until `unlock()`. The stream is not `Send`, so it is
/// created on, and lives on, a dedicated host thread; this handle only keeps
/// the mixer's control end and a shutdown channel.
pub struct CpalOutput {
    handle: Option<MixerHandle>,
    _host: Option<HostThread>,
    volume: f32,
}

struct HostThread {
    shutdown: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl CpalOutput {
    pub fn new() -> Self {
        Self {
            handle: None,
            _host: None,
            volume: 1.0,
        }
    }

    fn open(&mut self) -> Result<MixerHandle> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let join = thread::Builder::new()
            .name("swing-audio-host".into())
            .spawn(move || host_thread(ready_tx, shutdown_rx))
            .map_err(|source| EngineError::Spawn {
                name: "audio host",
                source,
            })?;

        let host = HostThread {
            shutdown: Some(shutdown_tx),
            join: Some(join),
        };

        match ready_rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(Ok(handle)) => {
                self._host = Some(host);
                Ok(handle)
            }
            Ok(Err(err)) => Err(err),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                Err(EngineError::AudioThreadGone)
            }
        }
    }
}

impl Default for CpalOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn host_thread(
    ready: Sender<Result<MixerHandle>>,
    shutdown: Receiver<()>,
) {
    let stream = match open_stream() {
        Ok((stream, handle)) => {
            let _ = ready.send(Ok(handle));
            stream
        }
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    // Hold the stream until the output is dropped.
    let _ = shutdown.recv();
    drop(stream);
    debug!("audio stream closed");
}

fn open_stream() -> Result<(cpal::Stream, MixerHandle)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(EngineError::NoOutputDevice)?;
    let config = device.default_output_config()?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    let (handle, mixer) = mixer::channel(sample_rate);

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), mixer, channels),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), mixer, channels),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), mixer, channels),
        other => return Err(EngineError::UnsupportedSampleFormat(format!("{other:?}"))),
    }?;
    stream.play()?;

    info!(sample_rate, channels, "audio output started");
    Ok((stream, handle))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: Mixer,
    channels: usize,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            mixer.render_interleaved(data, channels);
        },
        |err| error!("audio stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

impl AudioOutput for CpalOutput {
    fn unlock(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        let handle = self.open()?;
        handle.set_volume(self.volume);
        self.handle = Some(handle);
        Ok(())
    }

    fn is_unlocked(&self) -> bool {
        self.handle.is_some()
    }

    fn sample_rate(&self) -> f32 {
        self.handle
            .as_ref()
            .map_or(mixer::DEFAULT_SAMPLE_RATE, MixerHandle::sample_rate)
    }

    fn current_time(&self) -> f64 {
        self.handle.as_ref().map_or(0.0, MixerHandle::current_time)
    }

    fn submit(&mut self, signal: Signal, start_time: f64) -> bool {
        match self.handle.as_mut() {
            Some(handle) => handle.submit(signal, start_time),
            None => false,
        }
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(handle) = &self.handle {
            handle.set_volume(volume);
        }
    }
}

impl Drop for HostThread {
    fn drop(&mut self) {
        // Dropping the sender wakes the host thread.
        self.shutdown.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
