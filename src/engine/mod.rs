//! The tempo engine: a lookahead [`Scheduler`] driven by a Timing Source,
//! with beat notices delivered at their audio-clock time by a
//! [`Dispatcher`].
//!
//! ```text
//!  ticker thread ──tick──→ run_tick ──lock──→ Scheduler::on_tick ──→ AudioOutput
//!                             │
//!                             └──→ DispatchHandle ──(at beat time)──→ on_beat / on_cycle
//! ```
//!
//! Every mutation of engine state goes through the scheduler's lock, so
//! setters and ticks are serialised. Locks are always taken in the order
//! ticker control, scheduler, dispatcher queue.

pub mod config;
pub mod dispatch;
pub mod scheduler;

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use tracing::warn;

pub use config::{EngineConfig, TimingMode};
pub use dispatch::{DispatchHandle, Dispatcher, Listeners, Notice};
pub use scheduler::Scheduler;

use crate::{
    io::AudioOutput,
    rhythm::{Beat, Ratio},
    timing::{TickSource, TimingSource},
    voices::SoundRegistry,
};

type Core<O> = Arc<Mutex<Scheduler<O>>>;

fn lock<O>(core: &Mutex<Scheduler<O>>) -> MutexGuard<'_, Scheduler<O>> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One tick: queue what is due, then hand the queued beats to the
/// dispatcher. The scheduler lock is released before dispatching.
fn run_tick<O: AudioOutput>(core: &Mutex<Scheduler<O>>, dispatch: &DispatchHandle, beats: &mut Vec<Beat>) {
    beats.clear();
    let (now, read_at) = {
        let mut scheduler = lock(core);
        let reading = (scheduler.current_time(), Instant::now());
        scheduler.on_tick(beats);
        reading
    };

    for beat in beats.drain(..) {
        dispatch.schedule(Notice::Beat(beat), beat.time, now, read_at);
        if beat.is_impact {
            dispatch.schedule(Notice::CycleComplete(beat.cycle), now, now, read_at);
        }
    }
}

/// A swing metronome.
///
/// ```ignore
/// use swing_tempo::{CpalOutput, TempoEngine};
///
/// let mut engine = TempoEngine::new(CpalOutput::new(), |index, is_impact| {
///     println!("beat {index}{}", if is_impact { " (impact)" } else { "" });
/// });
/// engine.set_tempo(180.0);
/// engine.start();
/// ```
pub struct TempoEngine<O: AudioOutput + 'static> {
    // Dropped first: joins the ticker before anything it uses goes away.
    ticker: TickSource,
    dispatcher: Dispatcher,
    handle: DispatchHandle,
    core: Core<O>,
    scratch: Vec<Beat>,
}

impl<O: AudioOutput + 'static> TempoEngine<O> {
    /// Default configuration with a beat callback taking `(index, is_impact)`.
    pub fn new<F>(output: O, mut on_beat: F) -> Self
    where
        F: FnMut(usize, bool) + Send + 'static,
    {
        Self::builder(output)
            .on_beat(move |beat| on_beat(beat.index, beat.is_impact))
            .build()
    }

    pub fn builder(output: O) -> EngineBuilder<O> {
        EngineBuilder {
            output,
            config: EngineConfig::default(),
            registry: None,
            listeners: Listeners::default(),
        }
    }

    /// Bring the audio output up. Safe to call repeatedly; returns whether
    /// the output is usable. A failure is not fatal: retry later.
    pub fn unlock(&mut self) -> bool {
        match lock(&self.core).unlock() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "audio unlock failed");
                false
            }
        }
    }

    /// Start from beat 0 of a fresh cycle. Returns whether the engine is
    /// running afterwards; `false` means the output could not be unlocked
    /// and the engine stayed idle.
    pub fn start(&mut self) -> bool {
        match lock(&self.core).start() {
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "start failed, engine stays idle");
                return false;
            }
        }
        self.dispatcher.start();
        self.ticker.start();
        true
    }

    /// Stop scheduling. No beat or cycle callback runs after this returns;
    /// cues already handed to the output still sound.
    pub fn stop(&mut self) {
        self.ticker.stop();
        lock(&self.core).stop();
        self.dispatcher.stop();
    }

    /// Drive the engine from the host loop whenever
    /// [`is_threaded`](Self::is_threaded) is `false`. Runs a tick when one
    /// is due, then delivers the notices whose time has come. Each half is
    /// skipped if its own worker thread is running.
    pub fn poll(&mut self) {
        if self.ticker.poll(Instant::now()) {
            run_tick(&self.core, &self.handle, &mut self.scratch);
        }
        if !self.dispatcher.is_threaded() {
            let now = lock(&self.core).current_time();
            self.dispatcher.poll(now);
        }
    }

    /// See [`Scheduler::set_tempo`].
    pub fn set_tempo(&self, bpm: f64) -> bool {
        lock(&self.core).set_tempo(bpm)
    }

    pub fn set_ratio(&self, ratio: Ratio) {
        lock(&self.core).set_ratio(ratio);
    }

    /// Returns `false` if `id` is unknown; the fallback variant plays.
    pub fn set_sound_variant(&self, id: impl Into<String>) -> bool {
        lock(&self.core).set_sound_variant(id)
    }

    pub fn set_volume(&self, volume: f32) -> f32 {
        lock(&self.core).set_volume(volume)
    }

    pub fn set_rest_duration(&self, seconds: f64) -> f64 {
        lock(&self.core).set_rest_duration(seconds)
    }

    pub fn set_tick_period(&mut self, period: Duration) {
        self.ticker.configure(period);
    }

    pub fn is_running(&self) -> bool {
        lock(&self.core).is_running()
    }

    pub fn current_ratio(&self) -> Ratio {
        lock(&self.core).ratio()
    }

    pub fn current_tempo(&self) -> f64 {
        lock(&self.core).tempo()
    }

    pub fn sound_variant(&self) -> String {
        lock(&self.core).sound_variant().to_string()
    }

    pub fn volume(&self) -> f32 {
        lock(&self.core).volume()
    }

    pub fn rest_duration(&self) -> f64 {
        lock(&self.core).rest_duration()
    }

    /// Cycle position of the next beat to be scheduled.
    pub fn beat_index(&self) -> usize {
        lock(&self.core).beat_index()
    }

    /// The audio clock, in seconds.
    pub fn current_time(&self) -> f64 {
        lock(&self.core).current_time()
    }

    pub fn sound_ids(&self) -> Vec<String> {
        lock(&self.core)
            .registry()
            .ids()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn tick_period(&self) -> Duration {
        self.ticker.period()
    }

    /// Whether both ticks and callbacks come from worker threads. When
    /// `false`, the host has to call [`poll`](Self::poll).
    pub fn is_threaded(&self) -> bool {
        self.ticker.is_threaded() && self.dispatcher.is_threaded()
    }
}

/// Configures a [`TempoEngine`].
pub struct EngineBuilder<O> {
    output: O,
    config: EngineConfig,
    registry: Option<SoundRegistry>,
    listeners: Listeners,
}

impl<O: AudioOutput + 'static> EngineBuilder<O> {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the built-in sound variants.
    pub fn registry(mut self, registry: SoundRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Called with each beat when it sounds.
    pub fn on_beat<F>(mut self, on_beat: F) -> Self
    where
        F: FnMut(Beat) + Send + 'static,
    {
        self.listeners.on_beat = Some(Box::new(on_beat));
        self
    }

    /// Called with the cycle number when a cycle's impact is scheduled,
    /// just before its rest begins.
    pub fn on_cycle<F>(mut self, on_cycle: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.listeners.on_cycle = Some(Box::new(on_cycle));
        self
    }

    pub fn build(self) -> TempoEngine<O> {
        let Self {
            output,
            config,
            registry,
            listeners,
        } = self;

        let registry = registry.unwrap_or_else(SoundRegistry::builtin);
        let core: Core<O> = Arc::new(Mutex::new(Scheduler::new(output, registry, &config)));

        let (ticker, dispatcher) = match config.timing {
            TimingMode::Threaded => {
                let dispatcher = Dispatcher::threaded(listeners);
                let tick_core = Arc::clone(&core);
                let tick_dispatch = dispatcher.handle();
                let mut beats = Vec::new();
                let ticker = TickSource::threaded_or_polled(config.tick_period, move || {
                    run_tick(&tick_core, &tick_dispatch, &mut beats)
                });
                (ticker, dispatcher)
            }
            TimingMode::Polled => (
                TickSource::polled(config.tick_period),
                Dispatcher::polled(listeners),
            ),
        };

        TempoEngine {
            handle: dispatcher.handle(),
            ticker,
            dispatcher,
            core,
            scratch: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::OfflineOutput;
    use std::sync::mpsc;

    fn polled() -> EngineConfig {
        EngineConfig {
            timing: TimingMode::Polled,
            tick_period: Duration::ZERO,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn settings_persist_across_restart() {
        let (output, mut renderer) = OfflineOutput::new(8_000.0);
        let mut engine = TempoEngine::builder(output).config(polled()).build();
        assert!(!engine.is_threaded());

        assert!(engine.set_tempo(150.0));
        engine.set_ratio(Ratio::TwoToOne);
        assert!(engine.set_sound_variant("approach3"));
        assert_eq!(engine.set_volume(0.5), 0.5);

        assert!(engine.start());
        for _ in 0..20 {
            renderer.render_seconds(0.05);
            engine.poll();
        }
        engine.stop();
        assert!(!engine.is_running());

        assert!(engine.start());
        assert_eq!(engine.current_tempo(), 150.0);
        assert_eq!(engine.current_ratio(), Ratio::TwoToOne);
        assert_eq!(engine.sound_variant(), "approach3");
        assert_eq!(engine.volume(), 0.5);
        assert_eq!(engine.beat_index(), 0);
    }

    #[test]
    fn rejected_tempo_keeps_previous() {
        let (output, _renderer) = OfflineOutput::new(8_000.0);
        let engine = TempoEngine::builder(output).config(polled()).build();
        assert!(!engine.set_tempo(0.0));
        assert!(!engine.set_tempo(f64::NAN));
        assert_eq!(engine.current_tempo(), 60.0);
    }

    #[test]
    fn threaded_engine_calls_back_on_its_own() {
        let (output, renderer) = OfflineOutput::new(8_000.0);
        let (tx, rx) = mpsc::channel();
        let mut engine = TempoEngine::new(output, move |index, is_impact| {
            let _ = tx.send((index, is_impact));
        });
        assert!(engine.is_threaded());
        assert!(engine.set_tempo(600.0));
        assert!(engine.start());

        // The audio clock only moves when frames are rendered.
        let clock = std::thread::spawn(move || {
            let mut renderer = renderer;
            for _ in 0..100 {
                renderer.render_seconds(0.01);
                std::thread::sleep(Duration::from_millis(10));
            }
        });

        let first = rx.recv_timeout(Duration::from_secs(2)).expect("first beat");
        assert_eq!(first, (0, false));
        engine.stop();
        let _ = clock.join();
    }

    #[test]
    fn polled_dispatch_needs_polling_even_with_a_ticker_thread() {
        let (output, _renderer) = OfflineOutput::new(8_000.0);
        let mut engine = TempoEngine::builder(output).build();
        assert!(engine.is_threaded());

        // As if the dispatcher thread failed to spawn.
        engine.dispatcher = Dispatcher::polled(Listeners::default());
        engine.handle = engine.dispatcher.handle();
        assert!(engine.ticker.is_threaded());
        assert!(!engine.is_threaded());
    }

    #[test]
    fn tick_period_is_reconfigurable() {
        let (output, _renderer) = OfflineOutput::new(8_000.0);
        let mut engine = TempoEngine::builder(output).config(polled()).build();
        engine.set_tick_period(Duration::from_millis(10));
        assert_eq!(engine.tick_period(), Duration::from_millis(10));
    }
}
