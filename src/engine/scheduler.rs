use tracing::{debug, trace, warn};

use crate::{
    engine::config::{clamp_rest, clamp_volume, EngineConfig},
    error::Result,
    io::{mixer::MAX_VOICES, AudioOutput},
    rhythm::{is_valid_tempo, seconds_per_beat, Beat, BeatCycle, Ratio},
    synth::{Signal, Synthesizer},
    voices::SoundRegistry,
};

/*
Lookahead Scheduler
===================

Beats are planned against the audio clock, never against "now":

  audio clock ──────────┬─────────────────────────────────────────→
                       now        now + schedule_ahead
                        │◄──── horizon ────►│
  next_beat_time:            ●        ●  (queued this tick)   ●  (next tick)

On every tick, every beat whose time falls inside the horizon is rendered,
submitted to the output at its exact time, and reported. Then

  next_beat_time += 60 / bpm
  next_beat_time += rest_seconds      if the cycle just wrapped

A late tick only delays when a beat is queued; its start frame was fixed the
moment `next_beat_time` was computed, so timing never drifts.

If the clock has run more than a horizon past `next_beat_time` (the host
was suspended), the missed beats are skipped and the schedule restarts
`lead_in` after now.
*/

/// Most beats queued by a single tick: one mixer's worth of voices.
pub const MAX_BEATS_PER_TICK: usize = MAX_VOICES;

/// The scheduling core. Owns all engine state; every mutation goes through
/// it, from a single logical context.
pub struct Scheduler<O> {
    output: O,
    synth: Synthesizer,
    cycle: BeatCycle,
    running: bool,

    tempo_bpm: f64,
    ratio: Ratio,
    sound: String,
    volume: f32,
    rest_seconds: f64,

    next_beat_time: f64,
    cycles: u64,

    schedule_ahead: f64,
    lead_in: f64,
}

impl<O: AudioOutput> Scheduler<O> {
    pub fn new(mut output: O, registry: SoundRegistry, config: &EngineConfig) -> Self {
        let tempo_bpm = if is_valid_tempo(config.tempo_bpm) {
            config.tempo_bpm
        } else {
            warn!(bpm = config.tempo_bpm, "invalid initial tempo, using default");
            EngineConfig::default().tempo_bpm
        };
        let volume = clamp_volume(config.volume);
        output.set_master_volume(volume);

        Self {
            synth: Synthesizer::new(registry, output.sample_rate()),
            output,
            cycle: BeatCycle::new(config.ratio),
            running: false,
            tempo_bpm,
            ratio: config.ratio,
            sound: config.sound.clone(),
            volume,
            rest_seconds: clamp_rest(config.rest_seconds),
            next_beat_time: 0.0,
            cycles: 0,
            schedule_ahead: config.schedule_ahead.max(0.0),
            lead_in: config.lead_in.max(0.0),
        }
    }

    /// Bring the output up and warm it with one silent frame. Idempotent.
    pub fn unlock(&mut self) -> Result<()> {
        self.output.unlock()?;
        self.synth.set_sample_rate(self.output.sample_rate());
        self.synth.prepare();
        self.output.set_master_volume(self.volume);

        let now = self.output.current_time();
        self.output.submit(Signal::silence(1), now);
        Ok(())
    }

    /// Begin scheduling from beat 0, `lead_in` after now.
    ///
    /// `Ok(false)` if already running. Fails, leaving the scheduler idle,
    /// when the output cannot be unlocked.
    pub fn start(&mut self) -> Result<bool> {
        if self.running {
            return Ok(false);
        }
        self.unlock()?;

        self.cycle.reset();
        self.cycles = 0;
        self.next_beat_time = self.output.current_time() + self.lead_in;
        self.running = true;
        debug!(
            bpm = self.tempo_bpm,
            ratio = %self.ratio,
            first_beat = self.next_beat_time,
            "scheduler started"
        );
        Ok(true)
    }

    /// Stop scheduling. Returns `false` if already stopped. Cues already
    /// submitted still play.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        debug!(cycles = self.cycles, "scheduler stopped");
        true
    }

    /// Queue every beat inside the horizon, appending them to `beats`.
    /// Returns how many were queued.
    pub fn on_tick(&mut self, beats: &mut Vec<Beat>) -> usize {
        if !self.running {
            return 0;
        }

        let now = self.output.current_time();
        if self.next_beat_time + self.schedule_ahead < now {
            let resumed = now + self.lead_in;
            warn!(
                behind = now - self.next_beat_time,
                resumed, "scheduler fell behind the audio clock, skipping missed beats"
            );
            self.next_beat_time = resumed;
        }

        let mut queued = 0;
        while self.next_beat_time < now + self.schedule_ahead {
            if queued == MAX_BEATS_PER_TICK {
                warn!(
                    bpm = self.tempo_bpm,
                    queued, "tempo too fast for the output, deferring beats to the next tick"
                );
                break;
            }
            let beat = Beat {
                index: self.cycle.index(),
                is_impact: self.cycle.is_impact(),
                cycle: self.cycles,
                time: self.next_beat_time,
            };
            self.play(&beat);
            beats.push(beat);
            queued += 1;
            self.advance();
        }
        queued
    }

    fn play(&mut self, beat: &Beat) {
        trace!(index = beat.index, impact = beat.is_impact, time = beat.time, "beat");
        match self.synth.render(&self.sound, beat.is_impact) {
            Some(signal) => {
                self.output.submit(signal, beat.time);
            }
            None => warn!(sound = %self.sound, "no cue registered for sound"),
        }
    }

    fn advance(&mut self) {
        self.next_beat_time += self.beat_interval();
        if self.cycle.advance() {
            self.next_beat_time += self.rest_seconds;
            self.cycles += 1;
        }
    }

    /// Seconds between beats, never shorter than one output frame so the
    /// schedule always moves forward.
    fn beat_interval(&self) -> f64 {
        let frame = 1.0 / f64::from(self.synth.sample_rate().max(1.0));
        seconds_per_beat(self.tempo_bpm).max(frame)
    }

    /// Takes effect from the next computed beat. Rejects non-positive or
    /// non-finite tempos, keeping the current one.
    pub fn set_tempo(&mut self, bpm: f64) -> bool {
        if !is_valid_tempo(bpm) {
            warn!(bpm, "rejected tempo");
            return false;
        }
        self.tempo_bpm = bpm;
        debug!(bpm, "tempo set");
        true
    }

    /// Applies now, clamping the cycle position into the new length.
    pub fn set_ratio(&mut self, ratio: Ratio) {
        self.ratio = ratio;
        self.cycle.set_ratio(ratio);
        debug!(%ratio, index = self.cycle.index(), "ratio set");
    }

    /// Takes effect from the next scheduled beat. Returns `false` if the id
    /// is not registered and the fallback will play instead.
    pub fn set_sound_variant(&mut self, id: impl Into<String>) -> bool {
        self.sound = id.into();
        let known = self.synth.registry().contains(&self.sound);
        debug!(sound = %self.sound, known, "sound variant set");
        known
    }

    /// Applies immediately, to sounding and future cues. Returns the
    /// clamped volume.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = clamp_volume(volume);
        self.output.set_master_volume(self.volume);
        self.volume
    }

    /// Returns the clamped rest duration.
    pub fn set_rest_duration(&mut self, seconds: f64) -> f64 {
        self.rest_seconds = clamp_rest(seconds);
        self.rest_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tempo(&self) -> f64 {
        self.tempo_bpm
    }

    pub fn ratio(&self) -> Ratio {
        self.ratio
    }

    pub fn sound_variant(&self) -> &str {
        &self.sound
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn rest_duration(&self) -> f64 {
        self.rest_seconds
    }

    /// Cycle position of the next beat to be scheduled.
    pub fn beat_index(&self) -> usize {
        self.cycle.index()
    }

    pub fn next_beat_time(&self) -> f64 {
        self.next_beat_time
    }

    /// Cycles completed since `start()`.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn current_time(&self) -> f64 {
        self.output.current_time()
    }

    pub fn registry(&self) -> &SoundRegistry {
        self.synth.registry()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::EngineError,
        graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode},
        io::{OfflineOutput, OfflineRenderer},
        synth::Patch,
    };

    const SAMPLE_RATE: f32 = 8_000.0;
    const STEP: f64 = 0.01;

    fn test_registry() -> SoundRegistry {
        let mut registry = SoundRegistry::empty("tick");
        registry.register("tick", |is_impact| {
            let frequency = if is_impact { 1_000.0 } else { 500.0 };
            Patch::new(
                OscNode::square().with_frequency(frequency).amplify(EnvNode::decay(0.5, 0.01)),
                0.02,
            )
        });
        registry
    }

    fn scheduler(config: EngineConfig) -> (Scheduler<OfflineOutput>, OfflineRenderer) {
        let (output, renderer) = OfflineOutput::new(SAMPLE_RATE);
        let config = EngineConfig {
            sound: "tick".into(),
            ..config
        };
        (Scheduler::new(output, test_registry(), &config), renderer)
    }

    /// Tick every `STEP` of audio time for `seconds`.
    fn run(
        scheduler: &mut Scheduler<OfflineOutput>,
        renderer: &mut OfflineRenderer,
        seconds: f64,
    ) -> (Vec<Beat>, Vec<f32>) {
        let mut beats = Vec::new();
        let mut audio = Vec::new();
        for _ in 0..(seconds / STEP).round() as usize {
            scheduler.on_tick(&mut beats);
            audio.extend(renderer.render_seconds(STEP));
        }
        (beats, audio)
    }

    fn times(beats: &[Beat]) -> Vec<f64> {
        beats.iter().map(|b| b.time).collect()
    }

    fn assert_times(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn three_to_one_at_120_bpm() {
        let (mut s, mut r) = scheduler(EngineConfig {
            tempo_bpm: 120.0,
            rest_seconds: 1.0,
            ..EngineConfig::default()
        });
        assert_eq!(s.start().ok(), Some(true));

        let (beats, _) = run(&mut s, &mut r, 3.2);

        assert_times(&times(&beats), &[0.1, 0.6, 1.1, 1.6, 3.1]);
        let flags: Vec<_> = beats.iter().map(|b| (b.index, b.is_impact)).collect();
        assert_eq!(flags, vec![(0, false), (1, false), (2, false), (3, true), (0, false)]);
        assert_eq!(beats[4].cycle, 1);
    }

    #[test]
    fn two_to_one_at_90_bpm_waits_rest_after_impact() {
        let (mut s, mut r) = scheduler(EngineConfig {
            tempo_bpm: 90.0,
            ratio: Ratio::TwoToOne,
            rest_seconds: 0.5,
            ..EngineConfig::default()
        });
        s.start().ok();

        let (beats, _) = run(&mut s, &mut r, 2.6);

        let interval = 60.0 / 90.0;
        assert_eq!(beats.len(), 4);
        assert!(beats[2].is_impact);
        assert_eq!(beats[2].index, 2);
        assert!((beats[1].time - beats[0].time - interval).abs() < 1e-9);
        assert!((beats[3].time - beats[2].time - (interval + 0.5)).abs() < 1e-9);
        assert_eq!(beats[3].index, 0);
    }

    #[test]
    fn beats_are_queued_within_the_horizon() {
        let (mut s, mut r) = scheduler(EngineConfig {
            tempo_bpm: 120.0,
            ..EngineConfig::default()
        });
        s.start().ok();

        let mut beats = Vec::new();
        assert_eq!(s.on_tick(&mut beats), 0);

        r.render_seconds(0.02);
        assert_eq!(s.on_tick(&mut beats), 1);
        assert!(beats[0].time > s.current_time());
        assert!(beats[0].time < s.current_time() + 0.1);
    }

    #[test]
    fn cues_sound_at_beat_time() {
        let (mut s, mut r) = scheduler(EngineConfig {
            tempo_bpm: 120.0,
            ..EngineConfig::default()
        });
        s.start().ok();

        let (_, audio) = run(&mut s, &mut r, 0.5);

        let onset = audio.iter().position(|&x| x != 0.0).map(|i| i as f64 / SAMPLE_RATE as f64);
        assert_eq!(onset, Some(0.1));
    }

    #[test]
    fn tempo_change_applies_from_next_beat() {
        let (mut s, mut r) = scheduler(EngineConfig {
            tempo_bpm: 120.0,
            rest_seconds: 0.0,
            ..EngineConfig::default()
        });
        s.start().ok();

        let (mut beats, _) = run(&mut s, &mut r, 0.55);
        // Beat 1 (0.6 s) is already queued by now.
        assert_times(&times(&beats), &[0.1, 0.6]);

        assert!(s.set_tempo(60.0));
        let (more, _) = run(&mut s, &mut r, 1.6);
        beats.extend(more);

        assert_times(&times(&beats), &[0.1, 0.6, 1.1, 2.1]);
    }

    #[test]
    fn restart_resets_cycle() {
        let (mut s, mut r) = scheduler(EngineConfig {
            tempo_bpm: 120.0,
            ..EngineConfig::default()
        });
        s.start().ok();
        run(&mut s, &mut r, 1.2);
        assert!(s.beat_index() > 0);

        assert!(s.stop());
        assert!(!s.stop());
        let mut beats = Vec::new();
        assert_eq!(s.on_tick(&mut beats), 0);

        assert_eq!(s.start().ok(), Some(true));
        assert_eq!(s.beat_index(), 0);
        assert!((s.next_beat_time() - (s.current_time() + 0.1)).abs() < 1e-9);

        let (beats, _) = run(&mut s, &mut r, 0.2);
        assert_eq!(beats[0].index, 0);
        assert!(!beats[0].is_impact);
    }

    #[test]
    fn double_start_is_a_no_op() {
        let (mut s, mut r) = scheduler(EngineConfig::default());
        assert_eq!(s.start().ok(), Some(true));
        let first = s.next_beat_time();
        r.render_seconds(0.05);

        assert_eq!(s.start().ok(), Some(false));
        assert_eq!(s.next_beat_time(), first);
    }

    #[test]
    fn suspended_output_keeps_scheduler_idle() {
        let (output, renderer) = OfflineOutput::suspended(SAMPLE_RATE);
        let mut s = Scheduler::new(output, test_registry(), &EngineConfig::default());

        assert!(matches!(s.start(), Err(EngineError::Suspended)));
        assert!(!s.is_running());

        renderer.set_available(true);
        assert_eq!(s.start().ok(), Some(true));
    }

    #[test]
    fn invalid_settings_are_rejected_or_clamped() {
        let (mut s, _r) = scheduler(EngineConfig::default());

        assert!(!s.set_tempo(0.0));
        assert!(!s.set_tempo(-30.0));
        assert!(!s.set_tempo(f64::NAN));
        assert_eq!(s.tempo(), 60.0);

        assert_eq!(s.set_volume(3.0), 1.0);
        assert_eq!(s.set_volume(-1.0), 0.0);
        assert_eq!(s.output().volume(), 0.0);

        assert_eq!(s.set_rest_duration(-1.0), 0.0);
    }

    #[test]
    fn ratio_change_mid_cycle_clamps() {
        let (mut s, mut r) = scheduler(EngineConfig {
            tempo_bpm: 120.0,
            rest_seconds: 0.0,
            ..EngineConfig::default()
        });
        s.start().ok();
        run(&mut s, &mut r, 1.45);
        assert_eq!(s.beat_index(), 3);

        s.set_ratio(Ratio::TwoToOne);
        assert_eq!(s.beat_index(), 2);

        let (beats, _) = run(&mut s, &mut r, 0.7);
        assert!(beats[0].is_impact);
        assert_eq!(beats[1].index, 0);
    }

    #[test]
    fn volume_zero_silences_next_beat() {
        let (mut s, mut r) = scheduler(EngineConfig {
            tempo_bpm: 120.0,
            ..EngineConfig::default()
        });
        s.start().ok();
        let (_, audio) = run(&mut s, &mut r, 0.3);
        assert!(audio.iter().any(|&x| x != 0.0));

        s.set_volume(0.0);
        let (beats, audio) = run(&mut s, &mut r, 0.5);
        assert_eq!(beats.len(), 1);
        assert!(audio.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn stalled_host_skips_missed_beats() {
        let (mut s, mut r) = scheduler(EngineConfig {
            tempo_bpm: 120.0,
            ..EngineConfig::default()
        });
        s.start().ok();
        r.render_seconds(5.0);

        let mut beats = Vec::new();
        s.on_tick(&mut beats);
        assert!(beats.is_empty());
        assert!((s.next_beat_time() - 5.1).abs() < 1e-9);

        let (beats, _) = run(&mut s, &mut r, 0.1);
        assert_eq!(beats.len(), 1);
        assert!((beats[0].time - 5.1).abs() < 1e-9);
        assert_eq!(beats[0].index, 0);
    }

    #[test]
    fn unknown_sound_uses_fallback() {
        let (mut s, _r) = scheduler(EngineConfig::default());
        assert!(!s.set_sound_variant("kazoo"));
        assert_eq!(s.sound_variant(), "kazoo");
        assert!(s.set_sound_variant("tick"));
    }

    #[test]
    fn absurd_tempo_without_rest_still_returns() {
        let (mut s, mut r) = scheduler(EngineConfig {
            rest_seconds: 0.0,
            ..EngineConfig::default()
        });
        assert_eq!(s.start().ok(), Some(true));
        assert!(s.set_tempo(1e300));
        r.render_seconds(0.02);

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let mut beats = Vec::new();
            let first = s.on_tick(&mut beats);
            let second = s.on_tick(&mut beats);
            let _ = tx.send((first, second, times(&beats)));
        });
        let (first, second, times) = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("on_tick returns");

        assert_eq!(first, MAX_BEATS_PER_TICK);
        assert_eq!(second, MAX_BEATS_PER_TICK);
        // Beats stay at least one frame apart.
        let frame = 1.0 / SAMPLE_RATE as f64;
        assert!(times.windows(2).all(|w| w[1] - w[0] >= frame - 1e-12));
    }
}
