//! End-to-end timing of a polled `TempoEngine` against an offline output.
//!
//! The offline clock only advances when the renderer pulls frames, so every
//! run is deterministic: poll, render 10ms, repeat.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use swing_tempo::{
    Beat, EngineConfig, OfflineOutput, OfflineRenderer, Ratio, TempoEngine, TimingMode,
};

const SAMPLE_RATE: f32 = 8_000.0;
const STEP: f64 = 0.01;

struct Rig {
    engine: TempoEngine<OfflineOutput>,
    renderer: OfflineRenderer,
    beats: Arc<Mutex<Vec<Beat>>>,
    cycles: Arc<Mutex<Vec<u64>>>,
}

fn config(tempo_bpm: f64, ratio: Ratio, rest_seconds: f64) -> EngineConfig {
    EngineConfig {
        tempo_bpm,
        ratio,
        rest_seconds,
        tick_period: Duration::ZERO,
        timing: TimingMode::Polled,
        ..EngineConfig::default()
    }
}

fn rig_with(config: EngineConfig, (output, renderer): (OfflineOutput, OfflineRenderer)) -> Rig {
    let beats = Arc::new(Mutex::new(Vec::new()));
    let cycles = Arc::new(Mutex::new(Vec::new()));
    let beat_log = Arc::clone(&beats);
    let cycle_log = Arc::clone(&cycles);

    let engine = TempoEngine::builder(output)
        .config(config)
        .on_beat(move |beat| beat_log.lock().unwrap().push(beat))
        .on_cycle(move |cycle| cycle_log.lock().unwrap().push(cycle))
        .build();

    Rig {
        engine,
        renderer,
        beats,
        cycles,
    }
}

fn rig(config: EngineConfig) -> Rig {
    rig_with(config, OfflineOutput::new(SAMPLE_RATE))
}

impl Rig {
    /// Poll and render for `seconds` of audio time, returning the audio.
    fn run(&mut self, seconds: f64) -> Vec<f32> {
        let mut audio = Vec::new();
        for _ in 0..(seconds / STEP).round() as usize {
            self.engine.poll();
            audio.extend(self.renderer.render_seconds(STEP));
        }
        audio
    }

    fn beats(&self) -> Vec<Beat> {
        self.beats.lock().unwrap().clone()
    }

    fn times(&self) -> Vec<f64> {
        self.beats().iter().map(|b| b.time).collect()
    }

    fn clear(&self) {
        self.beats.lock().unwrap().clear();
        self.cycles.lock().unwrap().clear();
    }
}

fn assert_times(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} != {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "{actual:?} != {expected:?}");
    }
}

fn first_sound(audio: &[f32]) -> Option<f64> {
    audio
        .iter()
        .position(|x| x.abs() > 1e-6)
        .map(|i| i as f64 / SAMPLE_RATE as f64)
}

#[test]
fn three_to_one_at_120_bpm() {
    let mut rig = rig(config(120.0, Ratio::ThreeToOne, 1.0));
    assert!(rig.engine.start());
    rig.run(3.5);

    assert_times(&rig.times(), &[0.1, 0.6, 1.1, 1.6, 3.1]);

    let beats = rig.beats();
    let indices: Vec<_> = beats.iter().map(|b| b.index).collect();
    let impacts: Vec<_> = beats.iter().map(|b| b.is_impact).collect();
    assert_eq!(indices, [0, 1, 2, 3, 0]);
    assert_eq!(impacts, [false, false, false, true, false]);
    assert_eq!(beats[4].cycle, 1);
    assert_eq!(*rig.cycles.lock().unwrap(), [0]);
}

#[test]
fn two_to_one_at_90_bpm() {
    let mut rig = rig(config(90.0, Ratio::TwoToOne, 0.5));
    assert!(rig.engine.start());
    rig.run(2.7);

    let interval = 60.0 / 90.0;
    let first = 0.1;
    assert_times(
        &rig.times(),
        &[
            first,
            first + interval,
            first + 2.0 * interval,
            first + 3.0 * interval + 0.5,
        ],
    );
    let impacts: Vec<_> = rig.beats().iter().map(|b| b.is_impact).collect();
    assert_eq!(impacts, [false, false, true, false]);
}

#[test]
fn callback_fires_at_beat_time_not_when_queued() {
    let mut rig = rig(config(120.0, Ratio::ThreeToOne, 3.0));
    assert!(rig.engine.start());

    // By 50ms the first beat (100ms) has been queued but not reached.
    rig.run(0.05);
    assert!(rig.beats().is_empty());

    rig.run(0.1);
    assert_eq!(rig.beats().len(), 1);
}

#[test]
fn first_cue_sounds_one_lead_in_after_start() {
    let mut rig = rig(config(120.0, Ratio::ThreeToOne, 3.0));
    assert!(rig.engine.start());
    let audio = rig.run(0.3);

    let onset = first_sound(&audio).expect("first beat is audible");
    assert!((0.1..0.102).contains(&onset), "onset at {onset}");
}

#[test]
fn tempo_change_applies_from_the_next_computed_beat() {
    let mut rig = rig(config(120.0, Ratio::ThreeToOne, 0.0));
    assert!(rig.engine.start());
    rig.run(0.55);

    assert!(rig.engine.set_tempo(60.0));
    rig.run(1.65);

    // 1.1 was computed at 120 BPM before the change.
    assert_times(&rig.times(), &[0.1, 0.6, 1.1, 2.1]);
}

#[test]
fn ratio_change_mid_cycle_clamps_the_position() {
    let mut rig = rig(config(120.0, Ratio::ThreeToOne, 0.0));
    assert!(rig.engine.start());
    rig.run(1.45);
    assert_eq!(rig.engine.beat_index(), 3);

    rig.engine.set_ratio(Ratio::TwoToOne);
    assert_eq!(rig.engine.beat_index(), 2);
    rig.clear();
    rig.run(0.7);

    let beats = rig.beats();
    assert_eq!(beats.len(), 2);
    assert!(beats[0].is_impact);
    assert_eq!(beats[0].index, 2);
    assert_eq!(beats[1].index, 0);
}

#[test]
fn stop_suppresses_pending_callbacks_but_not_queued_audio() {
    let mut rig = rig(config(120.0, Ratio::ThreeToOne, 3.0));
    assert!(rig.engine.start());
    rig.run(0.05);

    rig.engine.stop();
    assert!(!rig.engine.is_running());
    let audio = rig.run(1.0);

    assert!(rig.beats().is_empty());
    // The cue queued before stop still plays, and nothing after it.
    let onset = first_sound(&audio).expect("queued cue still sounds");
    assert!(onset < 0.06);
    assert!(audio[(0.5 * SAMPLE_RATE as f64) as usize..]
        .iter()
        .all(|x| x.abs() <= 1e-6));
}

#[test]
fn restart_begins_a_fresh_cycle_with_settings_kept() {
    let mut rig = rig(config(120.0, Ratio::ThreeToOne, 3.0));
    assert!(rig.engine.start());
    rig.engine.set_volume(0.5);
    rig.run(1.2);
    assert_eq!(rig.beats().len(), 3);

    rig.engine.stop();
    rig.clear();
    assert!(rig.engine.start());
    let restarted = rig.engine.current_time();
    rig.run(0.3);

    let beats = rig.beats();
    assert_eq!(beats[0].index, 0);
    assert_eq!(beats[0].cycle, 0);
    assert!((beats[0].time - (restarted + 0.1)).abs() < 1e-6);
    assert_eq!(rig.engine.current_tempo(), 120.0);
    assert_eq!(rig.engine.volume(), 0.5);
}

#[test]
fn zero_volume_is_silent_and_restores() {
    let mut rig = rig(EngineConfig {
        volume: 0.0,
        ..config(120.0, Ratio::ThreeToOne, 3.0)
    });
    assert!(rig.engine.start());
    let silent = rig.run(0.4);
    assert!(silent.iter().all(|x| x.abs() <= 1e-6));
    assert_eq!(rig.beats().len(), 1);

    rig.engine.set_volume(1.0);
    let audible = rig.run(0.4);
    assert!(first_sound(&audible).is_some());
}

#[test]
fn unknown_sound_falls_back_to_the_default_variant() {
    let mut rig = rig(config(120.0, Ratio::ThreeToOne, 3.0));
    assert!(!rig.engine.set_sound_variant("cowbell"));
    assert!(rig.engine.start());

    let audio = rig.run(0.3);
    assert!(first_sound(&audio).is_some());
}

#[test]
fn suspended_output_leaves_engine_idle_until_retry() {
    let (output, renderer) = OfflineOutput::suspended(SAMPLE_RATE);
    let mut rig = rig_with(config(120.0, Ratio::ThreeToOne, 3.0), (output, renderer));

    assert!(!rig.engine.unlock());
    assert!(!rig.engine.start());
    assert!(!rig.engine.is_running());
    rig.run(0.3);
    assert!(rig.beats().is_empty());

    rig.renderer.set_available(true);
    assert!(rig.engine.start());
    rig.run(0.3);
    assert_eq!(rig.beats().len(), 1);
}

#[test]
fn stalled_host_resumes_without_a_burst() {
    let mut rig = rig(config(120.0, Ratio::ThreeToOne, 3.0));
    assert!(rig.engine.start());
    rig.run(0.3);

    // Five seconds of audio with no ticks, as if the host were suspended.
    rig.renderer.render_seconds(5.0);
    rig.run(0.5);

    assert_times(&rig.times(), &[0.1, 5.4]);
}

#[test]
fn every_builtin_variant_plays() {
    for id in ["driver1", "driver2", "driver3", "approach1", "approach2", "approach3"] {
        let mut rig = rig(config(120.0, Ratio::ThreeToOne, 3.0));
        assert!(rig.engine.set_sound_variant(id));
        assert!(rig.engine.start());
        let audio = rig.run(0.3);
        assert!(first_sound(&audio).is_some(), "{id} is silent");
        assert!(audio.iter().all(|x| x.abs() <= 1.0));
    }
}
