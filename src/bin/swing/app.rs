//! Trainer - wires key presses to the engine and beats to the view

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use rtrb::{Consumer, RingBuffer};

use swing_tempo::{AudioOutput, Beat, EngineConfig, Ratio, SoundStyle, TempoEngine};

use crate::ui::{self, View};

/// Beats and cycle notices buffered between the engine and the UI loop.
const NOTICE_CAPACITY: usize = 64;

/// How long the impact dot stays lit.
const FLASH: Duration = Duration::from_millis(150);

const TEMPO_STEP: f64 = 1.0;
const TEMPO_STEP_LARGE: f64 = 10.0;
const VOLUME_STEP: f32 = 0.1;
const REST_STEP: f64 = 0.5;

pub struct Trainer<O: AudioOutput + 'static> {
    engine: TempoEngine<O>,
    beats: Consumer<Beat>,
    cycles: Consumer<u64>,
    style: SoundStyle,
    last_beat: Option<(Beat, Instant)>,
    swings: u64,
    status: Option<&'static str>,
    should_quit: bool,
}

impl<O: AudioOutput + 'static> Trainer<O> {
    pub fn new(output: O, ratio: Ratio) -> Self {
        let (mut beat_tx, beats) = RingBuffer::new(NOTICE_CAPACITY);
        let (mut cycle_tx, cycles) = RingBuffer::new(NOTICE_CAPACITY);
        let style = SoundStyle::default();

        let engine = TempoEngine::builder(output)
            .config(EngineConfig::for_ratio(ratio))
            .on_beat(move |beat| {
                let _ = beat_tx.push(beat);
            })
            .on_cycle(move |cycle| {
                let _ = cycle_tx.push(cycle);
            })
            .build();

        Self {
            engine,
            beats,
            cycles,
            style,
            last_beat: None,
            swings: 0,
            status: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.engine.poll();
            self.drain_notices();

            let view = self.view();
            terminal.draw(|frame| ui::render(frame, &view))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.engine.stop();
        Ok(())
    }

    fn drain_notices(&mut self) {
        while let Ok(beat) = self.beats.pop() {
            self.last_beat = Some((beat, Instant::now()));
        }
        while let Ok(cycle) = self.cycles.pop() {
            self.swings = cycle + 1;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        self.status = None;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.toggle_playback(),
            KeyCode::Up => self.nudge_tempo(TEMPO_STEP),
            KeyCode::Down => self.nudge_tempo(-TEMPO_STEP),
            KeyCode::PageUp => self.nudge_tempo(TEMPO_STEP_LARGE),
            KeyCode::PageDown => self.nudge_tempo(-TEMPO_STEP_LARGE),
            KeyCode::Char('r') => self.toggle_ratio(),
            KeyCode::Char('s') => {
                self.style = self.style.next();
                self.engine.set_sound_variant(self.style.variant(self.engine.current_ratio()));
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.engine.set_volume(self.engine.volume() + VOLUME_STEP);
            }
            KeyCode::Char('-') => {
                self.engine.set_volume(self.engine.volume() - VOLUME_STEP);
            }
            KeyCode::Char(']') => {
                self.engine.set_rest_duration(self.engine.rest_duration() + REST_STEP);
            }
            KeyCode::Char('[') => {
                self.engine.set_rest_duration(self.engine.rest_duration() - REST_STEP);
            }
            _ => {}
        }
    }

    fn toggle_playback(&mut self) {
        if self.engine.is_running() {
            self.engine.stop();
            self.last_beat = None;
            return;
        }

        self.swings = 0;
        if !self.engine.start() {
            self.status = Some("audio unavailable, press space to retry");
        }
    }

    fn nudge_tempo(&mut self, delta: f64) {
        let range = self.engine.current_ratio().tempo_range();
        self.engine.set_tempo(range.clamp(self.engine.current_tempo() + delta));
    }

    /// Switching ratio stops the trainer and loads the ratio's presets.
    fn toggle_ratio(&mut self) {
        let ratio = self.engine.current_ratio().toggled();
        self.engine.stop();
        self.last_beat = None;

        self.engine.set_ratio(ratio);
        self.engine.set_tempo(ratio.tempo_range().default);
        self.engine.set_sound_variant(self.style.variant(ratio));
    }

    fn view(&self) -> View {
        let ratio = self.engine.current_ratio();
        View {
            running: self.engine.is_running(),
            bpm: self.engine.current_tempo(),
            ratio,
            style: self.style,
            volume: self.engine.volume(),
            rest: self.engine.rest_duration(),
            swings: self.swings,
            last_beat: self.last_beat.map(|(beat, _)| beat),
            flash: self
                .last_beat
                .is_some_and(|(beat, at)| beat.is_impact && at.elapsed() < FLASH),
            status: self.status,
        }
    }
}
