//! TUI module for swing
//!
//! Draws the transport bar, the beat dots of the current cycle and help.

mod dots;
mod transport;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use swing_tempo::{Beat, Ratio, SoundStyle};

use dots::render_dots;
use transport::render_transport;

/// Everything a frame shows. Rebuilt every frame.
pub struct View {
    pub running: bool,
    pub bpm: f64,
    pub ratio: Ratio,
    pub style: SoundStyle,
    pub volume: f32,
    pub rest: f64,
    pub swings: u64,
    pub last_beat: Option<Beat>,
    /// The last beat was an impact and is still sounding.
    pub flash: bool,
    pub status: Option<&'static str>,
}

pub fn render(frame: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Min(5),    // Beat dots
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], view);

    let dots_block = Block::default()
        .title(format!(" {} ", view.ratio))
        .borders(Borders::ALL);
    let dots_inner = dots_block.inner(chunks[1]);
    frame.render_widget(dots_block, chunks[1]);
    render_dots(frame, dots_inner, view);

    if let Some(status) = view.status {
        let status = Paragraph::new(format!(" {status}")).style(Style::default().fg(Color::Red));
        frame.render_widget(status, chunks[2]);
    }

    let help = Paragraph::new(
        " [Space] Start/Stop  [↑↓/PgUp PgDn] Tempo  [R] Ratio  [S] Style  [+/-] Volume  [[/]] Rest  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}
