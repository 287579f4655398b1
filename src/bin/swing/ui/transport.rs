//! Transport bar widget - tempo, ratio, style and play state

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::View;

pub fn render_transport(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" swing ").borders(Borders::ALL);

    let play_symbol = if view.running { "▶" } else { "⏸" };
    let play_state = if view.running { "Running" } else { "Stopped" };
    let range = view.ratio.tempo_range();

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0} ({:.0}-{:.0})  ", view.bpm, range.min, range.max),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{play_symbol} {play_state}  "),
            Style::default().fg(if view.running { Color::Green } else { Color::Yellow }),
        ),
        Span::styled(
            format!("{}  {}  ", view.ratio, view.style.label()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Vol: {:.0}%  Rest: {:.1}s  ", view.volume * 100.0, view.rest),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Swings: {}", view.swings),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
