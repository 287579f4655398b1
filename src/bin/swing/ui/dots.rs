//! Beat dots - one per beat of the cycle, the impact last

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::View;

pub fn render_dots(frame: &mut Frame, area: Rect, view: &View) {
    let length = view.ratio.cycle_length();
    let impact = view.ratio.impact_index();
    let current = view.last_beat.map(|beat| beat.index);

    let mut spans = Vec::with_capacity(length * 2);
    for index in 0..length {
        let lit = current == Some(index);
        let style = match (index == impact, lit) {
            (true, true) if view.flash => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            (true, _) => Style::default().fg(Color::Red),
            (false, true) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            (false, false) => Style::default().fg(Color::DarkGray),
        };
        let symbol = if lit { "●" } else { "○" };
        spans.push(Span::styled(symbol, style));
        spans.push(Span::raw("   "));
    }

    let label = match view.last_beat {
        Some(beat) if beat.is_impact => "IMPACT".to_string(),
        Some(beat) => format!("beat {}", beat.index + 1),
        None => String::new(),
    };

    let lines = vec![
        Line::raw(""),
        Line::from(spans),
        Line::raw(""),
        Line::styled(label, Style::default().fg(Color::White)),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}
