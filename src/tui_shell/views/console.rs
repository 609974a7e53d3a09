use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::super::app::App;
use super::render_view_chrome;
use crate::console::ConsoleState;

fn state_color(state: ConsoleState) -> Color {
    match state {
        ConsoleState::Streaming => Color::Green,
        ConsoleState::Connecting => Color::Yellow,
        ConsoleState::Reconnecting => Color::Magenta,
        ConsoleState::Closed => Color::Gray,
    }
}

pub(in crate::tui_shell) fn render(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let Some(console) = app.session.console() else {
        let inner = render_view_chrome(frame, "Console", "closed", area);
        frame.render_widget(Paragraph::new("(no console open)"), inner);
        return;
    };

    let note = format!(
        "{}  {}  offset {}",
        console.target(),
        console.state().label(),
        console.cursor()
    );
    let inner = render_view_chrome(frame, "Console", &note, area);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(inner);

    // Bottom-anchored window, shifted up by the scroll offset.
    let lines = console.transcript().lines();
    let height = parts[0].height as usize;
    let end = lines.len().saturating_sub(app.console_scroll);
    let start = end.saturating_sub(height);
    let shown: Vec<Line> = lines[start..end]
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect();
    frame.render_widget(Paragraph::new(shown), parts[0]);

    let prompt = Paragraph::new(format!("> {}", app.command.buf)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(state_color(console.state()))),
    );
    frame.render_widget(prompt, parts[1]);

    let typed = app.command.buf[..app.command.cursor].chars().count() as u16;
    let x = parts[1].x.saturating_add(2).saturating_add(typed);
    frame.set_cursor_position(Position::new(
        x.min(parts[1].right().saturating_sub(1)),
        parts[1].y + 1,
    ));
}
