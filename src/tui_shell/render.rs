use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::app::App;
use super::{time_fmt, views};
use crate::nav::Screen;
use crate::session::NoticeLevel;

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    // Header
    let mut spans = vec![
        Span::styled(
            "mc-console",
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(app.screen().title(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::raw(app.base_url.as_str()),
        Span::raw("  "),
        Span::styled(time_fmt::clock(), Style::default().fg(Color::Gray)),
    ];
    if app.session.has_pending_action() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("working…", Style::default().fg(Color::Cyan)));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    // Main view
    match app.screen() {
        Screen::Saves => views::saves::render(frame, chunks[1], app),
        Screen::Create => views::form::render_create(frame, chunks[1], app),
        Screen::Modify => views::form::render_modify(frame, chunks[1], app),
        Screen::Delete => views::confirm::render_delete(frame, chunks[1], app),
        Screen::Console => views::console::render(frame, chunks[1], app),
        Screen::Version => views::confirm::render_versions(frame, chunks[1], app),
    }

    // Status / last result
    let line = match app.session.notice() {
        Some(n) => {
            let style = match n.level {
                NoticeLevel::Info => Style::default().fg(Color::White),
                NoticeLevel::Error => Style::default().fg(Color::Red),
            };
            Line::from(Span::styled(n.text.as_str(), style))
        }
        None => Line::from(""),
    };
    frame.render_widget(
        Paragraph::new(line)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::TOP).title("Last")),
        chunks[2],
    );

    render_hints(frame, chunks[3], app);
}

fn render_hints(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let hint = match app.screen() {
        Screen::Saves if app.filter_input.is_some() => "type to filter  Enter: keep  Esc: clear",
        Screen::Saves => {
            "↑/↓ select  /: filter  n: new  e: edit  d: delete  s: start/stop  c: console  r: reload  q: quit"
        }
        Screen::Create => "Tab: next  ←/→ Space: change  v: versions (on version)  Enter: create  Esc: back",
        Screen::Modify => "Tab: next  ←/→ Space: change  Enter: save  Esc: back",
        Screen::Delete => "Enter/y: delete  Esc/n: cancel",
        Screen::Console => "Enter: send  ↑/↓ history  PgUp/PgDn scroll  Esc: back",
        Screen::Version => "↑/↓ choose  Enter: pick  Esc: cancel",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            hint,
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        )),
        area,
    );
}
