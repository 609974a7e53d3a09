use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph, Wrap};

use super::super::app::App;
use super::render_view_chrome;

pub(in crate::tui_shell) fn render_delete(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let inner = render_view_chrome(frame, "Delete", "confirm", area);
    let lines = vec![
        Line::from(Span::styled(
            app.session.delete_prompt(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "y / Enter to delete, n / Esc to keep it",
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

pub(in crate::tui_shell) fn render_versions(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let session = &app.session;
    let versions = session.versions();
    let note = format!("{} available", versions.len());
    let inner = render_view_chrome(frame, "Server version", &note, area);

    if versions.is_empty() {
        frame.render_widget(Paragraph::new("(loading versions…)"), inner);
        return;
    }
    let current = session.create_form().version.as_str();
    let items: Vec<ListItem> = versions
        .iter()
        .map(|v| {
            let marker = if v == current { "* " } else { "  " };
            ListItem::new(format!("{marker}{v}"))
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(session.version_cursor().min(versions.len() - 1)));
    let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, inner, &mut state);
}
