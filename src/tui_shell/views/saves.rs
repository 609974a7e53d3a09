use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::super::app::App;
use super::super::time_fmt::fmt_stamp;
use super::render_view_chrome;
use crate::model::{ACCESS_TIME_KEY, SaveRecord, SaveStatus};
use crate::selection::matches_filter;

pub(in crate::tui_shell) fn status_color(status: SaveStatus) -> Color {
    match status {
        SaveStatus::Offline => Color::Gray,
        SaveStatus::Loading => Color::Yellow,
        SaveStatus::Online => Color::Green,
        SaveStatus::Shutdown => Color::Magenta,
    }
}

pub(in crate::tui_shell) fn render(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let session = &app.session;
    let registry = session.registry();
    let note = format!("{} saves", registry.len());
    let inner = render_view_chrome(frame, "Saves", &note, area);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(inner);

    let filter = session.filter();
    let visible: Vec<&SaveRecord> = registry
        .iter()
        .filter(|r| matches_filter(&r.name, filter))
        .collect();

    let mut state = ListState::default();
    state.select(
        session
            .selected_name()
            .and_then(|sel| visible.iter().position(|r| r.name == sel)),
    );

    let mut rows = Vec::new();
    for r in &visible {
        let mut spans = vec![
            Span::styled(
                format!("{:<9}", r.status.as_str()),
                Style::default().fg(status_color(r.status)),
            ),
            Span::raw(" "),
            Span::styled(
                r.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(created) = r.created_short() {
            spans.push(Span::styled(
                format!("  ({created})"),
                Style::default().fg(Color::Gray),
            ));
        }
        if let Some(version) = r.server_version() {
            spans.push(Span::raw(format!("  {version}")));
        }
        rows.push(ListItem::new(Line::from(spans)));
    }
    if visible.is_empty() {
        let empty = if registry.is_empty() {
            "(no saves; press n to create one)"
        } else {
            "(no saves match the filter)"
        };
        rows.push(ListItem::new(empty));
    }

    let filter_title = match &app.filter_input {
        Some(input) => format!(" filter: {}_", input.buf),
        None if !filter.is_empty() => format!(" filter={filter}"),
        None => String::new(),
    };
    let list = List::new(rows)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(format!("saves{filter_title}")),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, parts[0], &mut state);

    let details = match session.selected() {
        None => vec![Line::from("(no selection)")],
        Some(save) => {
            let actions = session.actions();
            let mut out = vec![
                Line::from(format!("name: {}", save.name)),
                Line::from(vec![
                    Span::raw("status: "),
                    Span::styled(
                        save.status.as_str(),
                        Style::default().fg(status_color(save.status)),
                    ),
                ]),
            ];
            if let Some(version) = save.server_version() {
                out.push(Line::from(format!("version: {version}")));
            }
            if let Some(accessed) = save.meta_str(ACCESS_TIME_KEY).filter(|s| !s.is_empty()) {
                out.push(Line::from(format!("last played: {}", fmt_stamp(accessed))));
            }
            let mut enabled = Vec::new();
            if let Some(play) = actions.play {
                enabled.push(format!("s:{}", play.label()));
            }
            if actions.modify {
                enabled.push("e:edit".to_string());
            }
            if actions.delete {
                enabled.push("d:delete".to_string());
            }
            if actions.console {
                enabled.push("c:console".to_string());
            }
            out.push(Line::from(Span::styled(
                format!("actions: {}", enabled.join("  ")),
                Style::default().fg(Color::Cyan),
            )));
            out
        }
    };
    frame.render_widget(Paragraph::new(details).wrap(Wrap { trim: false }), parts[1]);
}
