use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState};

use super::super::app::App;
use super::render_view_chrome;
use crate::session::forms::{FormField, PropForm};

const LABEL_WIDTH: usize = 22;

fn row(label: &str, value: &str, focused: bool, desc: &str) -> ListItem<'static> {
    let value_style = if focused {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut spans = vec![
        Span::styled(
            format!("{label:<width$}", width = LABEL_WIDTH),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            if focused {
                format!("{value}_")
            } else {
                value.to_string()
            },
            value_style,
        ),
    ];
    if focused && !desc.is_empty() {
        spans.push(Span::styled(
            format!("  {desc}"),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn prop_rows(props: &PropForm, offset: usize, focus: usize) -> Vec<ListItem<'static>> {
    props
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field): (usize, &FormField)| {
            row(
                field.label(),
                &field.display(),
                offset + i == focus,
                &field.prop.desc,
            )
        })
        .collect()
}

fn render_rows(frame: &mut ratatui::Frame, area: Rect, rows: Vec<ListItem<'static>>, focus: usize) {
    let mut state = ListState::default();
    state.select(Some(focus));
    let list = List::new(rows).highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, area, &mut state);
}

pub(in crate::tui_shell) fn render_create(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let session = &app.session;
    let note = if session.schema().is_none() {
        "loading schema…"
    } else {
        "new save"
    };
    let inner = render_view_chrome(frame, "Create", note, area);

    let form = session.create_form();
    let focus = form.focus_row();
    let version = if form.version.is_empty() {
        "(press v to pick)"
    } else {
        form.version.as_str()
    };
    let mut rows = vec![
        row("name", &form.name, focus == 0, "checked by the server"),
        row("server version", version, focus == 1, ""),
    ];
    rows.extend(prop_rows(form.props(), 2, focus));
    render_rows(frame, inner, rows, focus);
}

pub(in crate::tui_shell) fn render_modify(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let form = app.session.modify_form();
    let note = format!("editing {}", form.target());
    let inner = render_view_chrome(frame, "Modify", &note, area);

    let focus = form.focus_row();
    let mut rows = prop_rows(form.props(), 0, focus);
    if rows.is_empty() {
        rows.push(ListItem::new("(no writable properties)"));
    }
    render_rows(frame, inner, rows, focus);
}
