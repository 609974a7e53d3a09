use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders};

pub(super) mod confirm;
pub(super) mod console;
pub(super) mod form;
pub(super) mod saves;

/// Bordered frame with a yellow title and a gray note; returns the inner area.
pub(super) fn render_view_chrome(
    frame: &mut ratatui::Frame,
    title: &str,
    note: &str,
    area: Rect,
) -> Rect {
    let header = Line::from(vec![
        Span::styled(title.to_string(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(note.to_string(), Style::default().fg(Color::Gray)),
    ]);
    let outer = Block::default().borders(Borders::ALL).title(header);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);
    inner
}
