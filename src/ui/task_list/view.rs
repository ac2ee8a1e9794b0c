use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::storage::KeyValueStore;
use crate::view::RenderedItem;

use super::app::{AppState, Focus, StatusKind};

const ID_WIDTH: usize = 14;
const CONTROL_WIDTH: usize = 10;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_INPUT: Color = Color::Rgb(180, 156, 92);

pub fn render<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_input(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    if let Some(message) = app.alert() {
        render_alert_modal(frame, area, message);
    }
}

fn border_color(active: bool, color: Color) -> Style {
    if active {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_MUTED_DARK)
    }
}

fn render_input<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let focused = app.focus == Focus::Input;
    let input = app.input();
    let widget = Paragraph::new(Line::from(Span::styled(
        input.clone(),
        Style::default().fg(COLOR_TEXT),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("New task")
            .border_style(border_color(focused, COLOR_BORDER_INPUT)),
    );
    frame.render_widget(widget, area);

    if focused && app.alert().is_none() {
        let max_x = area.x + area.width.saturating_sub(2);
        let x = (area.x + 1 + input.chars().count() as u16).min(max_x);
        frame.set_cursor(x, area.y + 1);
    }
}

fn render_list<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let focused = app.focus == Focus::List;
    let mut lines: Vec<Line<'static>> = Vec::new();

    let items = app.items();
    if items.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tasks",
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let height = area.height.saturating_sub(2) as usize;
        let (start, end) = list_window(items.len(), app.selected, height);
        for (idx, item) in items.iter().enumerate().take(end).skip(start) {
            let selected = focused && app.selected == Some(idx);
            lines.push(render_list_row(item, selected, content_width));
        }
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Tasks")
            .border_style(border_color(focused, COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_list_row(item: &RenderedItem, selected: bool, width: usize) -> Line<'static> {
    let control = pad_text(&format!("[{}]", item.control_label()), CONTROL_WIDTH);
    let id_text = pad_text(&item.id.to_string(), ID_WIDTH);
    let text_width = width.saturating_sub(CONTROL_WIDTH + ID_WIDTH + 2);
    let text = truncate_text(&item.text, text_width);

    let (control_style, text_style) = if item.completed {
        (
            Style::default().fg(COLOR_WARNING),
            Style::default()
                .fg(COLOR_MUTED)
                .add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        (
            Style::default().fg(COLOR_SUCCESS),
            Style::default().fg(COLOR_TEXT),
        )
    };

    let mut spans = vec![
        Span::styled(control, control_style),
        Span::raw(" "),
        Span::styled(id_text, Style::default().fg(COLOR_MUTED_DARK)),
        Span::raw(" "),
        Span::styled(text, text_style),
    ];
    if selected {
        for span in spans.iter_mut() {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }
    Line::from(spans)
}

fn render_footer<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let counts_line = Line::from(Span::styled(
        app.task_count_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_alert_modal(frame: &mut Frame, area: Rect, message: &str) {
    let content_width = area.width.saturating_sub(8).min(48);
    let height = 6u16.min(area.height.saturating_sub(2));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let lines = vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "press any key",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Alert"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Visible `[start, end)` range that keeps the selection on screen.
fn list_window(len: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if height == 0 {
        return (0, 0);
    }
    if len <= height {
        return (0, len);
    }
    let selected = selected.unwrap_or(0).min(len - 1);
    let start = selected.saturating_sub(height - 1);
    (start, (start + height).min(len))
}

fn pad_text(text: &str, width: usize) -> String {
    let truncated = truncate_text(text, width);
    format!("{truncated:<width$}")
}

fn truncate_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 1 {
        return text.chars().take(width).collect();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('~');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_window_follows_selection() {
        assert_eq!(list_window(3, Some(2), 10), (0, 3));
        assert_eq!(list_window(20, Some(0), 5), (0, 5));
        assert_eq!(list_window(20, Some(12), 5), (8, 13));
        assert_eq!(list_window(20, Some(99), 5), (15, 20));
        assert_eq!(list_window(20, None, 0), (0, 0));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate_text("BUY MILK", 20), "BUY MILK");
        assert_eq!(truncate_text("BUY MILK", 4), "BUY~");
        assert_eq!(pad_text("Undo", 6), "Undo  ");
    }

    #[test]
    fn row_shows_control_label() {
        let item = RenderedItem {
            id: 1,
            text: "BUY MILK".to_string(),
            completed: false,
        };
        let line = render_list_row(&item, false, 60);
        let rendered: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert!(rendered.contains("[Complete]"));
        assert!(rendered.contains("BUY MILK"));
    }
}
