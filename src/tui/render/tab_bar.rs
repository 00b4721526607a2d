use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::tui::drag::DragPayload;
use crate::tui::layout::Region;

/// Render the tab bar: one tab per board, with separator line below.
pub fn render_tab_bar(frame: &mut Frame, app: &mut App, area: Rect) {
    // Split into tab row and separator row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let (sep_cols, caret_col) = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols, caret_col);
}

/// Render tabs and return the column positions of each separator character,
/// plus the caret column for an in-flight tab drag.
fn render_tabs(frame: &mut Frame, app: &mut App, area: Rect) -> (Vec<usize>, Option<usize>) {
    let boards: Vec<(String, String)> = app
        .ws
        .boards
        .iter()
        .map(|b| (b.id.clone(), b.name.clone()))
        .collect();
    let (dragged_tab, tab_insertion) = match &app.drag {
        Some(session) => match &session.payload {
            DragPayload::Tab { board_id } => (
                Some(board_id.clone()),
                session.insertion.as_ref().map(|p| p.index),
            ),
            _ => (None, None),
        },
        None => (None, None),
    };

    let mut spans: Vec<Span> = Vec::new();
    let mut sep_cols: Vec<usize> = Vec::new();
    let mut tab_starts: Vec<usize> = Vec::new();
    let sep = Span::styled(
        "\u{2502}",
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    );

    // Leading icon
    let bg_style = Style::default().bg(app.theme.background);
    spans.push(Span::styled(" ", bg_style));
    spans.push(Span::styled(
        "\u{25B6}",
        Style::default().fg(app.theme.highlight).bg(app.theme.background),
    ));
    spans.push(Span::styled(" ", bg_style));

    for (i, (board_id, name)) in boards.iter().enumerate() {
        let start: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        tab_starts.push(start);

        let is_current = *board_id == app.active_board;
        let mut style = tab_style(app, is_current);
        if dragged_tab.as_deref() == Some(board_id.as_str()) {
            style = style.fg(app.theme.drag_source);
        }
        spans.push(Span::styled(format!(" {} ", name), style));

        let end: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        if start < area.width as usize {
            let width = end.min(area.width as usize) - start;
            app.hit_map.record(
                Rect::new(area.x + start as u16, area.y, width as u16, 1),
                Region::Tab { index: i, board_id: board_id.clone() },
            );
        }

        sep_cols.push(end);
        spans.push(sep.clone());
    }

    // Caret column for the tab-drag insertion indicator: the left edge of the
    // target slot, or the trailing separator when dropping at the end.
    let caret_col = tab_insertion.and_then(|idx| {
        if idx == 0 {
            tab_starts.first().copied()
        } else {
            sep_cols.get(idx - 1).copied()
        }
    });

    let line = Line::from(spans);
    let tabs = Paragraph::new(line).style(Style::default().bg(app.theme.background));
    frame.render_widget(tabs, area);
    (sep_cols, caret_col)
}

fn render_separator(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    sep_cols: &[usize],
    caret_col: Option<usize>,
) {
    let width = area.width as usize;
    let bg = app.theme.background;
    let dim = app.theme.dim;

    let sep_char = |col: usize| {
        if sep_cols.contains(&col) { '\u{2534}' } else { '\u{2500}' }
    };

    if let Some(caret) = caret_col.filter(|c| *c < width) {
        // A tab drag is live: mark the drop slot with a caret.
        let before: String = (0..caret).map(sep_char).collect();
        let after: String = (caret + 1..width).map(sep_char).collect();
        let line = Line::from(vec![
            Span::styled(before, Style::default().fg(dim).bg(bg)),
            Span::styled(
                "\u{25B2}",
                Style::default().fg(app.theme.indicator).bg(bg).add_modifier(Modifier::BOLD),
            ),
            Span::styled(after, Style::default().fg(dim).bg(bg)),
        ]);
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
        return;
    }

    if let Some(query) = &app.filter {
        // Right-align a filter indicator inside the separator line.
        let indicator = format!("filter: {}", query);
        let indicator_width = indicator.chars().count();
        // +2: one space before the indicator, one space after
        let separator_end = width.saturating_sub(indicator_width + 2);
        let sep_text: String = (0..separator_end).map(sep_char).collect();
        let mut spans = vec![
            Span::styled(sep_text, Style::default().fg(dim).bg(bg)),
            Span::styled(" ", Style::default().bg(bg)),
            Span::styled(indicator, Style::default().fg(app.theme.highlight).bg(bg)),
        ];
        let current_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        if current_width < width {
            spans.push(Span::styled(" ".repeat(width - current_width), Style::default().bg(bg)));
        }
        let line = Line::from(spans);
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
        return;
    }

    // No filter — plain separator
    let line: String = (0..width).map(sep_char).collect();
    let sep_widget = Paragraph::new(line).style(Style::default().fg(dim).bg(bg));
    frame.render_widget(sep_widget, area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}
