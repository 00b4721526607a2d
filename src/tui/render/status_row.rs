use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, ConfirmAction, EditTarget, Mode};

const NAVIGATE_HINTS: &str = "a card  A lane  f flag  x done  s sort  / filter  q quit";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = match app.mode {
        Mode::Navigate => navigate_line(app, width),
        Mode::Edit => edit_line(app, width),
        Mode::Confirm => confirm_line(app),
        Mode::Filter => {
            // Filter prompt: /pattern▌
            let spans = vec![
                Span::styled(
                    format!("/{}", app.filter_input),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            with_hint(app, spans, "Enter apply  Esc clear", width)
        }
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn navigate_line(app: &App, width: usize) -> Line<'static> {
    let bg = app.theme.background;
    if let Some(msg) = &app.error {
        return Line::from(Span::styled(
            format!(" {}", msg),
            Style::default().fg(app.theme.red).bg(bg),
        ));
    }
    let mut spans: Vec<Span> = Vec::new();
    if let Some(msg) = &app.status {
        spans.push(Span::styled(
            format!(" {}", msg),
            Style::default().fg(app.theme.text).bg(bg),
        ));
    } else if app.sync.pending() > 0 {
        spans.push(Span::styled(
            " syncing\u{2026}",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }
    if app.show_key_hints {
        return with_hint(app, spans, NAVIGATE_HINTS, width);
    }
    if spans.is_empty() {
        return Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg)));
    }
    Line::from(spans)
}

/// Editor prompt with the cursor marker at the byte cursor.
fn edit_line(app: &App, width: usize) -> Line<'static> {
    let bg = app.theme.background;
    let label = match &app.edit_target {
        Some(EditTarget::DraftCard { .. }) => "new card: ",
        Some(EditTarget::DraftLane { .. }) => "new lane: ",
        Some(EditTarget::RenameCard { .. }) => "rename: ",
        Some(EditTarget::RenameLane { .. }) => "rename lane: ",
        None => "edit: ",
    };
    let cursor = app.edit_cursor.min(app.edit_buffer.len());
    let before = app.edit_buffer[..cursor].to_string();
    let after = app.edit_buffer[cursor..].to_string();
    let text_style = Style::default().fg(app.theme.text_bright).bg(bg);
    let spans = vec![
        Span::styled(format!(" {}", label), Style::default().fg(app.theme.dim).bg(bg)),
        Span::styled(before, text_style),
        Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(after, text_style),
    ];
    with_hint(app, spans, "Enter save  Esc cancel", width)
}

fn confirm_line(app: &App) -> Line<'static> {
    let bg = app.theme.background;
    match &app.confirm {
        Some(ConfirmAction::DeleteCard { title, .. }) => Line::from(Span::styled(
            format!(" delete card '{}'? (y/n)", title),
            Style::default().fg(app.theme.red).bg(bg),
        )),
        Some(ConfirmAction::CloseLane { name, .. }) => Line::from(Span::styled(
            format!(" close lane '{}'? (y/n)", name),
            Style::default().fg(app.theme.yellow).bg(bg),
        )),
        None => Line::from(""),
    }
}

/// Pad the given spans and right-align a dim hint, if it fits.
fn with_hint(app: &App, mut spans: Vec<Span<'static>>, hint: &str, width: usize) -> Line<'static> {
    let bg = app.theme.background;
    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let hint_width = hint.chars().count() + 1;
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(
            format!("{} ", hint),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }
    Line::from(spans)
}
