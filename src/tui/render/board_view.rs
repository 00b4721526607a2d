use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use regex::Regex;

use crate::model::{Card, Lane};
use crate::tui::app::{App, BoardViewState, EditTarget, Mode};
use crate::tui::drag::{Adoption, DragPayload};
use crate::tui::layout::Region;
use crate::util::text::{pad_to_width, truncate_to_width};

/// Drag facts the board panel needs, copied out of the session so the render
/// pass can borrow the workspace freely.
#[derive(Default)]
struct DragView {
    dragged_card: Option<String>,
    dragged_lane: Option<String>,
    /// Lane currently holding the provisional card copy.
    adopted_lane: Option<String>,
    /// Board currently holding the provisional lane copy.
    adopted_board: Option<String>,
    /// Indicator slot in the origin lane (no adoption: the card has not
    /// moved yet, so the slot is drawn instead).
    card_indicator: Option<(String, usize)>,
}

impl DragView {
    fn capture(app: &App) -> Self {
        let Some(session) = &app.drag else {
            return DragView::default();
        };
        let mut view = DragView::default();
        match &session.adoption {
            Some(Adoption::Card { lane_id }) => view.adopted_lane = Some(lane_id.clone()),
            Some(Adoption::Lane { board_id }) => view.adopted_board = Some(board_id.clone()),
            None => {}
        }
        match &session.payload {
            DragPayload::Card { card_id, origin_lane } => {
                view.dragged_card = Some(card_id.clone());
                if view.adopted_lane.is_none()
                    && let Some(point) = session.insertion
                {
                    view.card_indicator = Some((origin_lane.clone(), point.index));
                }
            }
            DragPayload::Lane { lane_id, .. } => view.dragged_lane = Some(lane_id.clone()),
            DragPayload::Tab { .. } => {}
        }
        view
    }

    fn indicator_slot(&self, lane_id: &str) -> Option<usize> {
        match &self.card_indicator {
            Some((id, index)) if id == lane_id => Some(*index),
            _ => None,
        }
    }
}

/// Render the active board: its lanes stacked vertically, draft lane last.
pub fn render_board(frame: &mut Frame, app: &mut App, area: Rect) {
    app.hit_map.record(area, Region::BoardPanel);
    let bg = app.theme.background;

    let Some(board) = app.ws.board(&app.active_board).cloned() else {
        let msg = Paragraph::new(" no boards in the store")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(msg, area);
        return;
    };

    // Keep the scroll anchored to a lane that still exists, and never let the
    // cursor lane sit above the viewport.
    let lane_count = board.lanes.len();
    {
        let state = app.board_state();
        state.scroll_offset = state.scroll_offset.min(lane_count.saturating_sub(1));
        if state.cursor_lane < state.scroll_offset {
            state.scroll_offset = state.cursor_lane;
        }
    }
    let state = app.view_state(&app.active_board);
    let filter = app.filter_re();
    let drag = DragView::capture(app);

    let mut y = area.y;
    let mut cursor_bottom = None;
    for (li, lane) in board.lanes.iter().enumerate().skip(state.scroll_offset) {
        if y >= area.bottom() {
            break;
        }
        let height = lane_height(lane, &filter, &drag) as u16;
        let rect = Rect::new(area.x, y, area.width, height.min(area.bottom() - y));
        render_lane(frame, app, lane, li, rect, &state, &filter, &drag);
        if li == state.cursor_lane {
            cursor_bottom = Some(y.saturating_add(height));
        }
        y += rect.height;
    }

    // Cursor lane off-screen or clipped below: creep the scroll toward it.
    // Settles within a few frames and keeps a drag's geometry stable.
    let cursor_clipped = cursor_bottom.is_none_or(|b| b > area.bottom());
    if cursor_clipped && app.drag.is_none() && state.scroll_offset < lane_count.saturating_sub(1) {
        app.board_state().scroll_offset += 1;
    }
}

/// Rows a lane occupies: borders plus its visible rows.
fn lane_height(lane: &Lane, filter: &Option<Regex>, drag: &DragView) -> usize {
    if lane.is_draft() {
        return 3;
    }
    let mut rows = 0;
    for card in &lane.cards {
        if card.is_draft() {
            rows += 1;
        } else if card_visible(card, filter, drag) {
            rows += 2;
        }
    }
    if let Some(id) = lane.id.as_deref()
        && drag.indicator_slot(id).is_some()
    {
        rows += 1;
    }
    rows + 2
}

/// Filtered-out real cards are hidden, except the one being dragged.
fn card_visible(card: &Card, filter: &Option<Regex>, drag: &DragView) -> bool {
    let Some(re) = filter else { return true };
    if re.is_match(&card.title) {
        return true;
    }
    card.id.is_some() && card.id == drag.dragged_card
}

#[allow(clippy::too_many_arguments)]
fn render_lane(
    frame: &mut Frame,
    app: &mut App,
    lane: &Lane,
    lane_index: usize,
    rect: Rect,
    state: &BoardViewState,
    filter: &Option<Regex>,
    drag: &DragView,
) {
    let bg = app.theme.background;
    let is_cursor_lane = lane_index == state.cursor_lane;

    if lane.is_draft() {
        render_draft_lane(frame, app, rect, is_cursor_lane);
        return;
    }
    let Some(lane_id) = lane.id.clone() else { return };

    let border_fg = if drag.dragged_lane.as_deref() == Some(lane_id.as_str()) {
        if drag.adopted_board.as_deref() == Some(app.active_board.as_str()) {
            app.theme.provisional
        } else {
            app.theme.drag_source
        }
    } else if is_cursor_lane {
        app.theme.selection_border
    } else {
        app.theme.dim
    };
    let title = format!(
        " {} \u{00b7} {} \u{00b7} {} ",
        lane.name,
        lane.sort_mode.label(),
        lane.real_card_count()
    );
    let title_style = if is_cursor_lane {
        Style::default().fg(app.theme.text_bright).bg(bg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(bg)
    };
    let block = Block::bordered()
        .border_style(Style::default().fg(border_fg).bg(bg))
        .title(Span::styled(title, title_style));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    app.hit_map.record(rect, Region::LaneBody { lane_id: lane_id.clone() });
    app.hit_map.record(
        Rect::new(rect.x, rect.y, rect.width, 1),
        Region::LaneHeader { lane_id: Some(lane_id.clone()) },
    );

    let indicator_slot = drag.indicator_slot(&lane_id);
    let mut row = inner.y;
    let mut reals_laid = 0usize;
    for (ci, card) in lane.cards.iter().enumerate() {
        if row >= inner.bottom() {
            return;
        }
        if indicator_slot == Some(reals_laid) && !card.is_draft() {
            render_indicator_row(frame, app, inner, row);
            row += 1;
            if row >= inner.bottom() {
                return;
            }
        }
        if card.is_draft() {
            if indicator_slot == Some(reals_laid) {
                render_indicator_row(frame, app, inner, row);
                row += 1;
                if row >= inner.bottom() {
                    return;
                }
            }
            render_draft_card(frame, app, &lane_id, ci, inner, row, is_cursor_lane, state);
            row += 1;
            continue;
        }
        if !card_visible(card, filter, drag) {
            continue;
        }
        let height = 2.min(inner.bottom() - row);
        let card_rect = Rect::new(inner.x, row, inner.width, height);
        render_card(frame, app, &lane_id, card, ci, card_rect, is_cursor_lane, state, drag);
        reals_laid += 1;
        row += height;
    }
}

fn render_draft_lane(frame: &mut Frame, app: &mut App, rect: Rect, is_cursor_lane: bool) {
    let bg = app.theme.background;
    let border_fg = if is_cursor_lane { app.theme.selection_border } else { app.theme.dim };
    let block = Block::bordered().border_style(Style::default().fg(border_fg).bg(bg));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    app.hit_map.record(rect, Region::LaneHeader { lane_id: None });

    if inner.height == 0 {
        return;
    }
    let editing = app.mode == Mode::Edit
        && matches!(&app.edit_target, Some(EditTarget::DraftLane { .. }));
    let line = if editing {
        editor_line(app)
    } else {
        Line::from(Span::styled(
            " + add a lane",
            Style::default().fg(app.theme.dim).bg(bg),
        ))
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(bg)),
        Rect::new(inner.x, inner.y, inner.width, 1),
    );
}

#[allow(clippy::too_many_arguments)]
fn render_draft_card(
    frame: &mut Frame,
    app: &mut App,
    lane_id: &str,
    card_index: usize,
    inner: Rect,
    row: u16,
    is_cursor_lane: bool,
    state: &BoardViewState,
) {
    let bg = app.theme.background;
    let rect = Rect::new(inner.x, row, inner.width, 1);
    app.hit_map.record(
        rect,
        Region::CardRow { lane_id: lane_id.to_string(), card_id: None, index: card_index },
    );

    let editing = app.mode == Mode::Edit
        && matches!(&app.edit_target, Some(EditTarget::DraftCard { lane_id: id }) if id == lane_id);
    let line = if editing {
        editor_line(app)
    } else {
        let selected = is_cursor_lane && card_index == state.cursor_card;
        let style = if selected {
            Style::default().fg(app.theme.text).bg(app.theme.selection_bg)
        } else {
            Style::default().fg(app.theme.dim).bg(bg)
        };
        Line::from(Span::styled(
            pad_to_width(" + add a card", inner.width as usize),
            style,
        ))
    };
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), rect);
}

#[allow(clippy::too_many_arguments)]
fn render_card(
    frame: &mut Frame,
    app: &mut App,
    lane_id: &str,
    card: &Card,
    card_index: usize,
    rect: Rect,
    is_cursor_lane: bool,
    state: &BoardViewState,
    drag: &DragView,
) {
    let bg = app.theme.background;
    app.hit_map.record(
        rect,
        Region::CardRow {
            lane_id: lane_id.to_string(),
            card_id: card.id.clone(),
            index: card_index,
        },
    );

    let is_dragged = card.id.is_some() && card.id == drag.dragged_card;
    let is_provisional = is_dragged && drag.adopted_lane.as_deref() == Some(lane_id);
    let selected = is_cursor_lane && card_index == state.cursor_card && app.drag.is_none();

    let mut title_style = Style::default().fg(app.theme.text_bright).bg(bg);
    if is_provisional {
        title_style = Style::default().fg(app.theme.provisional).bg(bg);
    } else if is_dragged {
        title_style = Style::default().fg(app.theme.drag_source).bg(bg);
    } else if card.done {
        title_style = Style::default()
            .fg(app.theme.dim)
            .bg(bg)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if selected {
        title_style = title_style.bg(app.theme.selection_bg);
    }

    let renaming = app.mode == Mode::Edit
        && matches!(
            (&app.edit_target, card.id.as_deref()),
            (Some(EditTarget::RenameCard { card_id }), Some(id)) if card_id == id
        );
    let width = rect.width as usize;
    let title_line = if renaming {
        editor_line(app)
    } else {
        let text = format!(" {}", truncate_to_width(&card.title, width.saturating_sub(2)));
        Line::from(Span::styled(pad_to_width(&text, width), title_style))
    };
    frame.render_widget(
        Paragraph::new(title_line).style(Style::default().bg(bg)),
        Rect::new(rect.x, rect.y, rect.width, 1),
    );

    if rect.height < 2 {
        return;
    }
    let meta_bg = if selected { app.theme.selection_bg } else { bg };
    let mut meta = vec![Span::styled("   ", Style::default().bg(meta_bg))];
    if card.flagged {
        meta.push(Span::styled(
            "\u{2691} ",
            Style::default().fg(app.theme.yellow).bg(meta_bg),
        ));
    }
    if card.done {
        meta.push(Span::styled(
            "\u{2713} ",
            Style::default().fg(app.theme.green).bg(meta_bg),
        ));
    }
    let used: usize = meta.iter().map(|s| s.content.chars().count()).sum();
    if used < width {
        meta.push(Span::styled(" ".repeat(width - used), Style::default().bg(meta_bg)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(meta)).style(Style::default().bg(bg)),
        Rect::new(rect.x, rect.y + 1, rect.width, 1),
    );
}

/// The tracked drop slot, drawn as its own dashed row.
fn render_indicator_row(frame: &mut Frame, app: &App, inner: Rect, row: u16) {
    let line: String = "\u{254c}".repeat(inner.width as usize);
    frame.render_widget(
        Paragraph::new(line).style(
            Style::default()
                .fg(app.theme.indicator)
                .bg(app.theme.background)
                .add_modifier(Modifier::BOLD),
        ),
        Rect::new(inner.x, row, inner.width, 1),
    );
}

/// In-place editor row: buffer split at the byte cursor with a block caret.
fn editor_line(app: &App) -> Line<'static> {
    let bg = app.theme.background;
    let cursor = app.edit_cursor.min(app.edit_buffer.len());
    let before = app.edit_buffer[..cursor].to_string();
    let after = app.edit_buffer[cursor..].to_string();
    let text_style = Style::default().fg(app.theme.text_bright).bg(bg);
    Line::from(vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(before, text_style),
        Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(after, text_style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::testing::test_app;
    use crate::tui::drag::{DragSession, Edge, InsertionPoint};
    use crate::tui::render::test_helpers::render_default;

    #[test]
    fn lanes_cards_and_drafts_are_drawn() {
        let (mut app, _store) = test_app();
        let screen = render_default(&mut app);
        assert!(screen.contains("L1"));
        assert!(screen.contains("hand"));
        assert!(screen.contains("L2"));
        assert!(screen.contains("priority"));
        assert!(screen.contains("card a"));
        assert!(screen.contains("card x"));
        assert!(screen.contains("+ add a card"));
        assert!(screen.contains("+ add a lane"));
    }

    #[test]
    fn filter_hides_non_matching_cards_but_not_drafts() {
        let (mut app, _store) = test_app();
        app.filter = Some("card b".into());
        let screen = render_default(&mut app);
        assert!(screen.contains("card b"));
        assert!(!screen.contains("card a"));
        assert!(screen.contains("+ add a card"));
        assert!(screen.contains("filter: card b"));
    }

    #[test]
    fn done_card_shows_check_mark() {
        let (mut app, _store) = test_app();
        if let Some(card) = app.ws.card_mut("a") {
            card.done = true;
        }
        let screen = render_default(&mut app);
        assert!(screen.contains("\u{2713}"));
    }

    #[test]
    fn hit_map_covers_tabs_and_card_rows() {
        let (mut app, _store) = test_app();
        render_default(&mut app);
        assert!(
            app.hit_map
                .find(|r| matches!(r, Region::Tab { board_id, .. } if board_id == "b2"))
                .is_some()
        );
        assert!(
            app.hit_map
                .find(|r| matches!(
                    r,
                    Region::CardRow { card_id: Some(id), .. } if id == "a"
                ))
                .is_some()
        );
        assert!(
            app.hit_map
                .find(|r| matches!(r, Region::LaneHeader { lane_id: Some(id) } if id == "l1"))
                .is_some()
        );
    }

    #[test]
    fn card_drag_draws_slot_indicator_in_origin_lane() {
        let (mut app, _store) = test_app();
        app.drag = Some(DragSession {
            payload: DragPayload::Card { card_id: "a".into(), origin_lane: "l1".into() },
            home_board: "b1".into(),
            insertion: Some(InsertionPoint::new(1, Edge::Above)),
            adoption: None,
            swap_block: None,
            dwell: None,
            prior_lanes: None,
        });
        let screen = render_default(&mut app);
        assert!(screen.contains("\u{254c}"));
    }
}
