use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::tui::app::{App, Mode};
use crate::tui::drag::{self, commit};
use crate::tui::layout::Region;

use super::*;

pub(super) fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.mode != Mode::Navigate {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => on_down(app, mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => on_drag(app, mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => on_up(app, mouse.column, mouse.row),
        MouseEventKind::ScrollUp => scroll(app, -1),
        MouseEventKind::ScrollDown => scroll(app, 1),
        _ => {}
    }
}

/// Press: remember the region. It becomes a drag on the first drag event or
/// a click on release. Pressing a card row moves the cursor immediately.
fn on_down(app: &mut App, x: u16, y: u16) {
    app.status = None;
    app.error = None;
    let Some(hit) = app.hit_map.hit_test(x, y) else {
        app.press = None;
        return;
    };
    let region = hit.region.clone();
    if let Region::CardRow { lane_id, index, .. } = &region {
        place_cursor(app, lane_id, *index);
    }
    app.press = Some(region);
}

fn on_drag(app: &mut App, x: u16, y: u16) {
    if app.drag.is_none() {
        let Some(region) = app.press.take() else { return };
        if !drag::start(app, &region) {
            return;
        }
    }
    drag::update_hover(app, x, y);
}

/// Release: a live drag commits when the pointer sits over a target and
/// cancels when it does not. A plain click on a tab switches boards.
fn on_up(app: &mut App, x: u16, y: u16) {
    if app.drag.is_some() {
        if app.hit_map.hit_test(x, y).is_some() {
            commit::resolve_drop(app);
        } else {
            drag::cancel(app);
        }
        app.clamp_cursor();
        return;
    }
    let Some(region) = app.press.take() else { return };
    if let Region::Tab { board_id, .. } = region {
        app.switch_board(&board_id);
    }
}

fn place_cursor(app: &mut App, lane_id: &str, card_index: usize) {
    let Some(board) = app.current_board() else { return };
    let Some(lane_index) = board.lane_index(lane_id) else { return };
    let state = app.board_state();
    state.cursor_lane = lane_index;
    state.cursor_card = card_index;
    app.clamp_cursor();
}

fn scroll(app: &mut App, delta: isize) {
    let state = app.board_state();
    state.scroll_offset = state.scroll_offset.saturating_add_signed(delta);
}
