use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{CardPatch, LanePatch, Updates};
use crate::model::SortMode;
use crate::ops::sort;
use crate::sync::{HostSnapshot, JobTag, QueuedField, StoreJob};
use crate::tui::app::{App, ConfirmAction, EditTarget, Mode};

use super::*;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return;
    }
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Left | KeyCode::Char('h') => move_lane_cursor(app, -1),
        KeyCode::Right | KeyCode::Char('l') => move_lane_cursor(app, 1),
        KeyCode::Up | KeyCode::Char('k') => move_card_cursor(app, -1),
        KeyCode::Down | KeyCode::Char('j') => move_card_cursor(app, 1),

        KeyCode::Tab => cycle_board(app, 1),
        KeyCode::BackTab => cycle_board(app, -1),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if let Some(board) = app.ws.boards.get(index) {
                let id = board.id.clone();
                app.switch_board(&id);
            }
        }

        KeyCode::Enter => edit_at_cursor(app),
        KeyCode::Char('a') => add_card(app),
        KeyCode::Char('A') => add_lane(app),
        KeyCode::Char('r') => rename_lane(app),

        KeyCode::Char('f') => toggle_flagged(app),
        KeyCode::Char('x') => toggle_done(app),
        KeyCode::Char('s') => toggle_sort_mode(app),

        KeyCode::Char('d') => request_delete_card(app),
        KeyCode::Char('D') => request_close_lane(app),

        KeyCode::Char('/') => {
            app.filter_input = app.filter.clone().unwrap_or_default();
            app.mode = Mode::Filter;
        }
        KeyCode::Esc => {
            app.filter = None;
            app.status = None;
            app.error = None;
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Cursor movement
// ---------------------------------------------------------------------------

fn move_lane_cursor(app: &mut App, delta: isize) {
    let Some(board) = app.current_board() else { return };
    let count = board.lanes.len();
    if count == 0 {
        return;
    }
    let state = app.board_state();
    let next = state.cursor_lane.saturating_add_signed(delta).min(count - 1);
    state.cursor_lane = next;
    app.clamp_cursor();
}

fn move_card_cursor(app: &mut App, delta: isize) {
    let Some(board) = app.current_board() else { return };
    let lanes: Vec<usize> = board.lanes.iter().map(|l| l.cards.len()).collect();
    let state = app.board_state();
    let Some(&count) = lanes.get(state.cursor_lane) else { return };
    if count == 0 {
        return;
    }
    state.cursor_card = state.cursor_card.saturating_add_signed(delta).min(count - 1);
}

fn cycle_board(app: &mut App, delta: isize) {
    let count = app.ws.boards.len();
    if count == 0 {
        return;
    }
    let current = app.ws.board_index(&app.active_board).unwrap_or(0);
    let next = (current as isize + delta).rem_euclid(count as isize) as usize;
    let id = app.ws.boards[next].id.clone();
    app.switch_board(&id);
}

/// Lane id and card id under the cursor; the card id is `None` on the draft
/// row, the whole result is `None` on the draft lane.
fn cursor_ids(app: &App) -> Option<(String, Option<String>)> {
    let board = app.current_board()?;
    let state = app.view_state(&app.active_board);
    let lane = board.lanes.get(state.cursor_lane)?;
    let lane_id = lane.id.clone()?;
    let card = lane.cards.get(state.cursor_card)?;
    Some((lane_id, card.id.clone()))
}

fn cursor_is_draft_lane(app: &App) -> bool {
    let Some(board) = app.current_board() else {
        return false;
    };
    let state = app.view_state(&app.active_board);
    board
        .lanes
        .get(state.cursor_lane)
        .is_some_and(|l| l.is_draft())
}

// ---------------------------------------------------------------------------
// Editor entry
// ---------------------------------------------------------------------------

pub(super) fn begin_edit(app: &mut App, target: EditTarget, initial: &str) {
    app.edit_buffer = initial.to_string();
    app.edit_cursor = app.edit_buffer.len();
    app.edit_target = Some(target);
    app.mode = Mode::Edit;
}

fn edit_at_cursor(app: &mut App) {
    if cursor_is_draft_lane(app) {
        add_lane(app);
        return;
    }
    let Some((lane_id, card_id)) = cursor_ids(app) else { return };
    match card_id {
        None => begin_edit(app, EditTarget::DraftCard { lane_id }, ""),
        Some(card_id) => {
            let title = app.ws.card(&card_id).map(|c| c.title.clone()).unwrap_or_default();
            begin_edit(app, EditTarget::RenameCard { card_id }, &title);
        }
    }
}

/// Jump to the current lane's draft row and open it.
fn add_card(app: &mut App) {
    let Some(board) = app.current_board() else { return };
    let state = app.view_state(&app.active_board);
    let Some(lane) = board.lanes.get(state.cursor_lane) else { return };
    let Some(lane_id) = lane.id.clone() else {
        add_lane(app);
        return;
    };
    let Some(draft_at) = lane.draft_index() else { return };
    app.board_state().cursor_card = draft_at;
    begin_edit(app, EditTarget::DraftCard { lane_id }, "");
}

fn add_lane(app: &mut App) {
    let board_id = app.active_board.clone();
    if app.ws.board(&board_id).is_none() {
        return;
    }
    begin_edit(app, EditTarget::DraftLane { board_id }, "");
}

fn rename_lane(app: &mut App) {
    let Some(board) = app.current_board() else { return };
    let state = app.view_state(&app.active_board);
    let Some(lane) = board.lanes.get(state.cursor_lane) else { return };
    let Some(lane_id) = lane.id.clone() else { return };
    let name = lane.name.clone();
    begin_edit(app, EditTarget::RenameLane { lane_id }, &name);
}

// ---------------------------------------------------------------------------
// Field toggles
// ---------------------------------------------------------------------------

pub(super) fn toggle_flagged(app: &mut App) {
    toggle_card_field(app, QueuedField::Flagged(true));
}

pub(super) fn toggle_done(app: &mut App) {
    toggle_card_field(app, QueuedField::Done(true));
}

/// Flip one boolean on the cursor card.
///
/// Real cards persist immediately. A draft flips locally; when its create is
/// still in flight the new value also queues behind it, to be flushed as one
/// follow-up update once the id exists.
fn toggle_card_field(app: &mut App, kind: QueuedField) {
    let Some((lane_id, card_id)) = cursor_ids(app) else { return };
    match card_id {
        None => {
            let Some(lane) = app.ws.lane_mut(&lane_id) else { return };
            let Some(at) = lane.draft_index() else { return };
            let card = &mut lane.cards[at];
            let field = match kind {
                QueuedField::Flagged(_) => QueuedField::Flagged(!card.flagged),
                QueuedField::Done(_) => QueuedField::Done(!card.done),
            };
            field.apply(card);
            if app.guard.is_busy(&lane_id) {
                app.guard.queue(&lane_id, field);
            }
        }
        Some(card_id) => {
            let Some(lane) = app.ws.lane(&lane_id) else { return };
            let snapshot = HostSnapshot::LaneCards {
                lane_id: lane_id.clone(),
                cards: lane.cards.clone(),
            };
            let mode = lane.sort_mode;
            let Some(lane) = app.ws.lane_mut(&lane_id) else { return };
            let Some(card) = lane.card_mut(&card_id) else { return };
            let (field, patch) = match kind {
                QueuedField::Flagged(_) => {
                    let v = !card.flagged;
                    (
                        QueuedField::Flagged(v),
                        CardPatch {
                            id: card_id.clone(),
                            flagged: Some(v),
                            ..CardPatch::default()
                        },
                    )
                }
                QueuedField::Done(_) => {
                    let v = !card.done;
                    (
                        QueuedField::Done(v),
                        CardPatch {
                            id: card_id.clone(),
                            done: Some(v),
                            ..CardPatch::default()
                        },
                    )
                }
            };
            field.apply(card);
            if mode == SortMode::Priority {
                sort::sort_cards(&mut lane.cards, mode);
            }
            let token = app.snapshots.capture(vec![snapshot]);
            app.sync
                .submit(JobTag::Persist(token), StoreJob::Update(Updates::Cards(vec![patch])));
            app.clamp_cursor();
        }
    }
}

/// Flip the cursor lane between priority and hand order.
fn toggle_sort_mode(app: &mut App) {
    let Some(board) = app.current_board() else { return };
    let board_id = board.id.clone();
    let state = app.view_state(&app.active_board);
    let Some(lane) = board.lanes.get(state.cursor_lane) else { return };
    let Some(lane_id) = lane.id.clone() else { return };

    // mode lives on the lane, so the rollback snapshot covers whole lanes
    let snapshot = HostSnapshot::BoardLanes {
        board_id: board_id.clone(),
        lanes: board.lanes.clone(),
    };
    let Some(lane) = app.ws.lane_mut(&lane_id) else { return };
    let mode = lane.sort_mode.toggled();
    lane.sort_mode = mode;
    sort::sort_cards(&mut lane.cards, mode);

    let token = app.snapshots.capture(vec![snapshot]);
    let patch = LanePatch {
        id: lane_id,
        sort_mode: Some(mode),
        ..LanePatch::default()
    };
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Lanes(vec![patch])));
    app.set_status(format!("sort: {}", mode.label()));
}

// ---------------------------------------------------------------------------
// Destructive actions (confirmed)
// ---------------------------------------------------------------------------

fn request_delete_card(app: &mut App) {
    let Some((_, Some(card_id))) = cursor_ids(app) else { return };
    let Some(card) = app.ws.card(&card_id) else { return };
    app.confirm = Some(ConfirmAction::DeleteCard {
        card_id,
        title: card.title.clone(),
    });
    app.mode = Mode::Confirm;
}

fn request_close_lane(app: &mut App) {
    let Some(board) = app.current_board() else { return };
    let state = app.view_state(&app.active_board);
    let Some(lane) = board.lanes.get(state.cursor_lane) else { return };
    let Some(lane_id) = lane.id.clone() else { return };
    app.confirm = Some(ConfirmAction::CloseLane {
        lane_id,
        name: lane.name.clone(),
    });
    app.mode = Mode::Confirm;
}
