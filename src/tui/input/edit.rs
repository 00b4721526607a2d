use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{CardFields, CardPatch, LaneFields, LanePatch, Updates};
use crate::model::SortMode;
use crate::sync::{HostSnapshot, JobTag, StoreJob};
use crate::tui::app::{App, EditTarget, Mode};
use crate::util::text::{next_grapheme, prev_grapheme, sanitize_title};

use super::*;

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => close_editor(app),
        (_, KeyCode::Enter) => commit_editor(app),
        (_, KeyCode::Backspace) => {
            if let Some(at) = prev_grapheme(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.replace_range(at..app.edit_cursor, "");
                app.edit_cursor = at;
            }
        }
        (_, KeyCode::Left) => {
            if let Some(at) = prev_grapheme(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = at;
            }
        }
        (_, KeyCode::Right) => {
            if let Some(at) = next_grapheme(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = at;
            }
        }
        (_, KeyCode::Home) => app.edit_cursor = 0,
        (_, KeyCode::End) => app.edit_cursor = app.edit_buffer.len(),
        (mods, KeyCode::Char(c)) if !mods.contains(KeyModifiers::CONTROL) => {
            app.edit_buffer.insert(app.edit_cursor, c);
            app.edit_cursor += c.len_utf8();
        }
        _ => {}
    }
}

pub(super) fn close_editor(app: &mut App) {
    app.edit_target = None;
    app.edit_buffer.clear();
    app.edit_cursor = 0;
    app.mode = Mode::Navigate;
}

fn commit_editor(app: &mut App) {
    let Some(target) = app.edit_target.clone() else {
        close_editor(app);
        return;
    };
    let text = sanitize_title(&app.edit_buffer);
    let text = text.trim().to_string();
    close_editor(app);
    if text.is_empty() {
        return;
    }
    match target {
        EditTarget::DraftCard { lane_id } => submit_draft_card(app, &lane_id, text),
        EditTarget::DraftLane { board_id } => submit_draft_lane(app, &board_id, text),
        EditTarget::RenameCard { card_id } => rename_card(app, &card_id, text),
        EditTarget::RenameLane { lane_id } => rename_lane_now(app, &lane_id, text),
    }
}

// ---------------------------------------------------------------------------
// Draft promotion
// ---------------------------------------------------------------------------

/// Send the draft to the store. The row stays in place showing its text; the
/// id arrives asynchronously. The guard refuses a second submit for the same
/// lane while the first is still out.
fn submit_draft_card(app: &mut App, lane_id: &str, title: String) {
    if !app.guard.begin(lane_id) {
        app.set_status("still saving the previous card");
        return;
    }
    let Some(lane) = app.ws.lane_mut(lane_id) else {
        app.guard.abort(lane_id);
        return;
    };
    let order = match lane.sort_mode {
        SortMode::Hand => Some(lane.next_card_order()),
        SortMode::Priority => None,
    };
    let Some(at) = lane.draft_index() else {
        app.guard.abort(lane_id);
        return;
    };
    let draft = &mut lane.cards[at];
    draft.title = title.clone();
    let fields = CardFields {
        title,
        flagged: draft.flagged,
        done: draft.done,
        sort_order: order,
    };
    app.sync.submit(
        JobTag::CreateCard {
            lane_id: lane_id.to_string(),
        },
        StoreJob::CreateCard {
            lane_id: lane_id.to_string(),
            fields,
        },
    );
}

fn submit_draft_lane(app: &mut App, board_id: &str, name: String) {
    if !app.guard.begin(board_id) {
        app.set_status("still saving the previous lane");
        return;
    }
    let Some(board) = app.ws.board_mut(board_id) else {
        app.guard.abort(board_id);
        return;
    };
    let order = board.next_lane_order();
    let Some(at) = board.draft_lane_index() else {
        app.guard.abort(board_id);
        return;
    };
    board.lanes[at].name = name.clone();
    let fields = LaneFields {
        name,
        sort_mode: SortMode::default(),
        sort_order: Some(order),
    };
    app.sync.submit(
        JobTag::CreateLane {
            board_id: board_id.to_string(),
        },
        StoreJob::CreateLane {
            board_id: board_id.to_string(),
            fields,
        },
    );
}

// ---------------------------------------------------------------------------
// Renames
// ---------------------------------------------------------------------------

fn rename_card(app: &mut App, card_id: &str, title: String) {
    let Some(loc) = app.ws.find_card(card_id) else { return };
    let Some(lane) = app.ws.lane(&loc.lane_id) else { return };
    let snapshot = HostSnapshot::LaneCards {
        lane_id: loc.lane_id.clone(),
        cards: lane.cards.clone(),
    };
    let Some(card) = app.ws.card_mut(card_id) else { return };
    card.title = title.clone();

    let token = app.snapshots.capture(vec![snapshot]);
    let patch = CardPatch {
        id: card_id.to_string(),
        title: Some(title),
        ..CardPatch::default()
    };
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Cards(vec![patch])));
}

fn rename_lane_now(app: &mut App, lane_id: &str, name: String) {
    let Some(board) = app.ws.board_of_lane(lane_id) else { return };
    let snapshot = HostSnapshot::BoardLanes {
        board_id: board.id.clone(),
        lanes: board.lanes.clone(),
    };
    let Some(lane) = app.ws.lane_mut(lane_id) else { return };
    lane.name = name.clone();

    let token = app.snapshots.capture(vec![snapshot]);
    let patch = LanePatch {
        id: lane_id.to_string(),
        name: Some(name),
        ..LanePatch::default()
    };
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Lanes(vec![patch])));
}
