use crossterm::event::{KeyCode, KeyEvent};

use crate::api::{EntityKind, LanePatch, Updates};
use crate::model::SortMode;
use crate::ops::{card_ops, lane_ops};
use crate::sync::{HostSnapshot, JobTag, StoreJob};
use crate::tui::app::{App, ConfirmAction, Mode};

use super::*;

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let action = app.confirm.take();
            app.mode = Mode::Navigate;
            match action {
                Some(ConfirmAction::DeleteCard { card_id, .. }) => delete_card(app, &card_id),
                Some(ConfirmAction::CloseLane { lane_id, .. }) => close_lane(app, &lane_id),
                None => {}
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

/// Remove the card locally and delete it in the store. A hand-mode lane
/// renumbers its remainder in a second call.
fn delete_card(app: &mut App, card_id: &str) {
    let Some(loc) = app.ws.find_card(card_id) else { return };
    let Some(lane) = app.ws.lane_mut(&loc.lane_id) else { return };
    let snapshot = HostSnapshot::LaneCards {
        lane_id: loc.lane_id.clone(),
        cards: lane.cards.clone(),
    };
    if card_ops::extract_card(lane, card_id).is_err() {
        return;
    }
    let mode = lane.sort_mode;

    let token = app.snapshots.capture(vec![snapshot]);
    app.sync.submit(
        JobTag::Persist(token),
        StoreJob::Delete(EntityKind::Card, card_id.to_string()),
    );

    if mode == SortMode::Hand {
        let Some(lane) = app.ws.lane_mut(&loc.lane_id) else { return };
        let post_delete = HostSnapshot::LaneCards {
            lane_id: loc.lane_id.clone(),
            cards: lane.cards.clone(),
        };
        let pairs = card_ops::renumber_cards(lane);
        if pairs.is_empty() {
            app.clamp_cursor();
            return;
        }
        let patches = pairs
            .into_iter()
            .map(|(id, order)| crate::api::CardPatch::order(id, order))
            .collect();
        let token = app.snapshots.capture(vec![post_delete]);
        app.sync
            .submit(JobTag::Persist(token), StoreJob::Update(Updates::Cards(patches)));
    }
    app.clamp_cursor();
}

/// Soft-remove the lane: it leaves the board but its record survives in the
/// store with `closed` set and its order cleared. The close patch and the
/// sibling renumber travel as one bulk update.
fn close_lane(app: &mut App, lane_id: &str) {
    let Some(board) = app.ws.board_of_lane(lane_id) else { return };
    let board_id = board.id.clone();
    let snapshot = HostSnapshot::BoardLanes {
        board_id: board_id.clone(),
        lanes: board.lanes.clone(),
    };
    let Some(board) = app.ws.board_mut(&board_id) else { return };
    if lane_ops::extract_lane(board, lane_id).is_err() {
        return;
    }
    let mut patches = vec![LanePatch {
        id: lane_id.to_string(),
        closed: Some(true),
        ..LanePatch::default()
    }];
    patches.extend(
        lane_ops::renumber_lanes(board)
            .into_iter()
            .map(|(id, order)| LanePatch::order(id, order)),
    );

    let token = app.snapshots.capture(vec![snapshot]);
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Lanes(patches)));
    app.clamp_cursor();
}
