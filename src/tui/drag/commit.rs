use crate::api::{BoardPatch, CardPatch, LanePatch, Updates};
use crate::model::{Card, Lane, SortMode};
use crate::ops::{board_ops, card_ops, lane_ops};
use crate::sync::{HostSnapshot, JobTag, StoreJob};
use crate::tui::app::App;
use crate::tui::drag::{Adoption, DragPayload, DragSession};

/// Resolve a released drag into the optimistic mutation plus its store
/// call(s). Each call carries a snapshot token of the state it must restore
/// on failure. A resolution that submits nothing unwinds like an escape.
pub fn resolve_drop(app: &mut App) {
    let Some(session) = app.drag.take() else { return };
    let submitted = match session.payload.clone() {
        DragPayload::Tab { board_id } => commit_tab(app, &session, &board_id),
        DragPayload::Card { card_id, origin_lane } => match session.adoption.clone() {
            Some(Adoption::Card { lane_id }) => {
                commit_card_move(app, &card_id, &origin_lane, &lane_id)
            }
            _ => commit_card_reorder(app, &session, &card_id, &origin_lane),
        },
        DragPayload::Lane { lane_id, origin_board } => match session.adoption.clone() {
            Some(Adoption::Lane { board_id }) => {
                commit_lane_move(app, &session, &lane_id, &origin_board, &board_id)
            }
            _ => commit_lane_reorder(app, &session, &origin_board),
        },
    };
    if !submitted {
        super::unwind(app, session);
    }
}

fn lane_cards_snapshot(lane: &Lane) -> HostSnapshot {
    HostSnapshot::LaneCards {
        lane_id: lane.id.clone().unwrap_or_default(),
        cards: lane.cards.clone(),
    }
}

/// The lane's card list as it stood before the provisional copy arrived.
fn pre_adoption_cards(lane: &Lane, dragged_id: &str) -> HostSnapshot {
    HostSnapshot::LaneCards {
        lane_id: lane.id.clone().unwrap_or_default(),
        cards: lane
            .cards
            .iter()
            .filter(|c| c.id.as_deref() != Some(dragged_id))
            .cloned()
            .collect(),
    }
}

fn pre_adoption_lanes(board_id: &str, lanes: &[Lane], dragged_id: &str) -> HostSnapshot {
    HostSnapshot::BoardLanes {
        board_id: board_id.to_string(),
        lanes: lanes
            .iter()
            .filter(|l| l.id.as_deref() != Some(dragged_id))
            .cloned()
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn commit_tab(app: &mut App, session: &DragSession, board_id: &str) -> bool {
    let Some(point) = session.insertion else { return false };
    let snapshot = HostSnapshot::TabOrder {
        boards: app
            .ws
            .boards
            .iter()
            .map(|b| (b.id.clone(), b.sort_order))
            .collect(),
    };
    match board_ops::reorder_board(&mut app.ws, board_id, point.index) {
        Ok(true) => {}
        Ok(false) => return false,
        Err(_) => return false,
    }
    // the active tab is tracked by id, so the selection survives the splice
    let pairs = board_ops::renumber_boards(&mut app.ws);
    let patches = pairs
        .into_iter()
        .map(|(id, order)| BoardPatch::order(id, order))
        .collect();
    let token = app.snapshots.capture(vec![snapshot]);
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Boards(patches)));
    true
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// Same-lane drop: splice to the tracked slot and renumber. No tracked slot
/// means the pointer never settled anywhere — a deliberate no-op.
fn commit_card_reorder(app: &mut App, session: &DragSession, card_id: &str, lane_id: &str) -> bool {
    let Some(point) = session.insertion else { return false };
    let Some(lane) = app.ws.lane_mut(lane_id) else { return false };
    if lane.sort_mode != SortMode::Hand {
        return false;
    }
    let snapshot = lane_cards_snapshot(lane);
    match card_ops::reorder_card(lane, card_id, point.index) {
        Ok(true) => {}
        Ok(false) => return false,
        Err(_) => return false,
    }
    let pairs = card_ops::renumber_cards(lane);
    let patches = pairs
        .into_iter()
        .map(|(id, order)| CardPatch::order(id, order))
        .collect();
    let token = app.snapshots.capture(vec![snapshot]);
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Cards(patches)));
    true
}

/// Cross-lane drop: the provisional copy becomes the real card.
///
/// One bulk call covers the destination (the moved card's patch carries its
/// new lane key); a hand-mode origin renumbers its remainder in a second
/// call with its own rollback token.
fn commit_card_move(app: &mut App, card_id: &str, origin_id: &str, dest_id: &str) -> bool {
    let (origin_pre, origin_mode) = match app.ws.lane(origin_id) {
        Some(lane) => (lane_cards_snapshot(lane), lane.sort_mode),
        None => return false,
    };
    let dest_pre = match app.ws.lane(dest_id) {
        Some(lane) => pre_adoption_cards(lane, card_id),
        None => return false,
    };

    let extracted: Option<Card> = app
        .ws
        .lane_mut(origin_id)
        .and_then(|lane| card_ops::extract_card(lane, card_id).ok());
    if extracted.is_none() {
        return false;
    }

    let Some(dest) = app.ws.lane_mut(dest_id) else { return false };
    let patches = match dest.sort_mode {
        SortMode::Hand => card_ops::renumber_cards(dest)
            .into_iter()
            .map(|(id, order)| {
                if id == card_id {
                    CardPatch::move_to(id, dest_id, order)
                } else {
                    CardPatch::order(id, order)
                }
            })
            .collect::<Vec<_>>(),
        SortMode::Priority => {
            // priority ignores sibling orders: one patch, appended order
            let order = dest
                .real_cards()
                .filter(|c| c.id.as_deref() != Some(card_id))
                .filter_map(|c| c.sort_order)
                .max()
                .map_or(0, |m| m + 1);
            if let Some(card) = dest.card_mut(card_id) {
                card.sort_order = Some(order);
            }
            vec![CardPatch::move_to(card_id, dest_id, order)]
        }
    };
    let token = app.snapshots.capture(vec![origin_pre, dest_pre]);
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Cards(patches)));

    // the origin's remainder only matters under hand order
    if origin_mode == SortMode::Hand {
        let Some(origin) = app.ws.lane_mut(origin_id) else { return true };
        let post_extraction = lane_cards_snapshot(origin);
        let pairs = card_ops::renumber_cards(origin);
        if pairs.is_empty() {
            return true;
        }
        let patches = pairs
            .into_iter()
            .map(|(id, order)| CardPatch::order(id, order))
            .collect();
        let token = app.snapshots.capture(vec![post_extraction]);
        app.sync
            .submit(JobTag::Persist(token), StoreJob::Update(Updates::Cards(patches)));
    }
    true
}

// ---------------------------------------------------------------------------
// Lanes
// ---------------------------------------------------------------------------

/// Same-board drop: hover swaps already ordered the board, so the drop only
/// persists the outcome. Rollback target is the pre-drag order.
fn commit_lane_reorder(app: &mut App, session: &DragSession, board_id: &str) -> bool {
    let Some((prior_board, prior_lanes)) = session.prior_lanes.clone() else {
        return false;
    };
    if prior_board != board_id {
        return false;
    }
    let Some(board) = app.ws.board_mut(board_id) else { return false };
    let unchanged = board
        .lanes
        .iter()
        .map(|l| l.id.as_deref())
        .eq(prior_lanes.iter().map(|l| l.id.as_deref()));
    if unchanged {
        return false;
    }
    let snapshot = HostSnapshot::BoardLanes {
        board_id: board_id.to_string(),
        lanes: prior_lanes,
    };
    let pairs = lane_ops::renumber_lanes(board);
    let patches = pairs
        .into_iter()
        .map(|(id, order)| LanePatch::order(id, order))
        .collect();
    let token = app.snapshots.capture(vec![snapshot]);
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Lanes(patches)));
    true
}

/// Cross-board drop: finalize the adopted lane, renumber both boards. Lanes
/// are always hand-ordered among siblings, so the origin remainder always
/// renumbers.
fn commit_lane_move(
    app: &mut App,
    session: &DragSession,
    lane_id: &str,
    origin_id: &str,
    dest_id: &str,
) -> bool {
    let origin_pre = match &session.prior_lanes {
        Some((board_id, lanes)) if board_id == origin_id => HostSnapshot::BoardLanes {
            board_id: board_id.clone(),
            lanes: lanes.clone(),
        },
        _ => return false,
    };
    let dest_pre = match app.ws.board(dest_id) {
        Some(board) => pre_adoption_lanes(dest_id, &board.lanes, lane_id),
        None => return false,
    };

    let extracted: Option<Lane> = app
        .ws
        .board_mut(origin_id)
        .and_then(|board| lane_ops::extract_lane(board, lane_id).ok());
    if extracted.is_none() {
        return false;
    }

    let Some(dest) = app.ws.board_mut(dest_id) else { return false };
    let patches = lane_ops::renumber_lanes(dest)
        .into_iter()
        .map(|(id, order)| {
            if id == lane_id {
                LanePatch::move_to(id, dest_id, order)
            } else {
                LanePatch::order(id, order)
            }
        })
        .collect::<Vec<_>>();
    let token = app.snapshots.capture(vec![origin_pre, dest_pre]);
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Lanes(patches)));

    let Some(origin) = app.ws.board_mut(origin_id) else { return true };
    let post_extraction = HostSnapshot::BoardLanes {
        board_id: origin_id.to_string(),
        lanes: origin.lanes.clone(),
    };
    let pairs = lane_ops::renumber_lanes(origin);
    if pairs.is_empty() {
        return true;
    }
    let patches = pairs
        .into_iter()
        .map(|(id, order)| LanePatch::order(id, order))
        .collect();
    let token = app.snapshots.capture(vec![post_extraction]);
    app.sync
        .submit(JobTag::Persist(token), StoreJob::Update(Updates::Lanes(patches)));
    true
}
