pub mod adoption;
pub mod commit;
pub mod dwell;
pub mod insertion;

use std::time::{Duration, Instant};

use crate::model::{Lane, SortMode};
use crate::ops::card_ops;
use crate::tui::app::App;
use crate::tui::layout::{Hit, Region};

pub use adoption::Adoption;
pub use dwell::DwellSwitch;
pub use insertion::{Edge, InsertionPoint};

/// What is being dragged. The payload never changes over the session;
/// everything else about the drag is hover state.
#[derive(Debug, Clone, PartialEq)]
pub enum DragPayload {
    Card { card_id: String, origin_lane: String },
    Lane { lane_id: String, origin_board: String },
    Tab { board_id: String },
}

impl DragPayload {
    pub fn dragged_id(&self) -> &str {
        match self {
            DragPayload::Card { card_id, .. } => card_id,
            DragPayload::Lane { lane_id, .. } => lane_id,
            DragPayload::Tab { board_id } => board_id,
        }
    }
}

/// One press-to-release drag. Owned by the app while the button is down;
/// consumed by [`commit::resolve_drop`] or [`cancel`].
#[derive(Debug)]
pub struct DragSession {
    pub payload: DragPayload,
    /// Active board when the drag started; cancel returns here.
    pub home_board: String,
    /// Tracked drop slot in the current host's ordering, `None` while the
    /// pointer is outside entity bounds.
    pub insertion: Option<InsertionPoint>,
    /// Live cross-host hover, at most one.
    pub adoption: Option<Adoption>,
    /// Lane-swap cooldown deadline.
    pub swap_block: Option<Instant>,
    /// Armed tab-switch timer.
    pub dwell: Option<DwellSwitch>,
    /// Pre-drag lane list of the origin board (lane drags reorder live, so
    /// cancel needs the original to splice back).
    pub prior_lanes: Option<(String, Vec<Lane>)>,
}

impl DragSession {
    fn new(payload: DragPayload, home_board: String) -> Self {
        DragSession {
            payload,
            home_board,
            insertion: None,
            adoption: None,
            swap_block: None,
            dwell: None,
            prior_lanes: None,
        }
    }

    /// Lane currently hosting a dragged card.
    pub fn card_host(&self) -> Option<&str> {
        match (&self.payload, &self.adoption) {
            (_, Some(Adoption::Card { lane_id })) => Some(lane_id),
            (DragPayload::Card { origin_lane, .. }, None) => Some(origin_lane),
            _ => None,
        }
    }

    /// Board currently hosting a dragged lane.
    pub fn lane_host(&self) -> Option<&str> {
        match (&self.payload, &self.adoption) {
            (_, Some(Adoption::Lane { board_id })) => Some(board_id),
            (DragPayload::Lane { origin_board, .. }, None) => Some(origin_board),
            _ => None,
        }
    }
}

/// Begin a drag from the pressed region. Draft rows and draft lanes are not
/// draggable. Returns `false` when the region holds nothing to drag.
pub fn start(app: &mut App, region: &Region) -> bool {
    let payload = match region {
        Region::CardRow {
            lane_id,
            card_id: Some(card_id),
            ..
        } => DragPayload::Card {
            card_id: card_id.clone(),
            origin_lane: lane_id.clone(),
        },
        Region::LaneHeader {
            lane_id: Some(lane_id),
        } => DragPayload::Lane {
            lane_id: lane_id.clone(),
            origin_board: app.active_board.clone(),
        },
        Region::Tab { board_id, .. } => DragPayload::Tab {
            board_id: board_id.clone(),
        },
        _ => return false,
    };

    let mut session = DragSession::new(payload, app.active_board.clone());
    if let DragPayload::Lane { origin_board, .. } = &session.payload
        && let Some(board) = app.ws.board(origin_board)
    {
        session.prior_lanes = Some((origin_board.clone(), board.lanes.clone()));
    }
    app.drag = Some(session);
    true
}

/// Update the session for the pointer position. Called for every drag event
/// while a session is live.
pub fn update_hover(app: &mut App, x: u16, y: u16) {
    let hit = app.hit_map.hit_test(x, y).cloned();
    let Some(session) = &app.drag else { return };
    match session.payload.clone() {
        DragPayload::Card { card_id, origin_lane } => {
            hover_card(app, &card_id, &origin_lane, y, hit)
        }
        DragPayload::Lane { lane_id, origin_board } => {
            hover_lane(app, &lane_id, &origin_board, y, hit)
        }
        DragPayload::Tab { .. } => hover_tab(app, x, hit),
    }
}

fn hover_card(app: &mut App, card_id: &str, origin_lane: &str, y: u16, hit: Option<Hit>) {
    let Some(hit) = hit else {
        clear_hover(app);
        return;
    };
    match hit.region {
        Region::Tab { board_id, .. } => {
            set_insertion(app, None);
            arm_dwell(app, &board_id);
        }
        Region::CardRow {
            lane_id,
            card_id: row_card,
            index,
        } => {
            disarm_dwell(app);
            settle_card_host(app, card_id, origin_lane, &lane_id, None);
            let Some(lane) = app.ws.lane(&lane_id) else { return };
            if lane.sort_mode != SortMode::Hand {
                set_insertion(app, None);
                return;
            }
            let point = if row_card.is_some() {
                insertion::vertical_insertion(y, hit.rect, index)
            } else {
                // draft row: below every real card
                InsertionPoint::new(lane.real_card_count(), Edge::Above)
            };
            place_card(app, card_id, &lane_id, origin_lane, point);
        }
        Region::LaneHeader { lane_id: Some(lane_id) } | Region::LaneBody { lane_id } => {
            disarm_dwell(app);
            settle_card_host(app, card_id, origin_lane, &lane_id, None);
            // header or body outside the rows: append slot
            let Some(lane) = app.ws.lane(&lane_id) else { return };
            if lane.sort_mode != SortMode::Hand {
                set_insertion(app, None);
                return;
            }
            let point = InsertionPoint::new(lane.real_card_count(), Edge::Below);
            place_card(app, card_id, &lane_id, origin_lane, point);
        }
        _ => clear_hover(app),
    }
}

/// Move the provisional copy (or track the indicator) to `point` within the
/// hovered hand-mode lane.
fn place_card(
    app: &mut App,
    card_id: &str,
    hovered_lane: &str,
    origin_lane: &str,
    point: InsertionPoint,
) {
    let adopted = matches!(
        app.drag.as_ref().and_then(|s| s.adoption.as_ref()),
        Some(Adoption::Card { lane_id }) if lane_id == hovered_lane
    );
    if adopted {
        // the copy already sits in this lane: reposition it live
        if let Some(lane) = app.ws.lane_mut(hovered_lane) {
            let _ = card_ops::reorder_card(lane, card_id, point.index);
        }
        set_insertion(app, Some(point));
    } else if hovered_lane == origin_lane {
        // origin host reorders at drop time, indicator only
        set_insertion(app, Some(point));
    }
}

/// Ensure the dragged card's current host is `hovered_lane`: revert a stale
/// adoption and adopt into the hovered lane when it is foreign. Returning to
/// the origin lane reverts without a fresh adoption.
fn settle_card_host(
    app: &mut App,
    card_id: &str,
    origin_lane: &str,
    hovered_lane: &str,
    index: Option<usize>,
) {
    let current = app
        .drag
        .as_ref()
        .and_then(|s| s.card_host())
        .unwrap_or(origin_lane)
        .to_string();
    if current == hovered_lane {
        return;
    }
    if let Some(session) = &mut app.drag
        && let Some(adoption) = session.adoption.take()
    {
        adoption.revert(&mut app.ws, card_id);
    }
    if hovered_lane != origin_lane {
        let adoption = adoption::adopt_card(&mut app.ws, card_id, origin_lane, hovered_lane, index);
        if let Some(session) = &mut app.drag {
            session.adoption = adoption;
        }
    }
    set_insertion(app, None);
}

fn hover_lane(app: &mut App, lane_id: &str, origin_board: &str, y: u16, hit: Option<Hit>) {
    let Some(hit) = hit else {
        clear_hover(app);
        return;
    };
    match hit.region {
        Region::Tab { board_id, .. } => {
            set_insertion(app, None);
            arm_dwell(app, &board_id);
        }
        Region::LaneHeader { .. } | Region::LaneBody { .. } | Region::CardRow { .. } => {
            disarm_dwell(app);
            let active = app.active_board.clone();
            settle_lane_host(app, lane_id, origin_board, &active);
            let Some(board) = app.ws.board(&active) else { return };
            let hovered_lane = match &hit.region {
                Region::LaneHeader { lane_id } => lane_id.clone(),
                Region::LaneBody { lane_id } | Region::CardRow { lane_id, .. } => {
                    Some(lane_id.clone())
                }
                _ => None,
            };
            let point = match hovered_lane {
                Some(id) => {
                    let Some(index) = board.lane_index(&id) else { return };
                    let rect = lane_rect(app, &id).unwrap_or(hit.rect);
                    insertion::vertical_insertion(y, rect, index)
                }
                // draft lane row: below every real lane
                None => InsertionPoint::new(board.real_lane_count(), Edge::Above),
            };
            swap_lane(app, lane_id, &active, point);
        }
        _ => clear_hover(app),
    }
}

/// Full rectangle of a lane from the last render pass.
fn lane_rect(app: &App, lane_id: &str) -> Option<ratatui::layout::Rect> {
    app.hit_map
        .find(|r| matches!(r, Region::LaneBody { lane_id: id } if id == lane_id))
        .map(|h| h.rect)
}

/// Reposition the dragged lane (or its provisional copy) within the hovered
/// board, honoring the swap cooldown.
fn swap_lane(app: &mut App, lane_id: &str, board_id: &str, point: InsertionPoint) {
    let block = app.drag.as_ref().and_then(|s| s.swap_block);
    let cooldown = Duration::from_millis(app.timing.swap_cooldown_ms);
    let deadline =
        adoption::try_lane_swap(&mut app.ws, board_id, lane_id, point.index, block, cooldown);
    if let Some(session) = &mut app.drag {
        if deadline.is_some() {
            session.swap_block = deadline;
        }
        session.insertion = Some(point);
    }
}

/// Ensure the dragged lane's current host is `hovered_board`.
fn settle_lane_host(app: &mut App, lane_id: &str, origin_board: &str, hovered_board: &str) {
    let current = app
        .drag
        .as_ref()
        .and_then(|s| s.lane_host())
        .unwrap_or(origin_board)
        .to_string();
    if current == hovered_board {
        return;
    }
    if let Some(session) = &mut app.drag
        && let Some(adoption) = session.adoption.take()
    {
        adoption.revert(&mut app.ws, lane_id);
    }
    if hovered_board != origin_board {
        let adoption =
            adoption::adopt_lane(&mut app.ws, lane_id, origin_board, hovered_board, None);
        if let Some(session) = &mut app.drag {
            session.adoption = adoption;
        }
    }
    set_insertion(app, None);
}

fn hover_tab(app: &mut App, x: u16, hit: Option<Hit>) {
    let point = match hit {
        Some(Hit {
            rect,
            region: Region::Tab { index, .. },
        }) => Some(insertion::horizontal_insertion(x, rect, index)),
        _ => None,
    };
    set_insertion(app, point);
}

fn set_insertion(app: &mut App, point: Option<InsertionPoint>) {
    if let Some(session) = &mut app.drag {
        session.insertion = point;
    }
}

fn clear_hover(app: &mut App) {
    if let Some(session) = &mut app.drag {
        session.insertion = None;
        session.dwell = None;
    }
}

fn arm_dwell(app: &mut App, board_id: &str) {
    let active = app.active_board.clone();
    if let Some(session) = &mut app.drag {
        if board_id == active {
            session.dwell = None;
            return;
        }
        match &mut session.dwell {
            Some(dwell) => dwell.retarget(board_id),
            None => session.dwell = Some(DwellSwitch::arm(board_id)),
        }
    }
}

fn disarm_dwell(app: &mut App) {
    if let Some(session) = &mut app.drag {
        session.dwell = None;
    }
}

/// Fire a due dwell switch. Called once per tick while a drag is live.
pub fn tick(app: &mut App) {
    let dwell_for = Duration::from_millis(app.timing.tab_dwell_ms);
    let target = match &app.drag {
        Some(session) => match &session.dwell {
            Some(dwell) if dwell.is_due(dwell_for) => dwell.target_board.clone(),
            _ => return,
        },
        None => return,
    };
    if app.ws.board(&target).is_some() {
        app.active_board = target;
    }
    if let Some(session) = &mut app.drag {
        session.dwell = None;
        session.insertion = None;
    }
}

/// Abort the drag: remove the provisional copy, splice live lane swaps back,
/// and return to the board the drag started on. No store call, no error.
pub fn cancel(app: &mut App) {
    let Some(session) = app.drag.take() else { return };
    unwind(app, session);
}

/// Undo everything a live session touched. A drop that resolves without a
/// submitted commit unwinds the same way an escape does, so a dwell-induced
/// tab switch never outlives an abandoned drag.
pub(crate) fn unwind(app: &mut App, session: DragSession) {
    if let Some(adoption) = &session.adoption {
        adoption.revert(&mut app.ws, session.payload.dragged_id());
    }
    if let Some((board_id, lanes)) = session.prior_lanes {
        if let Some(board) = app.ws.board_mut(&board_id) {
            board.lanes = lanes;
        }
    }
    if app.ws.board(&session.home_board).is_some() {
        app.active_board = session.home_board;
    }
}
