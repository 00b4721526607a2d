use std::collections::HashMap;

use serde::Serialize;

use crate::api::{EntityKind, StoreRecords};
use crate::model::SortMode;

/// Structured result from `dk check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (something that should be fixed).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// The same id appears on more than one record
    #[serde(rename = "duplicate_id")]
    DuplicateId { kind: EntityKind, id: String },
    /// A record has an empty id
    #[serde(rename = "empty_id")]
    EmptyId { kind: EntityKind },
    /// A lane's board_id points at no board
    #[serde(rename = "dangling_lane")]
    DanglingLane { lane_id: String, board_id: String },
    /// A card's lane_id points at no lane
    #[serde(rename = "dangling_card")]
    DanglingCard { card_id: String, lane_id: String },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// A card in a hand-sorted lane has no sort_order
    #[serde(rename = "missing_card_order")]
    MissingCardOrder { lane_id: String, card_id: String },
    /// An open lane has no sort_order
    #[serde(rename = "missing_lane_order")]
    MissingLaneOrder { lane_id: String },
    /// Two cards in a hand-sorted lane share a sort_order
    #[serde(rename = "ambiguous_card_order")]
    AmbiguousCardOrder { lane_id: String, sort_order: i64 },
    /// Two open lanes on one board share a sort_order
    #[serde(rename = "ambiguous_lane_order")]
    AmbiguousLaneOrder { board_id: String, sort_order: i64 },
    /// Hand orders are not the contiguous run 0..n-1
    #[serde(rename = "sparse_order")]
    SparseOrder { kind: EntityKind, host_id: String },
    /// A closed lane still carries a sort_order
    #[serde(rename = "closed_lane_ordered")]
    ClosedLaneOrdered { lane_id: String },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate a store document and return structured results.
///
/// Read-only. Checks performed:
/// 1. Ids are non-empty and unique per entity kind
/// 2. Every lane's board_id and every card's lane_id resolve
/// 3. Hand order health: assigned, unambiguous, contiguous from zero
///    (per hand-mode lane, per board's open lanes, and across boards)
/// 4. Closed lanes carry no sort_order
pub fn check_store(records: &StoreRecords) -> CheckResult {
    let mut result = CheckResult::default();

    check_ids(records, &mut result);
    check_ownership(records, &mut result);
    check_card_orders(records, &mut result);
    check_lane_orders(records, &mut result);
    check_board_orders(records, &mut result);

    result.valid = result.errors.is_empty();
    result
}

// ---------------------------------------------------------------------------
// Identity and ownership
// ---------------------------------------------------------------------------

fn check_ids(records: &StoreRecords, result: &mut CheckResult) {
    let groups: [(EntityKind, Vec<&str>); 3] = [
        (
            EntityKind::Board,
            records.boards.iter().map(|b| b.id.as_str()).collect(),
        ),
        (
            EntityKind::Lane,
            records.lanes.iter().map(|l| l.id.as_str()).collect(),
        ),
        (
            EntityKind::Card,
            records.cards.iter().map(|c| c.id.as_str()).collect(),
        ),
    ];

    for (kind, ids) in groups {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for id in ids {
            if id.is_empty() {
                result.errors.push(CheckError::EmptyId { kind });
                continue;
            }
            *seen.entry(id).or_default() += 1;
        }
        for (id, count) in seen {
            if count > 1 {
                result.errors.push(CheckError::DuplicateId {
                    kind,
                    id: id.to_string(),
                });
            }
        }
    }
}

fn check_ownership(records: &StoreRecords, result: &mut CheckResult) {
    for lane in &records.lanes {
        if records.board(&lane.board_id).is_none() {
            result.errors.push(CheckError::DanglingLane {
                lane_id: lane.id.clone(),
                board_id: lane.board_id.clone(),
            });
        }
    }
    for card in &records.cards {
        if records.lane(&card.lane_id).is_none() {
            result.errors.push(CheckError::DanglingCard {
                card_id: card.id.clone(),
                lane_id: card.lane_id.clone(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Order health
// ---------------------------------------------------------------------------

/// `true` when the assigned orders form the run 0..n-1 in some arrangement.
fn contiguous_from_zero(mut orders: Vec<i64>) -> bool {
    orders.sort_unstable();
    orders.iter().enumerate().all(|(i, &o)| o == i as i64)
}

fn check_card_orders(records: &StoreRecords, result: &mut CheckResult) {
    for lane in &records.lanes {
        if lane.sort_mode != SortMode::Hand || lane.closed {
            continue;
        }
        let mut orders = Vec::new();
        for card in records.cards.iter().filter(|c| c.lane_id == lane.id) {
            match card.sort_order {
                Some(o) => orders.push(o),
                None => result.warnings.push(CheckWarning::MissingCardOrder {
                    lane_id: lane.id.clone(),
                    card_id: card.id.clone(),
                }),
            }
        }
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            if pair[0] == pair[1] {
                result.warnings.push(CheckWarning::AmbiguousCardOrder {
                    lane_id: lane.id.clone(),
                    sort_order: pair[0],
                });
            }
        }
        if !contiguous_from_zero(orders) {
            result.warnings.push(CheckWarning::SparseOrder {
                kind: EntityKind::Card,
                host_id: lane.id.clone(),
            });
        }
    }
}

fn check_lane_orders(records: &StoreRecords, result: &mut CheckResult) {
    for lane in &records.lanes {
        if lane.closed {
            if lane.sort_order.is_some() {
                result.warnings.push(CheckWarning::ClosedLaneOrdered {
                    lane_id: lane.id.clone(),
                });
            }
        } else if lane.sort_order.is_none() {
            result.warnings.push(CheckWarning::MissingLaneOrder {
                lane_id: lane.id.clone(),
            });
        }
    }

    for board in &records.boards {
        let orders: Vec<i64> = records
            .lanes
            .iter()
            .filter(|l| l.board_id == board.id && !l.closed)
            .filter_map(|l| l.sort_order)
            .collect();
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            if pair[0] == pair[1] {
                result.warnings.push(CheckWarning::AmbiguousLaneOrder {
                    board_id: board.id.clone(),
                    sort_order: pair[0],
                });
            }
        }
        if !contiguous_from_zero(orders) {
            result.warnings.push(CheckWarning::SparseOrder {
                kind: EntityKind::Lane,
                host_id: board.id.clone(),
            });
        }
    }
}

fn check_board_orders(records: &StoreRecords, result: &mut CheckResult) {
    let orders: Vec<i64> = records.boards.iter().map(|b| b.sort_order).collect();
    if !contiguous_from_zero(orders) {
        result.warnings.push(CheckWarning::SparseOrder {
            kind: EntityKind::Board,
            host_id: String::new(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
