use thiserror::Error;

use crate::model::{Board, Lane};
use crate::ops::card_ops::adjust_insertion;

#[derive(Debug, Error)]
pub enum LaneError {
    #[error("lane '{0}' not found")]
    NotFound(String),
    #[error("board '{0}' not found")]
    BoardNotFound(String),
}

/// Splice `lane_id` to the tracked insertion index within its board.
/// Returns `false` when the drop or hover swap resolves to a no-op.
pub fn reorder_lane(board: &mut Board, lane_id: &str, insertion: usize) -> Result<bool, LaneError> {
    let dragged = board
        .lane_index(lane_id)
        .ok_or_else(|| LaneError::NotFound(lane_id.to_string()))?;
    let Some(target) = adjust_insertion(dragged, insertion) else {
        return Ok(false);
    };
    let lane = board.lanes.remove(dragged);
    let target = target.min(board.real_lane_count());
    board.lanes.insert(target, lane);
    Ok(true)
}

/// Remove `lane_id` from `board` and hand it back (migration and close).
pub fn extract_lane(board: &mut Board, lane_id: &str) -> Result<Lane, LaneError> {
    let index = board
        .lane_index(lane_id)
        .ok_or_else(|| LaneError::NotFound(lane_id.to_string()))?;
    Ok(board.lanes.remove(index))
}

/// Insert `lane` into `board` at the tracked index, clamped to
/// `[0, real_lane_count]`; `None` appends after the last real lane, keeping
/// the draft lane behind it.
pub fn insert_lane(board: &mut Board, lane: Lane, index: Option<usize>) -> usize {
    let limit = board.real_lane_count();
    let at = index.unwrap_or(limit).min(limit);
    board.lanes.insert(at, lane);
    at
}

/// Rewrite every real lane's `sort_order` to its position. Returns the
/// `(id, order)` pairs for the bulk update.
pub fn renumber_lanes(board: &mut Board) -> Vec<(String, i64)> {
    let mut pairs = Vec::with_capacity(board.real_lane_count());
    let mut next = 0i64;
    for lane in &mut board.lanes {
        let Some(id) = lane.id.clone() else { continue };
        lane.sort_order = Some(next);
        pairs.push((id, next));
        next += 1;
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(ids: &[&str]) -> Board {
        let mut board = Board::new("b1", "Work", 0);
        for (i, id) in ids.iter().enumerate() {
            let mut lane = Lane::new(*id, *id);
            lane.sort_order = Some(i as i64);
            board.lanes.push(lane);
        }
        board.ensure_draft_lane();
        board
    }

    fn order(board: &Board) -> Vec<&str> {
        board
            .real_lanes()
            .map(|l| l.id.as_deref().unwrap())
            .collect()
    }

    #[test]
    fn reorder_swaps_adjacent_lanes() {
        let mut b = board(&["x", "y", "z"]);
        // drag x, hover below y
        let swapped = reorder_lane(&mut b, "x", 2).unwrap();
        assert!(swapped);
        assert_eq!(order(&b), vec!["y", "x", "z"]);
        assert!(b.lanes.last().unwrap().is_draft());
    }

    #[test]
    fn reorder_same_slot_is_noop() {
        let mut b = board(&["x", "y"]);
        assert!(!reorder_lane(&mut b, "x", 1).unwrap());
        assert_eq!(order(&b), vec!["x", "y"]);
    }

    #[test]
    fn migrate_between_boards() {
        let mut from = board(&["x", "y"]);
        let mut to = board(&["z"]);
        let lane = extract_lane(&mut from, "y").unwrap();
        let at = insert_lane(&mut to, lane, None);
        assert_eq!(at, 1);
        assert_eq!(order(&from), vec!["x"]);
        assert_eq!(order(&to), vec!["z", "y"]);
        assert!(to.lanes.last().unwrap().is_draft());
    }

    #[test]
    fn renumber_covers_all_real_lanes() {
        let mut b = board(&["x", "y", "z"]);
        b.lanes.swap(0, 1);
        let pairs = renumber_lanes(&mut b);
        assert_eq!(
            pairs,
            vec![
                ("y".to_string(), 0),
                ("x".to_string(), 1),
                ("z".to_string(), 2)
            ]
        );
        assert_eq!(b.lanes[3].sort_order, None);
    }
}
