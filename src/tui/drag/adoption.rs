use std::time::{Duration, Instant};

use crate::model::{SortMode, Workspace};
use crate::ops::{card_ops, lane_ops, sort};

/// A live cross-host hover: the foreign host holds a provisional copy of the
/// dragged entity while the origin keeps its own. At most one adoption exists
/// per drag; whoever holds it either finalizes the copy on drop or removes it
/// when the hover moves on.
#[derive(Debug, Clone, PartialEq)]
pub enum Adoption {
    /// `lane_id` holds a provisional copy of the dragged card.
    Card { lane_id: String },
    /// `board_id` holds a provisional copy of the dragged lane.
    Lane { board_id: String },
}

/// Insert a provisional copy of `card_id` into `dest_lane`. Hand-mode lanes
/// place it at the tracked index; priority lanes place it where the
/// comparator does. The origin lane is left untouched.
pub fn adopt_card(
    ws: &mut Workspace,
    card_id: &str,
    origin_lane: &str,
    dest_lane: &str,
    index: Option<usize>,
) -> Option<Adoption> {
    if origin_lane == dest_lane {
        return None;
    }
    let copy = ws.lane(origin_lane)?.card(card_id)?.clone();
    let lane = ws.lane_mut(dest_lane)?;
    match lane.sort_mode {
        SortMode::Hand => {
            card_ops::insert_card(lane, copy, index);
        }
        SortMode::Priority => {
            card_ops::insert_card(lane, copy, None);
            let mode = lane.sort_mode;
            sort::sort_cards(&mut lane.cards, mode);
        }
    }
    Some(Adoption::Card {
        lane_id: dest_lane.to_string(),
    })
}

/// Insert a provisional copy of the dragged lane into `dest_board`, cards
/// and all. Lanes are always hand-ordered among siblings.
pub fn adopt_lane(
    ws: &mut Workspace,
    lane_id: &str,
    origin_board: &str,
    dest_board: &str,
    index: Option<usize>,
) -> Option<Adoption> {
    if origin_board == dest_board {
        return None;
    }
    let copy = ws.board(origin_board)?.lane(lane_id)?.clone();
    let board = ws.board_mut(dest_board)?;
    lane_ops::insert_lane(board, copy, index);
    Some(Adoption::Lane {
        board_id: dest_board.to_string(),
    })
}

impl Adoption {
    /// Remove the provisional copy. The origin host never changed, so this
    /// alone restores the pre-hover picture.
    pub fn revert(&self, ws: &mut Workspace, dragged_id: &str) {
        match self {
            Adoption::Card { lane_id } => {
                if let Some(lane) = ws.lane_mut(lane_id) {
                    let _ = card_ops::extract_card(lane, dragged_id);
                }
            }
            Adoption::Lane { board_id } => {
                if let Some(board) = ws.board_mut(board_id) {
                    let _ = lane_ops::extract_lane(board, dragged_id);
                }
            }
        }
    }

    pub fn host_id(&self) -> &str {
        match self {
            Adoption::Card { lane_id } => lane_id,
            Adoption::Lane { board_id } => board_id,
        }
    }
}

/// Live swap for a lane dragged within its own board.
///
/// Swaps reorder the board immediately during hover, so each swap opens a
/// cooldown window during which further hover swaps are ignored; without it
/// the swapped lane lands under the pointer and swaps straight back.
/// Returns the next cooldown deadline when a swap happened.
pub fn try_lane_swap(
    ws: &mut Workspace,
    board_id: &str,
    lane_id: &str,
    insertion: usize,
    block_until: Option<Instant>,
    cooldown: Duration,
) -> Option<Instant> {
    if let Some(deadline) = block_until
        && Instant::now() < deadline
    {
        return None;
    }
    let board = ws.board_mut(board_id)?;
    match lane_ops::reorder_lane(board, lane_id, insertion) {
        Ok(true) => Some(Instant::now() + cooldown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Board, Card, Lane};

    const COOLDOWN: Duration = Duration::from_millis(150);

    fn card(id: &str, order: i64) -> Card {
        let mut c = Card::new(id, id);
        c.sort_order = Some(order);
        c
    }

    fn hand_lane(id: &str, cards: &[&str]) -> Lane {
        let mut lane = Lane::new(id, id);
        lane.sort_mode = SortMode::Hand;
        lane.cards = cards
            .iter()
            .enumerate()
            .map(|(i, c)| card(c, i as i64))
            .collect();
        lane.ensure_draft_card();
        lane
    }

    fn workspace() -> Workspace {
        let mut b1 = Board::new("b1", "Work", 0);
        b1.lanes.push(hand_lane("l1", &["a", "b"]));
        b1.lanes.push(hand_lane("l2", &["x"]));
        b1.ensure_draft_lane();
        let mut b2 = Board::new("b2", "Home", 1);
        b2.lanes.push(hand_lane("l3", &["z"]));
        b2.ensure_draft_lane();
        Workspace {
            boards: vec![b1, b2],
        }
    }

    fn card_order(ws: &Workspace, lane_id: &str) -> Vec<String> {
        ws.lane(lane_id)
            .unwrap()
            .real_cards()
            .map(|c| c.id.clone().unwrap())
            .collect()
    }

    fn lane_order(ws: &Workspace, board_id: &str) -> Vec<String> {
        ws.board(board_id)
            .unwrap()
            .real_lanes()
            .map(|l| l.id.clone().unwrap())
            .collect()
    }

    #[test]
    fn adopt_places_copy_and_keeps_origin() {
        let mut ws = workspace();
        let adoption = adopt_card(&mut ws, "a", "l1", "l2", Some(0)).unwrap();
        assert_eq!(adoption.host_id(), "l2");
        assert_eq!(card_order(&ws, "l2"), vec!["a", "x"]);
        // origin untouched until commit
        assert_eq!(card_order(&ws, "l1"), vec!["a", "b"]);
    }

    #[test]
    fn adopt_into_priority_lane_uses_comparator() {
        let mut ws = workspace();
        {
            let lane = ws.lane_mut("l2").unwrap();
            lane.sort_mode = SortMode::Priority;
            lane.card_mut("x").unwrap().flagged = true;
        }
        adopt_card(&mut ws, "a", "l1", "l2", Some(0)).unwrap();
        // unflagged copy lands after the flagged card, whatever the hover said
        assert_eq!(card_order(&ws, "l2"), vec!["x", "a"]);
    }

    #[test]
    fn revert_removes_only_the_copy() {
        let mut ws = workspace();
        let adoption = adopt_card(&mut ws, "a", "l1", "l2", None).unwrap();
        adoption.revert(&mut ws, "a");
        assert_eq!(card_order(&ws, "l2"), vec!["x"]);
        assert_eq!(card_order(&ws, "l1"), vec!["a", "b"]);
    }

    #[test]
    fn adopting_into_origin_is_refused() {
        let mut ws = workspace();
        assert!(adopt_card(&mut ws, "a", "l1", "l1", Some(0)).is_none());
    }

    #[test]
    fn lane_adoption_carries_cards() {
        let mut ws = workspace();
        let adoption = adopt_lane(&mut ws, "l1", "b1", "b2", Some(0)).unwrap();
        assert_eq!(adoption, Adoption::Lane { board_id: "b2".into() });
        assert_eq!(lane_order(&ws, "b2"), vec!["l1", "l3"]);
        assert_eq!(card_order(&ws, "l1"), vec!["a", "b"]);
        // the copy shadows the original; the original board still lists it
        assert_eq!(lane_order(&ws, "b1"), vec!["l1", "l2"]);
    }

    #[test]
    fn swap_opens_a_cooldown_window() {
        let mut ws = workspace();
        let deadline = try_lane_swap(&mut ws, "b1", "l1", 2, None, COOLDOWN);
        assert!(deadline.is_some());
        assert_eq!(lane_order(&ws, "b1"), vec!["l2", "l1"]);

        // second hover within the window is ignored
        let again = try_lane_swap(&mut ws, "b1", "l1", 0, deadline, COOLDOWN);
        assert!(again.is_none());
        assert_eq!(lane_order(&ws, "b1"), vec!["l2", "l1"]);

        // window elapsed: the swap goes through
        let expired = Some(Instant::now() - Duration::from_millis(1));
        let later = try_lane_swap(&mut ws, "b1", "l1", 0, expired, COOLDOWN);
        assert!(later.is_some());
        assert_eq!(lane_order(&ws, "b1"), vec!["l1", "l2"]);
    }

    #[test]
    fn swap_into_same_slot_keeps_no_cooldown() {
        let mut ws = workspace();
        let deadline = try_lane_swap(&mut ws, "b1", "l1", 0, None, COOLDOWN);
        assert!(deadline.is_none());
        assert_eq!(lane_order(&ws, "b1"), vec!["l1", "l2"]);
    }
}
