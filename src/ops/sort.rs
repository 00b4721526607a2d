use std::cmp::Ordering;

use crate::model::{Board, Card, Lane, SortMode, Workspace};

// ---------------------------------------------------------------------------
// Comparators
//
// Both disciplines put the draft row last. All sorts below are stable
// (slice::sort_by), so priority ties keep their incoming relative order.
// ---------------------------------------------------------------------------

/// Hand-sort key: committed orders ascend, unassigned orders follow them.
fn hand_key(sort_order: Option<i64>) -> i64 {
    sort_order.unwrap_or(i64::MAX)
}

/// Priority discipline: flagged cards first, ties stable.
pub fn compare_cards_priority(a: &Card, b: &Card) -> Ordering {
    match (a.is_draft(), b.is_draft()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.flagged.cmp(&a.flagged),
    }
}

/// Hand discipline: ascending `sort_order`, unassigned last among reals.
pub fn compare_cards_hand(a: &Card, b: &Card) -> Ordering {
    match (a.is_draft(), b.is_draft()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => hand_key(a.sort_order).cmp(&hand_key(b.sort_order)),
    }
}

pub fn compare_cards(mode: SortMode, a: &Card, b: &Card) -> Ordering {
    match mode {
        SortMode::Priority => compare_cards_priority(a, b),
        SortMode::Hand => compare_cards_hand(a, b),
    }
}

pub fn sort_cards(cards: &mut [Card], mode: SortMode) {
    cards.sort_by(|a, b| compare_cards(mode, a, b));
}

/// Lanes within a board are always hand-ordered; the draft lane is last.
pub fn compare_lanes(a: &Lane, b: &Lane) -> Ordering {
    match (a.is_draft(), b.is_draft()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => hand_key(a.sort_order).cmp(&hand_key(b.sort_order)),
    }
}

pub fn sort_lanes(lanes: &mut [Lane]) {
    lanes.sort_by(compare_lanes);
}

pub fn compare_boards(a: &Board, b: &Board) -> Ordering {
    a.sort_order.cmp(&b.sort_order)
}

pub fn sort_boards(boards: &mut [Board]) {
    boards.sort_by(compare_boards);
}

/// Bring a freshly loaded or reloaded workspace to display shape: everything
/// sorted by its discipline, one draft lane per board, one draft card per
/// open lane.
pub fn normalize(ws: &mut Workspace) {
    sort_boards(&mut ws.boards);
    for board in &mut ws.boards {
        sort_lanes(&mut board.lanes);
        board.ensure_draft_lane();
        for lane in &mut board.lanes {
            // The draft lane is a bare "add a lane" row; it holds no cards.
            if lane.is_draft() {
                continue;
            }
            let mode = lane.sort_mode;
            sort_cards(&mut lane.cards, mode);
            lane.ensure_draft_card();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, order: Option<i64>, flagged: bool) -> Card {
        let mut c = Card::new(id, id);
        c.sort_order = order;
        c.flagged = flagged;
        c
    }

    fn ids(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|c| c.id.as_deref().unwrap_or("·")).collect()
    }

    #[test]
    fn priority_puts_flagged_first_stably() {
        let mut cards = vec![
            card("a", Some(0), false),
            card("b", Some(1), true),
            card("c", Some(2), false),
            card("d", Some(3), true),
        ];
        sort_cards(&mut cards, SortMode::Priority);
        assert_eq!(ids(&cards), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn priority_ignores_sort_order() {
        let mut cards = vec![card("a", Some(9), false), card("b", Some(0), false)];
        sort_cards(&mut cards, SortMode::Priority);
        assert_eq!(ids(&cards), vec!["a", "b"]);
    }

    #[test]
    fn hand_orders_ascending_with_none_last() {
        let mut cards = vec![
            card("x", None, false),
            card("a", Some(2), false),
            card("b", Some(0), false),
            card("c", Some(1), true),
        ];
        sort_cards(&mut cards, SortMode::Hand);
        assert_eq!(ids(&cards), vec!["b", "c", "a", "x"]);
    }

    #[test]
    fn hand_keeps_duplicate_orders_stable() {
        // Stale duplicates can exist after a priority→hand switch; the
        // comparator must still give a usable total order.
        let mut cards = vec![
            card("a", Some(1), false),
            card("b", Some(1), false),
            card("c", Some(0), false),
        ];
        sort_cards(&mut cards, SortMode::Hand);
        assert_eq!(ids(&cards), vec!["c", "a", "b"]);
    }

    #[test]
    fn draft_sorts_last_in_both_modes() {
        for mode in [SortMode::Priority, SortMode::Hand] {
            let mut cards = vec![Card::draft(), card("a", None, true), card("b", Some(0), false)];
            sort_cards(&mut cards, mode);
            assert!(cards.last().unwrap().is_draft(), "mode {mode:?}");
        }
    }

    #[test]
    fn lanes_sort_by_order_draft_last() {
        let mk = |id: Option<&str>, order: Option<i64>| Lane {
            id: id.map(String::from),
            name: String::new(),
            sort_mode: SortMode::Hand,
            sort_order: order,
            cards: Vec::new(),
        };
        let mut lanes = vec![
            mk(None, None),
            mk(Some("l2"), Some(1)),
            mk(Some("l3"), None),
            mk(Some("l1"), Some(0)),
        ];
        sort_lanes(&mut lanes);
        let got: Vec<_> = lanes.iter().map(|l| l.id.as_deref()).collect();
        assert_eq!(got, vec![Some("l1"), Some("l2"), Some("l3"), None]);
    }

    #[test]
    fn normalize_sorts_and_installs_drafts() {
        let mut b1 = Board::new("b1", "B1", 1);
        let mut lane = Lane::new("l1", "Lane");
        lane.sort_order = Some(0);
        lane.sort_mode = SortMode::Hand;
        lane.cards = vec![card("a", Some(1), false), card("b", Some(0), false)];
        b1.lanes.push(lane);
        let b0 = Board::new("b0", "B0", 0);
        let mut ws = Workspace {
            boards: vec![b1, b0],
        };

        normalize(&mut ws);

        assert_eq!(ws.boards[0].id, "b0");
        let lane = &ws.boards[1].lanes[0];
        assert_eq!(ids(&lane.cards), vec!["b", "a", "·"]);
        assert!(ws.boards[0].lanes.last().unwrap().is_draft());
        assert!(lane.cards.last().unwrap().is_draft());
    }
}
