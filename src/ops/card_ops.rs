use thiserror::Error;

use crate::model::{Card, Lane};

#[derive(Debug, Error)]
pub enum CardError {
    #[error("card '{0}' not found")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// Same-host reorder
// ---------------------------------------------------------------------------

/// Adjust a tracked insertion index for the dragged row's own removal.
///
/// `insertion` was computed against the pre-drag ordering; removing the row
/// at `dragged` shifts every later index left by one. Returns `None` when
/// the adjusted index equals the current index (the drop is a no-op).
pub fn adjust_insertion(dragged: usize, insertion: usize) -> Option<usize> {
    let adjusted = if insertion > dragged {
        insertion - 1
    } else {
        insertion
    };
    if adjusted == dragged {
        None
    } else {
        Some(adjusted)
    }
}

/// Splice `card_id` to the tracked insertion index within its own lane.
///
/// Returns `false` when the drop resolves to a no-op. The lane's draft row
/// stays last: tracked indices only ever range over real cards.
pub fn reorder_card(lane: &mut Lane, card_id: &str, insertion: usize) -> Result<bool, CardError> {
    let dragged = lane
        .card_index(card_id)
        .ok_or_else(|| CardError::NotFound(card_id.to_string()))?;
    let Some(target) = adjust_insertion(dragged, insertion) else {
        return Ok(false);
    };
    let card = lane.cards.remove(dragged);
    let target = target.min(lane.real_card_count());
    lane.cards.insert(target, card);
    Ok(true)
}

// ---------------------------------------------------------------------------
// Cross-host surgery
// ---------------------------------------------------------------------------

/// Remove `card_id` from `lane` and hand it back.
pub fn extract_card(lane: &mut Lane, card_id: &str) -> Result<Card, CardError> {
    let index = lane
        .card_index(card_id)
        .ok_or_else(|| CardError::NotFound(card_id.to_string()))?;
    Ok(lane.cards.remove(index))
}

/// Insert `card` into `lane` at the tracked index, clamped to
/// `[0, real_card_count]`; `None` appends after the last real card. Either
/// way the draft row stays behind the insertion.
pub fn insert_card(lane: &mut Lane, card: Card, index: Option<usize>) -> usize {
    let limit = lane.real_card_count();
    let at = index.unwrap_or(limit).min(limit);
    lane.cards.insert(at, card);
    at
}

// ---------------------------------------------------------------------------
// Renumbering
// ---------------------------------------------------------------------------

/// Rewrite every real card's `sort_order` to its position, in display order.
/// Returns one `(id, order)` pair per real card — the body of the bulk
/// update that makes the lane contiguous again.
pub fn renumber_cards(lane: &mut Lane) -> Vec<(String, i64)> {
    let mut pairs = Vec::with_capacity(lane.real_card_count());
    let mut next = 0i64;
    for card in &mut lane.cards {
        let Some(id) = card.id.clone() else { continue };
        card.sort_order = Some(next);
        pairs.push((id, next));
        next += 1;
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortMode;

    fn lane(ids: &[&str]) -> Lane {
        let mut lane = Lane::new("l1", "Backlog");
        lane.sort_mode = SortMode::Hand;
        for (i, id) in ids.iter().enumerate() {
            let mut c = Card::new(*id, *id);
            c.sort_order = Some(i as i64);
            lane.cards.push(c);
        }
        lane.ensure_draft_card();
        lane
    }

    fn order(lane: &Lane) -> Vec<&str> {
        lane.real_cards()
            .map(|c| c.id.as_deref().unwrap())
            .collect()
    }

    #[test]
    fn adjust_insertion_table() {
        // dragging index 0, hovering below index 1 → target 1
        assert_eq!(adjust_insertion(0, 2), Some(1));
        // dropping where the card already is → no-op
        assert_eq!(adjust_insertion(0, 0), None);
        assert_eq!(adjust_insertion(0, 1), None);
        assert_eq!(adjust_insertion(2, 2), None);
        assert_eq!(adjust_insertion(2, 3), None);
        // moving up keeps the raw index
        assert_eq!(adjust_insertion(2, 0), Some(0));
        assert_eq!(adjust_insertion(2, 1), Some(1));
        // moving down shifts by the removed slot
        assert_eq!(adjust_insertion(0, 3), Some(2));
    }

    #[test]
    fn reorder_moves_card_down() {
        // Scenario: [a, b, c], drag a, hover below b (insertion 2).
        let mut l = lane(&["a", "b", "c"]);
        let moved = reorder_card(&mut l, "a", 2).unwrap();
        assert!(moved);
        assert_eq!(order(&l), vec!["b", "a", "c"]);
        assert!(l.cards.last().unwrap().is_draft());
    }

    #[test]
    fn reorder_moves_card_up() {
        let mut l = lane(&["a", "b", "c"]);
        let moved = reorder_card(&mut l, "c", 0).unwrap();
        assert!(moved);
        assert_eq!(order(&l), vec!["c", "a", "b"]);
    }

    #[test]
    fn reorder_noop_when_slot_unchanged() {
        let mut l = lane(&["a", "b", "c"]);
        let moved = reorder_card(&mut l, "b", 1).unwrap();
        assert!(!moved);
        assert_eq!(order(&l), vec!["a", "b", "c"]);
    }

    #[test]
    fn reorder_unknown_card_errors() {
        let mut l = lane(&["a"]);
        assert!(reorder_card(&mut l, "zz", 0).is_err());
    }

    #[test]
    fn insert_clamps_to_real_count() {
        let mut l = lane(&["a", "b"]);
        let at = insert_card(&mut l, Card::new("x", "x"), Some(99));
        assert_eq!(at, 2);
        assert_eq!(order(&l), vec!["a", "b", "x"]);
        assert!(l.cards.last().unwrap().is_draft());
    }

    #[test]
    fn insert_none_appends_before_draft() {
        let mut l = lane(&["a"]);
        insert_card(&mut l, Card::new("x", "x"), None);
        assert_eq!(order(&l), vec!["a", "x"]);
    }

    #[test]
    fn extract_then_insert_preserves_card() {
        let mut from = lane(&["a", "b"]);
        let mut to = lane(&["z"]);
        let card = extract_card(&mut from, "a").unwrap();
        insert_card(&mut to, card, Some(0));
        assert_eq!(order(&from), vec!["b"]);
        assert_eq!(order(&to), vec!["a", "z"]);
    }

    #[test]
    fn renumber_skips_draft_and_covers_all() {
        let mut l = lane(&["a", "b", "c"]);
        l.cards.swap(0, 2); // [c, b, a, draft]
        let pairs = renumber_cards(&mut l);
        assert_eq!(
            pairs,
            vec![
                ("c".to_string(), 0),
                ("b".to_string(), 1),
                ("a".to_string(), 2)
            ]
        );
        assert_eq!(l.cards[0].sort_order, Some(0));
        assert_eq!(l.cards[2].sort_order, Some(2));
        assert_eq!(l.cards[3].sort_order, None);
    }
}
