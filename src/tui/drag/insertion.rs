use ratatui::layout::Rect;

/// Which side of the hovered entity the pointer sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Above,
    Below,
}

/// A tracked drop slot: an index into the host's pre-drag ordering, plus the
/// edge it was derived from (the render pass draws the indicator on it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    pub index: usize,
    pub edge: Edge,
}

impl InsertionPoint {
    pub fn new(index: usize, edge: Edge) -> Self {
        InsertionPoint { index, edge }
    }
}

/// Resolve a vertical hover against the hovered entity's rectangle: pointer
/// above the midpoint inserts before it, at or below inserts after.
pub fn vertical_insertion(row: u16, rect: Rect, hovered_index: usize) -> InsertionPoint {
    let midpoint = rect.y + rect.height / 2;
    if row < midpoint {
        InsertionPoint::new(hovered_index, Edge::Above)
    } else {
        InsertionPoint::new(hovered_index + 1, Edge::Below)
    }
}

/// Same resolution for horizontal rows (the tab bar).
pub fn horizontal_insertion(col: u16, rect: Rect, hovered_index: usize) -> InsertionPoint {
    let midpoint = rect.x + rect.width / 2;
    if col < midpoint {
        InsertionPoint::new(hovered_index, Edge::Above)
    } else {
        InsertionPoint::new(hovered_index + 1, Edge::Below)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_row_card_splits_on_its_second_row() {
        // A card at y=4, two rows tall: midpoint is y=5.
        let rect = Rect::new(0, 4, 30, 2);
        assert_eq!(
            vertical_insertion(4, rect, 1),
            InsertionPoint::new(1, Edge::Above)
        );
        assert_eq!(
            vertical_insertion(5, rect, 1),
            InsertionPoint::new(2, Edge::Below)
        );
    }

    #[test]
    fn single_row_entity_always_inserts_after() {
        // Midpoint of a one-row rect is its own row.
        let rect = Rect::new(0, 7, 30, 1);
        assert_eq!(
            vertical_insertion(7, rect, 0),
            InsertionPoint::new(1, Edge::Below)
        );
    }

    #[test]
    fn tab_splits_on_horizontal_midpoint() {
        let rect = Rect::new(10, 0, 8, 1);
        assert_eq!(
            horizontal_insertion(11, rect, 2),
            InsertionPoint::new(2, Edge::Above)
        );
        assert_eq!(
            horizontal_insertion(14, rect, 2),
            InsertionPoint::new(3, Edge::Below)
        );
        assert_eq!(
            horizontal_insertion(17, rect, 2),
            InsertionPoint::new(3, Edge::Below)
        );
    }
}
