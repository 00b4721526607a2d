use indexmap::IndexMap;

use crate::model::{Card, Lane, Workspace};

/// Handle to one captured rollback state, carried by the in-flight store
/// call that may need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotToken(u64);

/// The last persisted-equivalent state of one host, captured immediately
/// before an optimistic mutation.
#[derive(Debug, Clone)]
pub enum HostSnapshot {
    /// A lane's full card list (card migrations and reorders).
    LaneCards { lane_id: String, cards: Vec<Card> },
    /// A board's full lane list (lane migrations and reorders).
    BoardLanes { board_id: String, lanes: Vec<Lane> },
    /// Board display order with sort orders (tab reorders).
    TabOrder { boards: Vec<(String, i64)> },
}

/// Version-token arena of rollback snapshots.
///
/// One token per store call; the token holds the pre-mutation state of every
/// host that call's rollback must restore. Discarded on confirmed commit,
/// restored (whole-host splices) on failure.
#[derive(Debug, Default)]
pub struct SnapshotArena {
    next: u64,
    entries: IndexMap<u64, Vec<HostSnapshot>>,
}

impl SnapshotArena {
    pub fn capture(&mut self, hosts: Vec<HostSnapshot>) -> SnapshotToken {
        let token = SnapshotToken(self.next);
        self.next += 1;
        self.entries.insert(token.0, hosts);
        token
    }

    /// The commit was confirmed; the snapshot will never be needed.
    pub fn discard(&mut self, token: SnapshotToken) {
        self.entries.shift_remove(&token.0);
    }

    /// Splice the captured state back into `ws`. Returns `false` for an
    /// unknown (already discarded) token.
    pub fn restore(&mut self, token: SnapshotToken, ws: &mut Workspace) -> bool {
        let Some(hosts) = self.entries.shift_remove(&token.0) else {
            return false;
        };
        for host in hosts {
            match host {
                HostSnapshot::LaneCards { lane_id, cards } => {
                    if let Some(lane) = ws.lane_mut(&lane_id) {
                        lane.cards = cards;
                    }
                }
                HostSnapshot::BoardLanes { board_id, lanes } => {
                    if let Some(board) = ws.board_mut(&board_id) {
                        board.lanes = lanes;
                    }
                }
                HostSnapshot::TabOrder { boards } => {
                    restore_tab_order(ws, &boards);
                }
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Put boards back into the captured display order and restore their sort
/// orders. Boards that appeared after the capture keep their relative order
/// at the end.
fn restore_tab_order(ws: &mut Workspace, saved: &[(String, i64)]) {
    for (id, order) in saved {
        if let Some(board) = ws.board_mut(id) {
            board.sort_order = *order;
        }
    }
    let position =
        |id: &str| saved.iter().position(|(s, _)| s == id).unwrap_or(saved.len());
    ws.boards.sort_by_key(|b| position(&b.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Board;

    fn card(id: &str, order: i64) -> Card {
        let mut c = Card::new(id, id);
        c.sort_order = Some(order);
        c
    }

    fn workspace() -> Workspace {
        let mut board = Board::new("b1", "Work", 0);
        let mut lane = Lane::new("l1", "Backlog");
        lane.cards = vec![card("a", 0), card("b", 1)];
        board.lanes.push(lane);
        Workspace {
            boards: vec![board, Board::new("b2", "Home", 1)],
        }
    }

    #[test]
    fn restore_puts_cards_back() {
        let mut ws = workspace();
        let mut arena = SnapshotArena::default();
        let token = arena.capture(vec![HostSnapshot::LaneCards {
            lane_id: "l1".into(),
            cards: ws.lane("l1").unwrap().cards.clone(),
        }]);

        // optimistic mutation that will fail
        ws.lane_mut("l1").unwrap().cards.remove(0);
        assert_eq!(ws.lane("l1").unwrap().cards.len(), 1);

        assert!(arena.restore(token, &mut ws));
        let ids: Vec<_> = ws
            .lane("l1")
            .unwrap()
            .cards
            .iter()
            .map(|c| c.id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(arena.is_empty());
    }

    #[test]
    fn discarded_token_cannot_restore() {
        let mut ws = workspace();
        let mut arena = SnapshotArena::default();
        let token = arena.capture(vec![HostSnapshot::LaneCards {
            lane_id: "l1".into(),
            cards: vec![],
        }]);
        arena.discard(token);
        assert!(!arena.restore(token, &mut ws));
        assert_eq!(ws.lane("l1").unwrap().cards.len(), 2);
    }

    #[test]
    fn tab_order_restores_positions_and_orders() {
        let mut ws = workspace();
        let mut arena = SnapshotArena::default();
        let token = arena.capture(vec![HostSnapshot::TabOrder {
            boards: ws.boards.iter().map(|b| (b.id.clone(), b.sort_order)).collect(),
        }]);

        ws.boards.swap(0, 1);
        ws.boards[0].sort_order = 0;
        ws.boards[1].sort_order = 1;

        assert!(arena.restore(token, &mut ws));
        assert_eq!(ws.boards[0].id, "b1");
        assert_eq!(ws.boards[0].sort_order, 0);
        assert_eq!(ws.boards[1].id, "b2");
        assert_eq!(ws.boards[1].sort_order, 1);
    }

    #[test]
    fn tokens_are_independent() {
        let mut ws = workspace();
        let mut arena = SnapshotArena::default();
        let t1 = arena.capture(vec![HostSnapshot::LaneCards {
            lane_id: "l1".into(),
            cards: ws.lane("l1").unwrap().cards.clone(),
        }]);
        let t2 = arena.capture(vec![HostSnapshot::TabOrder {
            boards: vec![("b1".into(), 0), ("b2".into(), 1)],
        }]);
        assert_eq!(arena.len(), 2);
        arena.discard(t1);
        assert!(arena.restore(t2, &mut ws));
        assert!(arena.is_empty());
    }
}
