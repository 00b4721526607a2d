use thiserror::Error;

use crate::model::Workspace;
use crate::ops::card_ops::adjust_insertion;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board '{0}' not found")]
    NotFound(String),
}

/// Splice the dragged tab to the tracked insertion index. Returns `false`
/// for a no-op drop. The caller preserves the active tab by id, so the
/// selected board never jumps when its index changes.
pub fn reorder_board(ws: &mut Workspace, board_id: &str, insertion: usize) -> Result<bool, BoardError> {
    let dragged = ws
        .board_index(board_id)
        .ok_or_else(|| BoardError::NotFound(board_id.to_string()))?;
    let Some(target) = adjust_insertion(dragged, insertion) else {
        return Ok(false);
    };
    let board = ws.boards.remove(dragged);
    let target = target.min(ws.boards.len());
    ws.boards.insert(target, board);
    Ok(true)
}

/// Rewrite every board's `sort_order` to its position. Returns the
/// `(id, order)` pairs for the bulk update.
pub fn renumber_boards(ws: &mut Workspace) -> Vec<(String, i64)> {
    let mut pairs = Vec::with_capacity(ws.boards.len());
    for (i, board) in ws.boards.iter_mut().enumerate() {
        board.sort_order = i as i64;
        pairs.push((board.id.clone(), i as i64));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Board;

    fn workspace(ids: &[&str]) -> Workspace {
        Workspace {
            boards: ids
                .iter()
                .enumerate()
                .map(|(i, id)| Board::new(*id, *id, i as i64))
                .collect(),
        }
    }

    fn order(ws: &Workspace) -> Vec<&str> {
        ws.boards.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn tab_moves_right() {
        let mut ws = workspace(&["a", "b", "c"]);
        assert!(reorder_board(&mut ws, "a", 3).unwrap());
        assert_eq!(order(&ws), vec!["b", "c", "a"]);
    }

    #[test]
    fn tab_moves_left() {
        let mut ws = workspace(&["a", "b", "c"]);
        assert!(reorder_board(&mut ws, "c", 0).unwrap());
        assert_eq!(order(&ws), vec!["c", "a", "b"]);
    }

    #[test]
    fn tab_drop_in_place_is_noop() {
        let mut ws = workspace(&["a", "b"]);
        assert!(!reorder_board(&mut ws, "b", 1).unwrap());
        assert_eq!(order(&ws), vec!["a", "b"]);
    }

    #[test]
    fn renumber_matches_positions() {
        let mut ws = workspace(&["a", "b", "c"]);
        ws.boards.reverse();
        let pairs = renumber_boards(&mut ws);
        assert_eq!(
            pairs,
            vec![
                ("c".to_string(), 0),
                ("b".to_string(), 1),
                ("a".to_string(), 2)
            ]
        );
        assert_eq!(ws.boards[0].sort_order, 0);
        assert_eq!(ws.boards[2].sort_order, 2);
    }
}
