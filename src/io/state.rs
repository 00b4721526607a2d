use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Persisted TUI state (written to .deck.state.json next to the store).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiState {
    /// Active board id.
    #[serde(default)]
    pub active_board: String,
    /// Per-board cursor and scroll, keyed by board id in last-seen order.
    #[serde(default)]
    pub boards: IndexMap<String, BoardUiState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoardUiState {
    /// Cursor lane index within the board.
    #[serde(default)]
    pub cursor_lane: usize,
    /// Cursor card index within the cursor lane.
    #[serde(default)]
    pub cursor_card: usize,
    /// First visible lane of the board panel.
    #[serde(default)]
    pub scroll_offset: usize,
}

/// Read .deck.state.json from `dir`. Missing or malformed files are ignored.
pub fn read_ui_state(dir: &Path) -> Option<UiState> {
    let path = dir.join(".deck.state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .deck.state.json to `dir`.
pub fn write_ui_state(dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = dir.join(".deck.state.json");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut state = UiState {
            active_board: "b2".into(),
            ..Default::default()
        };
        state.boards.insert(
            "b2".into(),
            BoardUiState {
                cursor_lane: 1,
                cursor_card: 3,
                scroll_offset: 7,
            },
        );

        write_ui_state(dir.path(), &state).unwrap();
        let loaded = read_ui_state(dir.path()).unwrap();

        assert_eq!(loaded.active_board, "b2");
        let bs = loaded.boards.get("b2").unwrap();
        assert_eq!(bs.cursor_lane, 1);
        assert_eq!(bs.cursor_card, 3);
        assert_eq!(bs.scroll_offset, 7);
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".deck.state.json"), "not json {{{").unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn serde_defaults_on_minimal_object() {
        let state: UiState = serde_json::from_str("{}").unwrap();
        assert_eq!(state.active_board, "");
        assert!(state.boards.is_empty());
    }
}
