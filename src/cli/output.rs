use serde::Serialize;

use crate::api::StoreRecords;
use crate::model::SortMode;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SeedJson {
    pub path: String,
    pub boards: usize,
    pub lanes: usize,
    pub cards: usize,
}

#[derive(Serialize)]
pub struct BoardSummaryJson {
    pub id: String,
    pub name: String,
    pub lanes: Vec<LaneSummaryJson>,
}

#[derive(Serialize)]
pub struct LaneSummaryJson {
    pub id: String,
    pub name: String,
    pub sort_mode: SortMode,
    pub cards: usize,
    pub flagged: usize,
    pub done: usize,
}

/// Per-board lane/card counts, in display order (closed lanes excluded).
pub fn board_summaries(records: &StoreRecords) -> Vec<BoardSummaryJson> {
    let mut boards: Vec<&crate::api::BoardRecord> = records.boards.iter().collect();
    boards.sort_by_key(|b| b.sort_order);

    boards
        .into_iter()
        .map(|board| {
            let mut lanes: Vec<&crate::api::LaneRecord> = records
                .lanes
                .iter()
                .filter(|l| l.board_id == board.id && !l.closed)
                .collect();
            lanes.sort_by_key(|l| (l.sort_order.is_none(), l.sort_order));

            let lanes = lanes
                .into_iter()
                .map(|lane| {
                    let cards: Vec<_> = records
                        .cards
                        .iter()
                        .filter(|c| c.lane_id == lane.id)
                        .collect();
                    LaneSummaryJson {
                        id: lane.id.clone(),
                        name: lane.name.clone(),
                        sort_mode: lane.sort_mode,
                        cards: cards.len(),
                        flagged: cards.iter().filter(|c| c.flagged).count(),
                        done: cards.iter().filter(|c| c.done).count(),
                    }
                })
                .collect();

            BoardSummaryJson {
                id: board.id.clone(),
                name: board.name.clone(),
                lanes,
            }
        })
        .collect()
}
