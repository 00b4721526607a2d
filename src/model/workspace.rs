use serde::{Deserialize, Serialize};

use crate::model::board::Board;
use crate::model::card::Card;
use crate::model::lane::Lane;

/// Where a card currently sits: owning board, owning lane, position within
/// the lane's card list.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLoc {
    pub board_id: String,
    pub lane_id: String,
    pub index: usize,
}

/// Everything loaded from the store, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub boards: Vec<Board>,
}

impl Workspace {
    pub fn board_index(&self, board_id: &str) -> Option<usize> {
        self.boards.iter().position(|b| b.id == board_id)
    }

    pub fn board(&self, board_id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == board_id)
    }

    pub fn board_mut(&mut self, board_id: &str) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == board_id)
    }

    /// Board that owns `lane_id`, searching every board.
    pub fn board_of_lane(&self, lane_id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.lane_index(lane_id).is_some())
    }

    pub fn lane(&self, lane_id: &str) -> Option<&Lane> {
        self.boards.iter().find_map(|b| b.lane(lane_id))
    }

    pub fn lane_mut(&mut self, lane_id: &str) -> Option<&mut Lane> {
        self.boards.iter_mut().find_map(|b| b.lane_mut(lane_id))
    }

    /// First location of `card_id` in board display order. During a
    /// cross-lane hover a provisional copy exists in the hovered lane, so
    /// callers resolving a drag work from explicit lane ids instead.
    pub fn find_card(&self, card_id: &str) -> Option<CardLoc> {
        for board in &self.boards {
            for lane in &board.lanes {
                if let Some(index) = lane.card_index(card_id) {
                    return Some(CardLoc {
                        board_id: board.id.clone(),
                        lane_id: lane.id.clone().unwrap_or_default(),
                        index,
                    });
                }
            }
        }
        None
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.boards
            .iter()
            .find_map(|b| b.lanes.iter().find_map(|l| l.card(card_id)))
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.boards
            .iter_mut()
            .find_map(|b| b.lanes.iter_mut().find_map(|l| l.card_mut(card_id)))
    }
}
