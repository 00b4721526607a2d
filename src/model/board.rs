use serde::{Deserialize, Serialize};

use crate::model::lane::Lane;

/// A tab: a named group of lanes, orderable among sibling boards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub sort_order: i64,
    pub lanes: Vec<Lane>,
}

impl Board {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sort_order: i64) -> Self {
        Board {
            id: id.into(),
            name: name.into(),
            sort_order,
            lanes: Vec::new(),
        }
    }

    pub fn real_lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter().filter(|l| !l.is_draft())
    }

    pub fn real_lane_count(&self) -> usize {
        self.real_lanes().count()
    }

    pub fn max_lane_order(&self) -> Option<i64> {
        self.real_lanes().filter_map(|l| l.sort_order).max()
    }

    pub fn next_lane_order(&self) -> i64 {
        self.max_lane_order().map_or(0, |m| m + 1)
    }

    pub fn lane_index(&self, lane_id: &str) -> Option<usize> {
        self.lanes
            .iter()
            .position(|l| l.id.as_deref() == Some(lane_id))
    }

    pub fn lane(&self, lane_id: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id.as_deref() == Some(lane_id))
    }

    pub fn lane_mut(&mut self, lane_id: &str) -> Option<&mut Lane> {
        self.lanes
            .iter_mut()
            .find(|l| l.id.as_deref() == Some(lane_id))
    }

    pub fn draft_lane_index(&self) -> Option<usize> {
        self.lanes.iter().position(|l| l.is_draft())
    }

    /// Append a draft lane if the board has none. Every board keeps exactly
    /// one, always sorted last.
    pub fn ensure_draft_lane(&mut self) {
        if self.draft_lane_index().is_none() {
            self.lanes.push(Lane::draft());
        }
    }
}
