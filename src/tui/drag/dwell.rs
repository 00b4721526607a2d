use std::time::{Duration, Instant};

/// Delayed tab switch during a drag.
///
/// Hovering a foreign tab arms a timer instead of switching immediately; the
/// switch fires once the pointer has dwelt for the configured interval.
/// Leaving the tab before that disarms it.
#[derive(Debug, Clone)]
pub struct DwellSwitch {
    pub target_board: String,
    pub armed_at: Instant,
}

impl DwellSwitch {
    pub fn arm(target_board: impl Into<String>) -> Self {
        DwellSwitch {
            target_board: target_board.into(),
            armed_at: Instant::now(),
        }
    }

    /// Re-arm for a different tab; staying on the same tab keeps the running
    /// timer.
    pub fn retarget(&mut self, target_board: &str) {
        if self.target_board != target_board {
            self.target_board = target_board.to_string();
            self.armed_at = Instant::now();
        }
    }

    pub fn is_due(&self, dwell: Duration) -> bool {
        self.armed_at.elapsed() >= dwell
    }
}
