use serde::{Deserialize, Serialize};

/// A single row on a lane.
///
/// `id` is `None` while the card is still the lane's draft ("add a card")
/// row: held purely in memory, never sent to the store, always displayed
/// last. The first successful save promotes it to a real card with a store
/// assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: Option<String>,
    pub title: String,
    /// Elevated flag; drives ordering under priority sort.
    pub flagged: bool,
    pub done: bool,
    /// Manual position. `None` means not yet assigned; hand sort puts such
    /// cards after every ordered card.
    pub sort_order: Option<i64>,
}

impl Card {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Card {
            id: Some(id.into()),
            title: title.into(),
            flagged: false,
            done: false,
            sort_order: None,
        }
    }

    /// The in-place "add a card" row.
    pub fn draft() -> Self {
        Card {
            id: None,
            title: String::new(),
            flagged: false,
            done: false,
            sort_order: None,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.id.is_none()
    }
}
