use serde::{Deserialize, Serialize};

use crate::model::card::Card;

/// Ordering discipline for the cards of one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Flagged cards first, otherwise incoming order (stable).
    #[default]
    Priority,
    /// Ascending `sort_order`; unassigned orders last.
    Hand,
}

impl SortMode {
    pub fn toggled(self) -> SortMode {
        match self {
            SortMode::Priority => SortMode::Hand,
            SortMode::Hand => SortMode::Priority,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Priority => "priority",
            SortMode::Hand => "hand",
        }
    }
}

/// A band of cards inside a board.
///
/// Like cards, a lane with `id: None` is the board's draft ("add a lane")
/// row. Closed lanes are store records only and never loaded into a board,
/// so the lane list is exactly what the board displays: real lanes in order,
/// draft last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: Option<String>,
    pub name: String,
    pub sort_mode: SortMode,
    /// Position among the board's lanes; cleared in the store on close.
    pub sort_order: Option<i64>,
    pub cards: Vec<Card>,
}

impl Lane {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Lane {
            id: Some(id.into()),
            name: name.into(),
            sort_mode: SortMode::default(),
            sort_order: None,
            cards: Vec::new(),
        }
    }

    /// The in-place "add a lane" row.
    pub fn draft() -> Self {
        Lane {
            id: None,
            name: String::new(),
            sort_mode: SortMode::default(),
            sort_order: None,
            cards: Vec::new(),
        }
    }

    pub fn is_draft(&self) -> bool {
        self.id.is_none()
    }

    pub fn real_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| !c.is_draft())
    }

    pub fn real_card_count(&self) -> usize {
        self.real_cards().count()
    }

    /// Highest committed card order, or `None` when no real card has one.
    pub fn max_card_order(&self) -> Option<i64> {
        self.real_cards().filter_map(|c| c.sort_order).max()
    }

    /// Order assigned to the next appended card.
    pub fn next_card_order(&self) -> i64 {
        self.max_card_order().map_or(0, |m| m + 1)
    }

    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards
            .iter()
            .position(|c| c.id.as_deref() == Some(card_id))
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id.as_deref() == Some(card_id))
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.cards
            .iter_mut()
            .find(|c| c.id.as_deref() == Some(card_id))
    }

    /// Index of the lane's draft card, if present.
    pub fn draft_index(&self) -> Option<usize> {
        self.cards.iter().position(|c| c.is_draft())
    }

    /// Append a draft card if the lane has none. Every displayed lane keeps
    /// exactly one.
    pub fn ensure_draft_card(&mut self) {
        if self.draft_index().is_none() {
            self.cards.push(Card::draft());
        }
    }
}
