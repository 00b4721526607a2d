use serde::{Deserialize, Serialize};

use crate::model::{Board, Card, Lane, SortMode, Workspace};

// ---------------------------------------------------------------------------
// Records — the persisted truth, one flat row per entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Card,
    Lane,
    Board,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub id: String,
    pub name: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneRecord {
    pub id: String,
    pub board_id: String,
    pub name: String,
    #[serde(default)]
    pub sort_mode: SortMode,
    #[serde(default)]
    pub sort_order: Option<i64>,
    /// Soft-removed: kept in the store, never loaded onto a board.
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub lane_id: String,
    pub title: String,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

/// The whole store document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreRecords {
    #[serde(default)]
    pub boards: Vec<BoardRecord>,
    #[serde(default)]
    pub lanes: Vec<LaneRecord>,
    #[serde(default)]
    pub cards: Vec<CardRecord>,
    /// Id allocation counter shared by every entity kind.
    #[serde(default)]
    pub next_id: u64,
}

// ---------------------------------------------------------------------------
// Create payloads
// ---------------------------------------------------------------------------

/// Field values a draft card carries into its create call. The client
/// computes `sort_order` (one past the lane's current maximum) at submit
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardFields {
    pub title: String,
    pub flagged: bool,
    pub done: bool,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneFields {
    pub name: String,
    pub sort_mode: SortMode,
    pub sort_order: Option<i64>,
}

// ---------------------------------------------------------------------------
// Patches — partial updates; absent fields are left untouched
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flagged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CardPatch {
    pub fn order(id: impl Into<String>, sort_order: i64) -> Self {
        CardPatch {
            id: id.into(),
            sort_order: Some(sort_order),
            ..CardPatch::default()
        }
    }

    /// Migration patch: new owning lane plus the order slot there.
    pub fn move_to(id: impl Into<String>, lane_id: impl Into<String>, sort_order: i64) -> Self {
        CardPatch {
            id: id.into(),
            lane_id: Some(lane_id.into()),
            sort_order: Some(sort_order),
            ..CardPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanePatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_mode: Option<SortMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

impl LanePatch {
    pub fn order(id: impl Into<String>, sort_order: i64) -> Self {
        LanePatch {
            id: id.into(),
            sort_order: Some(sort_order),
            ..LanePatch::default()
        }
    }

    pub fn move_to(id: impl Into<String>, board_id: impl Into<String>, sort_order: i64) -> Self {
        LanePatch {
            id: id.into(),
            board_id: Some(board_id.into()),
            sort_order: Some(sort_order),
            ..LanePatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardPatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BoardPatch {
    pub fn order(id: impl Into<String>, sort_order: i64) -> Self {
        BoardPatch {
            id: id.into(),
            sort_order: Some(sort_order),
            name: None,
        }
    }
}

/// One bulk update: always a list, even for a single patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Updates {
    Cards(Vec<CardPatch>),
    Lanes(Vec<LanePatch>),
    Boards(Vec<BoardPatch>),
}

impl Updates {
    pub fn kind(&self) -> EntityKind {
        match self {
            Updates::Cards(_) => EntityKind::Card,
            Updates::Lanes(_) => EntityKind::Lane,
            Updates::Boards(_) => EntityKind::Board,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Updates::Cards(p) => p.len(),
            Updates::Lanes(p) => p.len(),
            Updates::Boards(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// Round trip completed; the store either took the write or refused it.
#[derive(Debug, Clone, PartialEq)]
pub enum PushReply {
    Accepted,
    Rejected(String),
}

/// Outcome of a draft promotion.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateReply<R> {
    /// Created; the stored record comes back immediately.
    Created(R),
    /// Created, but the caller must reload to learn the record.
    CreatedRefetch,
    Rejected(String),
}

// ---------------------------------------------------------------------------
// Record mutation shared by the store implementations
// ---------------------------------------------------------------------------

impl StoreRecords {
    pub fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    pub fn card(&self, id: &str) -> Option<&CardRecord> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn lane(&self, id: &str) -> Option<&LaneRecord> {
        self.lanes.iter().find(|l| l.id == id)
    }

    pub fn board(&self, id: &str) -> Option<&BoardRecord> {
        self.boards.iter().find(|b| b.id == id)
    }

    /// Apply a bulk update in place. `Err` carries the rejection reason and
    /// leaves the records untouched (patches are validated first).
    pub fn apply_updates(&mut self, updates: &Updates) -> Result<(), String> {
        match updates {
            Updates::Cards(patches) => {
                for p in patches {
                    if self.card(&p.id).is_none() {
                        return Err(format!("unknown card '{}'", p.id));
                    }
                    if let Some(lane_id) = &p.lane_id {
                        if self.lane(lane_id).is_none() {
                            return Err(format!("unknown lane '{}'", lane_id));
                        }
                    }
                }
                for p in patches {
                    let Some(card) = self.cards.iter_mut().find(|c| c.id == p.id) else {
                        continue;
                    };
                    if let Some(lane_id) = &p.lane_id {
                        card.lane_id = lane_id.clone();
                    }
                    if let Some(order) = p.sort_order {
                        card.sort_order = Some(order);
                    }
                    if let Some(flagged) = p.flagged {
                        card.flagged = flagged;
                    }
                    if let Some(done) = p.done {
                        card.done = done;
                    }
                    if let Some(title) = &p.title {
                        card.title = title.clone();
                    }
                }
            }
            Updates::Lanes(patches) => {
                for p in patches {
                    if self.lane(&p.id).is_none() {
                        return Err(format!("unknown lane '{}'", p.id));
                    }
                    if let Some(board_id) = &p.board_id {
                        if self.board(board_id).is_none() {
                            return Err(format!("unknown board '{}'", board_id));
                        }
                    }
                }
                for p in patches {
                    let Some(lane) = self.lanes.iter_mut().find(|l| l.id == p.id) else {
                        continue;
                    };
                    if let Some(board_id) = &p.board_id {
                        lane.board_id = board_id.clone();
                    }
                    if let Some(order) = p.sort_order {
                        lane.sort_order = Some(order);
                    }
                    if let Some(mode) = p.sort_mode {
                        lane.sort_mode = mode;
                    }
                    if let Some(name) = &p.name {
                        lane.name = name.clone();
                    }
                    if let Some(closed) = p.closed {
                        lane.closed = closed;
                        if closed {
                            lane.sort_order = None;
                        }
                    }
                }
            }
            Updates::Boards(patches) => {
                for p in patches {
                    if self.board(&p.id).is_none() {
                        return Err(format!("unknown board '{}'", p.id));
                    }
                }
                for p in patches {
                    let Some(board) = self.boards.iter_mut().find(|b| b.id == p.id) else {
                        continue;
                    };
                    if let Some(order) = p.sort_order {
                        board.sort_order = order;
                    }
                    if let Some(name) = &p.name {
                        board.name = name.clone();
                    }
                }
            }
        }
        Ok(())
    }

    /// Remove an entity, cascading to owned rows. `Err` carries the
    /// rejection reason.
    pub fn apply_delete(&mut self, kind: EntityKind, id: &str) -> Result<(), String> {
        match kind {
            EntityKind::Card => {
                let before = self.cards.len();
                self.cards.retain(|c| c.id != id);
                if self.cards.len() == before {
                    return Err(format!("unknown card '{}'", id));
                }
            }
            EntityKind::Lane => {
                let before = self.lanes.len();
                self.lanes.retain(|l| l.id != id);
                if self.lanes.len() == before {
                    return Err(format!("unknown lane '{}'", id));
                }
                self.cards.retain(|c| c.lane_id != id);
            }
            EntityKind::Board => {
                let before = self.boards.len();
                self.boards.retain(|b| b.id != id);
                if self.boards.len() == before {
                    return Err(format!("unknown board '{}'", id));
                }
                let lane_ids: Vec<String> = self
                    .lanes
                    .iter()
                    .filter(|l| l.board_id == id)
                    .map(|l| l.id.clone())
                    .collect();
                self.lanes.retain(|l| l.board_id != id);
                self.cards.retain(|c| !lane_ids.contains(&c.lane_id));
            }
        }
        Ok(())
    }

    pub fn insert_card(&mut self, lane_id: &str, fields: &CardFields) -> Result<CardRecord, String> {
        if self.lane(lane_id).is_none() {
            return Err(format!("unknown lane '{}'", lane_id));
        }
        let record = CardRecord {
            id: self.allocate_id("c"),
            lane_id: lane_id.to_string(),
            title: fields.title.clone(),
            flagged: fields.flagged,
            done: fields.done,
            sort_order: fields.sort_order,
        };
        self.cards.push(record.clone());
        Ok(record)
    }

    pub fn insert_lane(&mut self, board_id: &str, fields: &LaneFields) -> Result<LaneRecord, String> {
        if self.board(board_id).is_none() {
            return Err(format!("unknown board '{}'", board_id));
        }
        let record = LaneRecord {
            id: self.allocate_id("l"),
            board_id: board_id.to_string(),
            name: fields.name.clone(),
            sort_mode: fields.sort_mode,
            sort_order: fields.sort_order,
            closed: false,
        };
        self.lanes.push(record.clone());
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // Workspace assembly
    // -----------------------------------------------------------------------

    /// Build the display model: closed lanes are dropped, rows attach to
    /// their owners (dangling rows are dropped — `dk check` reports them),
    /// then everything is sorted and drafted via [`crate::ops::sort`].
    pub fn into_workspace(self) -> Workspace {
        let mut boards: Vec<Board> = self
            .boards
            .iter()
            .map(|b| Board::new(&b.id, &b.name, b.sort_order))
            .collect();

        for lane_rec in &self.lanes {
            if lane_rec.closed {
                continue;
            }
            let Some(board) = boards.iter_mut().find(|b| b.id == lane_rec.board_id) else {
                continue;
            };
            let mut lane = Lane::new(&lane_rec.id, &lane_rec.name);
            lane.sort_mode = lane_rec.sort_mode;
            lane.sort_order = lane_rec.sort_order;
            board.lanes.push(lane);
        }

        for card_rec in &self.cards {
            let lane = boards
                .iter_mut()
                .find_map(|b| b.lane_mut(&card_rec.lane_id));
            let Some(lane) = lane else { continue };
            let mut card = Card::new(&card_rec.id, &card_rec.title);
            card.flagged = card_rec.flagged;
            card.done = card_rec.done;
            card.sort_order = card_rec.sort_order;
            lane.cards.push(card);
        }

        let mut ws = Workspace { boards };
        crate::ops::sort::normalize(&mut ws);
        ws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> StoreRecords {
        StoreRecords {
            boards: vec![
                BoardRecord {
                    id: "b2".into(),
                    name: "Home".into(),
                    sort_order: 1,
                },
                BoardRecord {
                    id: "b1".into(),
                    name: "Work".into(),
                    sort_order: 0,
                },
            ],
            lanes: vec![
                LaneRecord {
                    id: "l1".into(),
                    board_id: "b1".into(),
                    name: "Backlog".into(),
                    sort_mode: SortMode::Hand,
                    sort_order: Some(0),
                    closed: false,
                },
                LaneRecord {
                    id: "l2".into(),
                    board_id: "b1".into(),
                    name: "Done pile".into(),
                    sort_mode: SortMode::Priority,
                    sort_order: None,
                    closed: true,
                },
            ],
            cards: vec![
                CardRecord {
                    id: "c2".into(),
                    lane_id: "l1".into(),
                    title: "ship it".into(),
                    flagged: false,
                    done: false,
                    sort_order: Some(1),
                },
                CardRecord {
                    id: "c1".into(),
                    lane_id: "l1".into(),
                    title: "build it".into(),
                    flagged: true,
                    done: false,
                    sort_order: Some(0),
                },
            ],
            next_id: 10,
        }
    }

    #[test]
    fn workspace_assembly_sorts_and_drops_closed() {
        let ws = sample_records().into_workspace();
        assert_eq!(ws.boards[0].id, "b1");
        assert_eq!(ws.boards[1].id, "b2");
        // closed lane dropped; draft lane appended
        let b1 = &ws.boards[0];
        assert_eq!(b1.real_lane_count(), 1);
        assert!(b1.lanes.last().unwrap().is_draft());
        // hand order applied, draft card appended
        let lane = &b1.lanes[0];
        let ids: Vec<_> = lane.real_cards().map(|c| c.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert!(lane.cards.last().unwrap().is_draft());
    }

    #[test]
    fn update_unknown_id_rejects_without_mutating() {
        let mut records = sample_records();
        let before = records.clone();
        let err = records
            .apply_updates(&Updates::Cards(vec![
                CardPatch::order("c1", 5),
                CardPatch::order("nope", 6),
            ]))
            .unwrap_err();
        assert!(err.contains("nope"));
        assert_eq!(records, before);
    }

    #[test]
    fn update_applies_all_patches() {
        let mut records = sample_records();
        records
            .apply_updates(&Updates::Cards(vec![
                CardPatch::order("c1", 1),
                CardPatch::move_to("c2", "l1", 0),
            ]))
            .unwrap();
        assert_eq!(records.card("c1").unwrap().sort_order, Some(1));
        assert_eq!(records.card("c2").unwrap().sort_order, Some(0));
    }

    #[test]
    fn closing_lane_nulls_its_order() {
        let mut records = sample_records();
        records
            .apply_updates(&Updates::Lanes(vec![LanePatch {
                id: "l1".into(),
                closed: Some(true),
                ..LanePatch::default()
            }]))
            .unwrap();
        let lane = records.lane("l1").unwrap();
        assert!(lane.closed);
        assert_eq!(lane.sort_order, None);
    }

    #[test]
    fn delete_lane_cascades_to_cards() {
        let mut records = sample_records();
        records.apply_delete(EntityKind::Lane, "l1").unwrap();
        assert!(records.lane("l1").is_none());
        assert!(records.cards.is_empty());
    }

    #[test]
    fn patch_serialization_skips_absent_fields() {
        let updates = Updates::Cards(vec![
            CardPatch::order("c1", 0),
            CardPatch::move_to("c2", "l9", 1),
        ]);
        let json = serde_json::to_string(&updates).unwrap();
        assert_eq!(
            json,
            r#"{"cards":[{"id":"c1","sort_order":0},{"id":"c2","lane_id":"l9","sort_order":1}]}"#
        );
    }

    #[test]
    fn allocate_id_is_monotonic() {
        let mut records = StoreRecords::default();
        assert_eq!(records.allocate_id("c"), "c1");
        assert_eq!(records.allocate_id("l"), "l2");
        assert_eq!(records.next_id, 2);
    }
}
