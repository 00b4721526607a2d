use ratatui::layout::Rect;

/// What lives under a screen cell. Rendering records one region per element
/// it draws; mouse handling classifies the pointer against them.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// A board tab in the tab bar.
    Tab { index: usize, board_id: String },
    /// One card row pair. `card_id` is `None` for the draft row.
    CardRow {
        lane_id: String,
        card_id: Option<String>,
        index: usize,
    },
    /// A lane's header line. `lane_id` is `None` for the draft lane.
    LaneHeader { lane_id: Option<String> },
    /// A lane's full rectangle, border included.
    LaneBody { lane_id: String },
    /// The board content area below the tab bar.
    BoardPanel,
}

impl Region {
    /// Overlapping regions resolve to the most specific one.
    fn priority(&self) -> u8 {
        match self {
            Region::Tab { .. } => 4,
            Region::CardRow { .. } => 3,
            Region::LaneHeader { .. } => 2,
            Region::LaneBody { .. } => 1,
            Region::BoardPanel => 0,
        }
    }
}

/// A hit rectangle paired with what it means.
#[derive(Debug, Clone)]
pub struct Hit {
    pub rect: Rect,
    pub region: Region,
}

/// Regions recorded during the last render pass, rebuilt every frame.
#[derive(Debug, Default)]
pub struct HitMap {
    hits: Vec<Hit>,
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

impl HitMap {
    pub fn clear(&mut self) {
        self.hits.clear();
    }

    pub fn record(&mut self, rect: Rect, region: Region) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        self.hits.push(Hit { rect, region });
    }

    /// The most specific region under `(x, y)`, if any.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<&Hit> {
        self.hits
            .iter()
            .filter(|h| contains(h.rect, x, y))
            .max_by_key(|h| h.region.priority())
    }

    /// First recorded hit whose region matches the predicate.
    pub fn find(&self, pred: impl Fn(&Region) -> bool) -> Option<&Hit> {
        self.hits.iter().find(|h| pred(&h.region))
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: u16, y: u16, w: u16, h: u16) -> Rect {
        Rect::new(x, y, w, h)
    }

    #[test]
    fn hit_test_misses_outside() {
        let mut map = HitMap::default();
        map.record(rect(0, 0, 10, 2), Region::BoardPanel);
        assert!(map.hit_test(10, 0).is_none());
        assert!(map.hit_test(0, 2).is_none());
        assert!(map.hit_test(9, 1).is_some());
    }

    #[test]
    fn most_specific_region_wins() {
        let mut map = HitMap::default();
        map.record(rect(0, 0, 40, 20), Region::BoardPanel);
        map.record(
            rect(0, 2, 40, 6),
            Region::LaneBody {
                lane_id: "l1".into(),
            },
        );
        map.record(
            rect(1, 3, 38, 2),
            Region::CardRow {
                lane_id: "l1".into(),
                card_id: Some("c1".into()),
                index: 0,
            },
        );

        let hit = map.hit_test(5, 3).unwrap();
        assert!(matches!(
            &hit.region,
            Region::CardRow { card_id: Some(id), .. } if id == "c1"
        ));

        let hit = map.hit_test(5, 7).unwrap();
        assert_eq!(
            hit.region,
            Region::LaneBody {
                lane_id: "l1".into()
            }
        );

        let hit = map.hit_test(5, 15).unwrap();
        assert_eq!(hit.region, Region::BoardPanel);
    }

    #[test]
    fn zero_sized_rects_are_dropped() {
        let mut map = HitMap::default();
        map.record(rect(0, 0, 0, 5), Region::BoardPanel);
        map.record(rect(0, 0, 5, 0), Region::BoardPanel);
        assert!(map.is_empty());
    }

    #[test]
    fn clear_resets_between_frames() {
        let mut map = HitMap::default();
        map.record(rect(0, 0, 5, 5), Region::BoardPanel);
        map.clear();
        assert!(map.hit_test(1, 1).is_none());
    }
}
