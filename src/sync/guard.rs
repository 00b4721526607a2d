use indexmap::IndexMap;

use crate::api::CardPatch;
use crate::model::Card;

/// A field mutation queued while a create is in flight.
///
/// Keyed by field, so a flag toggled twice before the create resolves
/// queues one value (the latest), never two patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuedField {
    Flagged(bool),
    Done(bool),
}

impl QueuedField {
    fn key(self) -> &'static str {
        match self {
            QueuedField::Flagged(_) => "flagged",
            QueuedField::Done(_) => "done",
        }
    }

    /// Apply to the in-memory card (the optimistic half of the mutation).
    pub fn apply(self, card: &mut Card) {
        match self {
            QueuedField::Flagged(v) => card.flagged = v,
            QueuedField::Done(v) => card.done = v,
        }
    }
}

#[derive(Debug, Default)]
struct PendingCreate {
    queued: IndexMap<&'static str, QueuedField>,
}

/// Serializes a draft's create request against mutations fired before the
/// create completes.
///
/// One entry per host (lane id for card drafts, board id for lane drafts).
/// While an entry is open, a second create attempt for the same host is
/// ignored, and field mutations to the still-draft row queue here instead of
/// being dropped (no id exists to update yet). Resolution flushes the queue
/// as one follow-up update.
#[derive(Debug, Default)]
pub struct CreateGuard {
    entries: IndexMap<String, PendingCreate>,
}

impl CreateGuard {
    /// Open the busy entry for `host_id`. Returns `false` when a create for
    /// this host is already in flight (the caller must not submit another).
    pub fn begin(&mut self, host_id: &str) -> bool {
        if self.entries.contains_key(host_id) {
            return false;
        }
        self.entries
            .insert(host_id.to_string(), PendingCreate::default());
        true
    }

    pub fn is_busy(&self, host_id: &str) -> bool {
        self.entries.contains_key(host_id)
    }

    /// Queue a field mutation behind the in-flight create. Returns `false`
    /// when no create is in flight for `host_id` (callers then update the
    /// store directly).
    pub fn queue(&mut self, host_id: &str, field: QueuedField) -> bool {
        let Some(entry) = self.entries.get_mut(host_id) else {
            return false;
        };
        entry.queued.insert(field.key(), field);
        true
    }

    /// The create resolved with a real id: close the entry and hand back the
    /// queued mutations, in the order they first arrived.
    pub fn resolve(&mut self, host_id: &str) -> Vec<QueuedField> {
        self.entries
            .shift_remove(host_id)
            .map(|e| e.queued.into_values().collect())
            .unwrap_or_default()
    }

    /// The create failed or was rejected: close the entry. The draft keeps
    /// its locally applied values, so the queue is dropped — nothing was
    /// persisted, there is nothing to follow up on.
    pub fn abort(&mut self, host_id: &str) {
        self.entries.shift_remove(host_id);
    }

    /// Build the single follow-up update for a freshly created card.
    /// `None` when nothing was queued.
    pub fn follow_up(id: &str, queued: &[QueuedField]) -> Option<CardPatch> {
        if queued.is_empty() {
            return None;
        }
        let mut patch = CardPatch {
            id: id.to_string(),
            ..CardPatch::default()
        };
        for field in queued {
            match field {
                QueuedField::Flagged(v) => patch.flagged = Some(*v),
                QueuedField::Done(v) => patch.done = Some(*v),
            }
        }
        Some(patch)
    }
}
