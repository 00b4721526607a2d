pub mod file;
pub mod memory;
pub mod types;

pub use file::FileStore;
pub use memory::{CreateMode, Fault, MemoryStore, StoreCall};
pub use types::*;

use thiserror::Error;

/// The transport did not complete a round trip. A completed-but-refused
/// write is a [`PushReply::Rejected`] / [`CreateReply::Rejected`] instead.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("store is missing at {0} (run `dk seed` first)")]
    Missing(String),
    #[error(transparent)]
    Lock(#[from] crate::io::lock::LockError),
}

/// The store interface the engine talks to. Wire format and remoteness are
/// the implementation's business; every call is a complete round trip.
///
/// Implementations are driven from the sync worker thread while the UI
/// thread keeps running, so they take `&self` and must be `Send + Sync`.
pub trait Transport: Send + Sync {
    /// Fetch everything (initial load, external-change reload, and the
    /// record refetch after a `CreatedRefetch`).
    fn load(&self) -> Result<StoreRecords, TransportError>;

    /// Promote a draft card into `lane_id`.
    fn create_card(
        &self,
        lane_id: &str,
        fields: CardFields,
    ) -> Result<CreateReply<CardRecord>, TransportError>;

    /// Promote a draft lane into `board_id`.
    fn create_lane(
        &self,
        board_id: &str,
        fields: LaneFields,
    ) -> Result<CreateReply<LaneRecord>, TransportError>;

    /// Bulk field update; one list per entity kind, accepted atomically.
    fn update_many(&self, updates: Updates) -> Result<PushReply, TransportError>;

    /// Permanent removal (cascades to owned rows).
    fn delete(&self, kind: EntityKind, id: &str) -> Result<PushReply, TransportError>;
}
