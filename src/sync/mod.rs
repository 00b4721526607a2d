pub mod guard;
pub mod queue;
pub mod snapshot;

pub use guard::{CreateGuard, QueuedField};
pub use queue::{JobDone, JobResult, JobTag, StoreJob, SyncQueue};
pub use snapshot::{HostSnapshot, SnapshotArena, SnapshotToken};
