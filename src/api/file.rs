use std::path::{Path, PathBuf};

use crate::api::types::*;
use crate::api::{Transport, TransportError};
use crate::io::journal::atomic_write;
use crate::io::lock::StoreLock;

/// Store backed by a single JSON document on disk.
///
/// Every write is a read-modify-write of the whole document under the
/// advisory store lock, finished with an atomic replace, so the TUI and a
/// concurrent `dk` invocation never interleave partial writes.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    fn read(&self) -> Result<StoreRecords, TransportError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TransportError::Missing(self.path.display().to_string()));
            }
            Err(e) => return Err(TransportError::Io(e)),
        };
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the whole document (seed and tests).
    pub fn save(&self, records: &StoreRecords) -> Result<(), TransportError> {
        let _lock = StoreLock::acquire_default(self.dir())?;
        self.write_unlocked(records)
    }

    fn write_unlocked(&self, records: &StoreRecords) -> Result<(), TransportError> {
        let mut text = serde_json::to_string_pretty(records)?;
        text.push('\n');
        atomic_write(&self.path, text.as_bytes())?;
        Ok(())
    }

    /// Lock, read, mutate, write. The mutation returns the store's reply
    /// value; a rejection leaves the document untouched.
    fn modify<T>(
        &self,
        f: impl FnOnce(&mut StoreRecords) -> Result<T, String>,
    ) -> Result<Result<T, String>, TransportError> {
        let _lock = StoreLock::acquire_default(self.dir())?;
        let mut records = self.read()?;
        match f(&mut records) {
            Ok(value) => {
                self.write_unlocked(&records)?;
                Ok(Ok(value))
            }
            Err(reason) => Ok(Err(reason)),
        }
    }
}

impl Transport for FileStore {
    fn load(&self) -> Result<StoreRecords, TransportError> {
        self.read()
    }

    fn create_card(
        &self,
        lane_id: &str,
        fields: CardFields,
    ) -> Result<CreateReply<CardRecord>, TransportError> {
        match self.modify(|records| records.insert_card(lane_id, &fields))? {
            Ok(record) => Ok(CreateReply::Created(record)),
            Err(reason) => Ok(CreateReply::Rejected(reason)),
        }
    }

    fn create_lane(
        &self,
        board_id: &str,
        fields: LaneFields,
    ) -> Result<CreateReply<LaneRecord>, TransportError> {
        match self.modify(|records| records.insert_lane(board_id, &fields))? {
            Ok(record) => Ok(CreateReply::Created(record)),
            Err(reason) => Ok(CreateReply::Rejected(reason)),
        }
    }

    fn update_many(&self, updates: Updates) -> Result<PushReply, TransportError> {
        match self.modify(|records| records.apply_updates(&updates))? {
            Ok(()) => Ok(PushReply::Accepted),
            Err(reason) => Ok(PushReply::Rejected(reason)),
        }
    }

    fn delete(&self, kind: EntityKind, id: &str) -> Result<PushReply, TransportError> {
        match self.modify(|records| records.apply_delete(kind, id))? {
            Ok(()) => Ok(PushReply::Accepted),
            Err(reason) => Ok(PushReply::Rejected(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortMode;
    use tempfile::TempDir;

    fn seeded_store(dir: &Path) -> FileStore {
        let store = FileStore::new(dir.join("deck.json"));
        let mut records = StoreRecords::default();
        records.boards.push(BoardRecord {
            id: "b1".into(),
            name: "Work".into(),
            sort_order: 0,
        });
        records.lanes.push(LaneRecord {
            id: "l1".into(),
            board_id: "b1".into(),
            name: "Backlog".into(),
            sort_mode: SortMode::Hand,
            sort_order: Some(0),
            closed: false,
        });
        store.save(&records).unwrap();
        store
    }

    #[test]
    fn missing_document_reports_missing() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("deck.json"));
        assert!(matches!(store.load(), Err(TransportError::Missing(_))));
    }

    #[test]
    fn corrupt_document_reports_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.json");
        std::fs::write(&path, "{ nope").unwrap();
        let store = FileStore::new(path);
        assert!(matches!(store.load(), Err(TransportError::Corrupt(_))));
    }

    #[test]
    fn create_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(dir.path());
        let reply = store
            .create_card(
                "l1",
                CardFields {
                    title: "persisted".into(),
                    flagged: true,
                    done: false,
                    sort_order: Some(0),
                },
            )
            .unwrap();
        let CreateReply::Created(record) = reply else {
            panic!("expected record, got {reply:?}");
        };
        let loaded = store.load().unwrap();
        let card = loaded.card(&record.id).unwrap();
        assert_eq!(card.title, "persisted");
        assert!(card.flagged);
    }

    #[test]
    fn rejected_update_leaves_document_untouched() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(dir.path());
        let before = store.load().unwrap();
        let reply = store
            .update_many(Updates::Cards(vec![CardPatch::order("ghost", 0)]))
            .unwrap();
        assert!(matches!(reply, PushReply::Rejected(_)));
        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn delete_cascades_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(dir.path());
        let CreateReply::Created(record) = store
            .create_card(
                "l1",
                CardFields {
                    title: "gone soon".into(),
                    flagged: false,
                    done: false,
                    sort_order: Some(0),
                },
            )
            .unwrap()
        else {
            panic!("create failed");
        };
        let reply = store.delete(EntityKind::Lane, "l1").unwrap();
        assert_eq!(reply, PushReply::Accepted);
        let loaded = store.load().unwrap();
        assert!(loaded.lane("l1").is_none());
        assert!(loaded.card(&record.id).is_none());
    }
}
