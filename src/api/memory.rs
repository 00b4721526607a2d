use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::api::types::*;
use crate::api::{Transport, TransportError};

/// Scripted behavior for the next store calls, consumed front to back.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// Round trip never completes (transport failure).
    Unavailable(String),
    /// Round trip completes but the store refuses the write.
    Reject(String),
}

/// How create calls answer when they succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    #[default]
    ReturnRecord,
    RequireRefetch,
}

/// Every call the store received, in order. Tests assert on this log to
/// pin down exactly which updates a gesture produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Load,
    CreateCard { lane_id: String, fields: CardFields },
    CreateLane { board_id: String, fields: LaneFields },
    Update(Updates),
    Delete(EntityKind, String),
}

#[derive(Default)]
struct MemoryInner {
    records: StoreRecords,
    create_mode: CreateMode,
    faults: VecDeque<Fault>,
    log: Vec<StoreCall>,
}

/// In-process store: the test double for the engine and the backing store
/// for throwaway sessions. Keeps full records so `load()` round-trips
/// every applied write.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn seeded(records: StoreRecords) -> Self {
        MemoryStore {
            inner: Mutex::new(MemoryInner {
                records,
                ..MemoryInner::default()
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, MemoryInner> {
        // A panicked test thread may leave the mutex poisoned; the data is
        // still coherent for whoever asks next.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a fault for the next call (FIFO across all call kinds).
    pub fn script_fault(&self, fault: Fault) {
        self.inner().faults.push_back(fault);
    }

    pub fn set_create_mode(&self, mode: CreateMode) {
        self.inner().create_mode = mode;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner().log.clone()
    }

    pub fn clear_calls(&self) {
        self.inner().log.clear();
    }

    /// Calls since the last `clear_calls`, excluding loads.
    pub fn writes(&self) -> Vec<StoreCall> {
        self.inner()
            .log
            .iter()
            .filter(|c| !matches!(c, StoreCall::Load))
            .cloned()
            .collect()
    }

    pub fn records(&self) -> StoreRecords {
        self.inner().records.clone()
    }

    /// Mutate records directly, bypassing the call log — the "someone else
    /// wrote to the store" lever for conflict tests.
    pub fn tamper(&self, f: impl FnOnce(&mut StoreRecords)) {
        f(&mut self.inner().records);
    }

    fn take_fault(inner: &mut MemoryInner) -> Option<Fault> {
        inner.faults.pop_front()
    }
}

impl Transport for MemoryStore {
    fn load(&self) -> Result<StoreRecords, TransportError> {
        let mut inner = self.inner();
        inner.log.push(StoreCall::Load);
        match Self::take_fault(&mut inner) {
            Some(Fault::Unavailable(msg)) => Err(TransportError::Unavailable(msg)),
            // A load has no write to refuse; a scripted reject degrades to
            // a transport failure so the script still fires.
            Some(Fault::Reject(msg)) => Err(TransportError::Unavailable(msg)),
            None => Ok(inner.records.clone()),
        }
    }

    fn create_card(
        &self,
        lane_id: &str,
        fields: CardFields,
    ) -> Result<CreateReply<CardRecord>, TransportError> {
        let mut inner = self.inner();
        inner.log.push(StoreCall::CreateCard {
            lane_id: lane_id.to_string(),
            fields: fields.clone(),
        });
        match Self::take_fault(&mut inner) {
            Some(Fault::Unavailable(msg)) => return Err(TransportError::Unavailable(msg)),
            Some(Fault::Reject(msg)) => return Ok(CreateReply::Rejected(msg)),
            None => {}
        }
        let mode = inner.create_mode;
        match inner.records.insert_card(lane_id, &fields) {
            Ok(record) => match mode {
                CreateMode::ReturnRecord => Ok(CreateReply::Created(record)),
                CreateMode::RequireRefetch => Ok(CreateReply::CreatedRefetch),
            },
            Err(reason) => Ok(CreateReply::Rejected(reason)),
        }
    }

    fn create_lane(
        &self,
        board_id: &str,
        fields: LaneFields,
    ) -> Result<CreateReply<LaneRecord>, TransportError> {
        let mut inner = self.inner();
        inner.log.push(StoreCall::CreateLane {
            board_id: board_id.to_string(),
            fields: fields.clone(),
        });
        match Self::take_fault(&mut inner) {
            Some(Fault::Unavailable(msg)) => return Err(TransportError::Unavailable(msg)),
            Some(Fault::Reject(msg)) => return Ok(CreateReply::Rejected(msg)),
            None => {}
        }
        let mode = inner.create_mode;
        match inner.records.insert_lane(board_id, &fields) {
            Ok(record) => match mode {
                CreateMode::ReturnRecord => Ok(CreateReply::Created(record)),
                CreateMode::RequireRefetch => Ok(CreateReply::CreatedRefetch),
            },
            Err(reason) => Ok(CreateReply::Rejected(reason)),
        }
    }

    fn update_many(&self, updates: Updates) -> Result<PushReply, TransportError> {
        let mut inner = self.inner();
        inner.log.push(StoreCall::Update(updates.clone()));
        match Self::take_fault(&mut inner) {
            Some(Fault::Unavailable(msg)) => return Err(TransportError::Unavailable(msg)),
            Some(Fault::Reject(msg)) => return Ok(PushReply::Rejected(msg)),
            None => {}
        }
        match inner.records.apply_updates(&updates) {
            Ok(()) => Ok(PushReply::Accepted),
            Err(reason) => Ok(PushReply::Rejected(reason)),
        }
    }

    fn delete(&self, kind: EntityKind, id: &str) -> Result<PushReply, TransportError> {
        let mut inner = self.inner();
        inner.log.push(StoreCall::Delete(kind, id.to_string()));
        match Self::take_fault(&mut inner) {
            Some(Fault::Unavailable(msg)) => return Err(TransportError::Unavailable(msg)),
            Some(Fault::Reject(msg)) => return Ok(PushReply::Rejected(msg)),
            None => {}
        }
        match inner.records.apply_delete(kind, id) {
            Ok(()) => Ok(PushReply::Accepted),
            Err(reason) => Ok(PushReply::Rejected(reason)),
        }
    }
}
