use std::cell::Cell;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use crate::api::{
    CardFields, CardRecord, CreateReply, EntityKind, LaneFields, LaneRecord, PushReply,
    StoreRecords, Transport, Updates,
};
use crate::sync::snapshot::SnapshotToken;

/// A store call to run on the worker thread.
#[derive(Debug, Clone)]
pub enum StoreJob {
    Update(Updates),
    CreateCard { lane_id: String, fields: CardFields },
    CreateLane { board_id: String, fields: LaneFields },
    Delete(EntityKind, String),
    Load,
}

/// How the app reacts when the job completes. Attached at submit time and
/// handed back unchanged with the result.
#[derive(Debug, Clone, PartialEq)]
pub enum JobTag {
    /// An optimistic mutation was already applied; the token rolls it back
    /// on failure and is discarded on success.
    Persist(SnapshotToken),
    /// Draft card promotion into `lane_id` (guard entry open until resolved).
    CreateCard { lane_id: String },
    /// Draft lane promotion into `board_id`.
    CreateLane { board_id: String },
    /// Reload issued after a `CreatedRefetch`; the new record is resolved
    /// against this host.
    RefetchCard { lane_id: String },
    RefetchLane { board_id: String },
    /// Plain reload (startup or external change).
    Reload,
}

/// Worker-side outcome, delivered through [`SyncQueue::poll`].
#[derive(Debug)]
pub enum JobResult {
    Accepted,
    /// Completed round trip, store refused the write.
    Rejected(String),
    /// The round trip never completed.
    Failed(String),
    CardCreated(CardRecord),
    LaneCreated(LaneRecord),
    /// Created, but the record must be learned from a reload.
    CreatedRefetch,
    Loaded(StoreRecords),
}

#[derive(Debug)]
pub struct JobDone {
    pub tag: JobTag,
    pub result: JobResult,
}

/// Background store worker.
///
/// Store calls run on one worker thread; completions queue on a channel the
/// UI thread drains once per tick, the same poll-don't-block shape as the
/// file watcher. The optimistic mutation is applied before submit, so the
/// UI never waits on a call.
pub struct SyncQueue {
    tx: mpsc::Sender<(JobTag, StoreJob)>,
    rx: mpsc::Receiver<JobDone>,
    in_flight: Cell<usize>,
}

impl SyncQueue {
    pub fn start(store: Arc<dyn Transport>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<(JobTag, StoreJob)>();
        let (done_tx, done_rx) = mpsc::channel::<JobDone>();

        thread::spawn(move || {
            while let Ok((tag, job)) = job_rx.recv() {
                let result = run_job(store.as_ref(), job);
                if done_tx.send(JobDone { tag, result }).is_err() {
                    break;
                }
            }
        });

        SyncQueue {
            tx: job_tx,
            rx: done_rx,
            in_flight: Cell::new(0),
        }
    }

    pub fn submit(&self, tag: JobTag, job: StoreJob) {
        self.in_flight.set(self.in_flight.get() + 1);
        // A send failure means the worker is gone; the completion will
        // surface as a permanently pending job, which poll() never blocks on.
        let _ = self.tx.send((tag, job));
    }

    /// Non-blocking drain of completed jobs.
    pub fn poll(&self) -> Vec<JobDone> {
        let mut done = Vec::new();
        while let Ok(d) = self.rx.try_recv() {
            done.push(d);
        }
        self.in_flight
            .set(self.in_flight.get().saturating_sub(done.len()));
        done
    }

    /// Jobs submitted but not yet drained.
    pub fn pending(&self) -> usize {
        self.in_flight.get()
    }
}

fn run_job(store: &dyn Transport, job: StoreJob) -> JobResult {
    match job {
        StoreJob::Update(updates) => match store.update_many(updates) {
            Ok(PushReply::Accepted) => JobResult::Accepted,
            Ok(PushReply::Rejected(reason)) => JobResult::Rejected(reason),
            Err(e) => JobResult::Failed(e.to_string()),
        },
        StoreJob::CreateCard { lane_id, fields } => {
            match store.create_card(&lane_id, fields) {
                Ok(CreateReply::Created(record)) => JobResult::CardCreated(record),
                Ok(CreateReply::CreatedRefetch) => JobResult::CreatedRefetch,
                Ok(CreateReply::Rejected(reason)) => JobResult::Rejected(reason),
                Err(e) => JobResult::Failed(e.to_string()),
            }
        }
        StoreJob::CreateLane { board_id, fields } => {
            match store.create_lane(&board_id, fields) {
                Ok(CreateReply::Created(record)) => JobResult::LaneCreated(record),
                Ok(CreateReply::CreatedRefetch) => JobResult::CreatedRefetch,
                Ok(CreateReply::Rejected(reason)) => JobResult::Rejected(reason),
                Err(e) => JobResult::Failed(e.to_string()),
            }
        }
        StoreJob::Delete(kind, id) => match store.delete(kind, &id) {
            Ok(PushReply::Accepted) => JobResult::Accepted,
            Ok(PushReply::Rejected(reason)) => JobResult::Rejected(reason),
            Err(e) => JobResult::Failed(e.to_string()),
        },
        StoreJob::Load => match store.load() {
            Ok(records) => JobResult::Loaded(records),
            Err(e) => JobResult::Failed(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BoardPatch, BoardRecord, Fault, MemoryStore};
    use std::time::{Duration, Instant};

    fn drain(queue: &SyncQueue, expected: usize) -> Vec<JobDone> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut done = Vec::new();
        while done.len() < expected {
            done.extend(queue.poll());
            if Instant::now() > deadline {
                panic!("worker did not complete {} jobs", expected);
            }
            thread::sleep(Duration::from_millis(1));
        }
        done
    }

    fn seeded() -> Arc<MemoryStore> {
        let mut records = StoreRecords::default();
        records.boards.push(BoardRecord {
            id: "b1".into(),
            name: "Work".into(),
            sort_order: 0,
        });
        Arc::new(MemoryStore::seeded(records))
    }

    #[test]
    fn update_completes_off_thread() {
        let store = seeded();
        let queue = SyncQueue::start(store.clone());
        queue.submit(
            JobTag::Reload,
            StoreJob::Update(Updates::Boards(vec![BoardPatch::order("b1", 3)])),
        );
        assert_eq!(queue.pending(), 1);

        let done = drain(&queue, 1);
        assert!(matches!(done[0].result, JobResult::Accepted));
        assert_eq!(queue.pending(), 0);
        assert_eq!(store.records().board("b1").unwrap().sort_order, 3);
    }

    #[test]
    fn transport_failure_comes_back_as_failed() {
        let store = seeded();
        store.script_fault(Fault::Unavailable("link down".into()));
        let queue = SyncQueue::start(store);
        queue.submit(JobTag::Reload, StoreJob::Load);
        let done = drain(&queue, 1);
        assert!(matches!(&done[0].result, JobResult::Failed(msg) if msg.contains("link down")));
    }

    #[test]
    fn results_keep_their_tags() {
        let store = seeded();
        let queue = SyncQueue::start(store);
        queue.submit(JobTag::Reload, StoreJob::Load);
        queue.submit(
            JobTag::Persist(crate::sync::SnapshotArena::default().capture(vec![])),
            StoreJob::Update(Updates::Boards(vec![])),
        );
        let done = drain(&queue, 2);
        // jobs run in submission order on the single worker
        assert_eq!(done[0].tag, JobTag::Reload);
        assert!(matches!(done[0].result, JobResult::Loaded(_)));
        assert!(matches!(done[1].tag, JobTag::Persist(_)));
    }
}
