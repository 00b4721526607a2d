use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::api::{CardRecord, LaneRecord, StoreRecords, Transport};
use crate::io::config_io::load_config;
use crate::io::journal::{self, JournalCategory};
use crate::io::state::{BoardUiState, UiState, read_ui_state, write_ui_state};
use crate::io::watcher::StoreWatcher;
use crate::model::{AppConfig, Board, TimingConfig, Workspace};
use crate::ops::sort;
use crate::sync::{
    CreateGuard, HostSnapshot, JobDone, JobResult, JobTag, SnapshotArena, StoreJob, SyncQueue,
};

use super::drag::{self, DragSession};
use super::input;
use super::layout::{HitMap, Region};
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Edit,
    Confirm,
    Filter,
}

/// What the open editor writes into on commit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    /// The draft card of `lane_id` (commit promotes it).
    DraftCard { lane_id: String },
    /// The draft lane of `board_id`.
    DraftLane { board_id: String },
    RenameCard { card_id: String },
    RenameLane { lane_id: String },
}

/// Pending y/n question.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteCard { card_id: String, title: String },
    CloseLane { lane_id: String, name: String },
}

/// Per-board cursor and scroll.
pub type BoardViewState = BoardUiState;

/// All TUI state.
pub struct App {
    pub ws: Workspace,
    /// Selected tab, tracked by id so reorders never move the selection.
    pub active_board: String,
    pub board_states: HashMap<String, BoardViewState>,
    pub mode: Mode,
    pub should_quit: bool,

    pub theme: Theme,
    pub timing: TimingConfig,
    pub show_key_hints: bool,
    /// Directory holding the store, journal, and state files.
    pub dir: PathBuf,

    pub sync: SyncQueue,
    pub snapshots: SnapshotArena,
    pub guard: CreateGuard,

    pub drag: Option<DragSession>,
    pub hit_map: HitMap,
    /// Pressed-but-not-yet-dragged region; a drag event turns it into a
    /// session, a release without one is a click.
    pub press: Option<Region>,

    pub status: Option<String>,
    pub error: Option<String>,

    pub edit_target: Option<EditTarget>,
    pub edit_buffer: String,
    /// Byte offset of the edit cursor.
    pub edit_cursor: usize,
    pub confirm: Option<ConfirmAction>,
    pub filter: Option<String>,
    pub filter_input: String,

    inputs_since_save: usize,
}

impl App {
    pub fn new(ws: Workspace, store: Arc<dyn Transport>, config: &AppConfig, dir: PathBuf) -> App {
        let active_board = ws.boards.first().map(|b| b.id.clone()).unwrap_or_default();
        App {
            ws,
            active_board,
            board_states: HashMap::new(),
            mode: Mode::Navigate,
            should_quit: false,
            theme: Theme::from_config(&config.ui),
            timing: config.timing.clone(),
            show_key_hints: config.ui.show_key_hints,
            dir,
            sync: SyncQueue::start(store),
            snapshots: SnapshotArena::default(),
            guard: CreateGuard::default(),
            drag: None,
            hit_map: HitMap::default(),
            press: None,
            status: None,
            error: None,
            edit_target: None,
            edit_buffer: String::new(),
            edit_cursor: 0,
            confirm: None,
            filter: None,
            filter_input: String::new(),
            inputs_since_save: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Board and cursor access
    // -----------------------------------------------------------------------

    pub fn current_board(&self) -> Option<&Board> {
        self.ws.board(&self.active_board)
    }

    pub fn board_state(&mut self) -> &mut BoardViewState {
        self.board_states
            .entry(self.active_board.clone())
            .or_default()
    }

    pub fn view_state(&self, board_id: &str) -> BoardViewState {
        self.board_states.get(board_id).cloned().unwrap_or_default()
    }

    /// Keep the cursor inside the board after any structural change.
    pub fn clamp_cursor(&mut self) {
        let Some(board) = self.ws.board(&self.active_board) else {
            return;
        };
        let lane_count = board.lanes.len();
        let lanes: Vec<usize> = board.lanes.iter().map(|l| l.cards.len()).collect();
        let state = self.board_state();
        if lane_count == 0 {
            state.cursor_lane = 0;
            state.cursor_card = 0;
            return;
        }
        state.cursor_lane = state.cursor_lane.min(lane_count - 1);
        let cards = lanes[state.cursor_lane];
        state.cursor_card = state.cursor_card.min(cards.saturating_sub(1));
    }

    pub fn switch_board(&mut self, board_id: &str) {
        if self.ws.board(board_id).is_some() {
            self.active_board = board_id.to_string();
            self.clamp_cursor();
        }
    }

    // -----------------------------------------------------------------------
    // Status and filter
    // -----------------------------------------------------------------------

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.error = None;
    }

    /// Surface a failure in the status row and journal it.
    pub fn report_error(&mut self, category: JournalCategory, message: &str) {
        journal::append(&self.dir, category, message);
        self.error = Some(message.to_string());
        self.status = None;
    }

    /// Committed filter as a case-insensitive regex; an invalid pattern
    /// degrades to a literal match.
    pub fn filter_re(&self) -> Option<Regex> {
        let q = self.filter.as_deref()?;
        if q.is_empty() {
            return None;
        }
        Regex::new(&format!("(?i){}", q))
            .ok()
            .or_else(|| Regex::new(&format!("(?i){}", regex::escape(q))).ok())
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Once per event-loop iteration: external changes, dwell switches,
    /// completed store calls.
    pub fn on_tick(&mut self, store_changed: bool) {
        if store_changed {
            if self.drag.is_some() {
                drag::cancel(self);
            }
            journal::append(&self.dir, JournalCategory::Reload, "store changed externally");
            self.set_status("store changed externally, reloading");
            self.sync.submit(JobTag::Reload, StoreJob::Load);
        }
        drag::tick(self);
        self.pump_sync();
    }

    pub fn pump_sync(&mut self) {
        for done in self.sync.poll() {
            self.handle_done(done);
        }
    }

    fn handle_done(&mut self, done: JobDone) {
        let JobDone { tag, result } = done;
        match (tag, result) {
            (JobTag::Persist(token), JobResult::Accepted) => {
                self.snapshots.discard(token);
            }
            (JobTag::Persist(token), JobResult::Rejected(reason)) => {
                self.snapshots.restore(token, &mut self.ws);
                self.clamp_cursor();
                self.report_error(JournalCategory::Rejected, &reason);
            }
            (JobTag::Persist(token), JobResult::Failed(reason)) => {
                self.snapshots.restore(token, &mut self.ws);
                self.clamp_cursor();
                self.report_error(JournalCategory::Transport, &reason);
            }

            (JobTag::CreateCard { lane_id }, JobResult::CardCreated(record)) => {
                self.finish_card_create(&lane_id, record);
            }
            (JobTag::CreateCard { lane_id }, JobResult::CreatedRefetch) => {
                // the guard entry stays open across the refetch
                self.sync.submit(JobTag::RefetchCard { lane_id }, StoreJob::Load);
            }
            (JobTag::CreateCard { lane_id }, JobResult::Rejected(reason)) => {
                self.guard.abort(&lane_id);
                self.report_error(JournalCategory::Rejected, &reason);
            }
            (JobTag::CreateCard { lane_id }, JobResult::Failed(reason)) => {
                self.guard.abort(&lane_id);
                self.report_error(JournalCategory::Transport, &reason);
            }

            (JobTag::CreateLane { board_id }, JobResult::LaneCreated(record)) => {
                self.finish_lane_create(&board_id, record);
            }
            (JobTag::CreateLane { board_id }, JobResult::CreatedRefetch) => {
                self.sync.submit(JobTag::RefetchLane { board_id }, StoreJob::Load);
            }
            (JobTag::CreateLane { board_id }, JobResult::Rejected(reason)) => {
                self.guard.abort(&board_id);
                self.report_error(JournalCategory::Rejected, &reason);
            }
            (JobTag::CreateLane { board_id }, JobResult::Failed(reason)) => {
                self.guard.abort(&board_id);
                self.report_error(JournalCategory::Transport, &reason);
            }

            (JobTag::RefetchCard { lane_id }, JobResult::Loaded(records)) => {
                self.resolve_card_refetch(&lane_id, records);
            }
            (JobTag::RefetchCard { lane_id }, JobResult::Failed(reason)) => {
                self.guard.abort(&lane_id);
                self.report_error(JournalCategory::Transport, &reason);
            }
            (JobTag::RefetchLane { board_id }, JobResult::Loaded(records)) => {
                self.resolve_lane_refetch(&board_id, records);
            }
            (JobTag::RefetchLane { board_id }, JobResult::Failed(reason)) => {
                self.guard.abort(&board_id);
                self.report_error(JournalCategory::Transport, &reason);
            }

            (JobTag::Reload, JobResult::Loaded(records)) => {
                self.apply_reload(records);
            }
            (JobTag::Reload, JobResult::Failed(reason)) => {
                self.report_error(JournalCategory::Transport, &reason);
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Create resolution
    // -----------------------------------------------------------------------

    /// The draft became a real card: stamp the id, flush anything toggled
    /// while the create was in flight as one follow-up update, and re-arm a
    /// fresh draft.
    fn finish_card_create(&mut self, lane_id: &str, record: CardRecord) {
        let queued = self.guard.resolve(lane_id);
        let follow_up;
        {
            let Some(lane) = self.ws.lane_mut(lane_id) else { return };
            let Some(at) = lane.draft_index() else { return };
            {
                let card = &mut lane.cards[at];
                card.id = Some(record.id.clone());
                card.sort_order = record.sort_order;
                for field in &queued {
                    field.apply(card);
                }
            }
            lane.ensure_draft_card();
            let mode = lane.sort_mode;
            sort::sort_cards(&mut lane.cards, mode);

            follow_up = CreateGuard::follow_up(&record.id, &queued).map(|patch| {
                // rollback target: the card as the store just confirmed it
                let cards = lane
                    .cards
                    .iter()
                    .map(|c| {
                        let mut c = c.clone();
                        if c.id.as_deref() == Some(&record.id) {
                            c.flagged = record.flagged;
                            c.done = record.done;
                        }
                        c
                    })
                    .collect();
                (patch, cards)
            });
        }
        if let Some((patch, cards)) = follow_up {
            let token = self.snapshots.capture(vec![HostSnapshot::LaneCards {
                lane_id: lane_id.to_string(),
                cards,
            }]);
            self.sync.submit(
                JobTag::Persist(token),
                StoreJob::Update(crate::api::Updates::Cards(vec![patch])),
            );
        }
    }

    fn finish_lane_create(&mut self, board_id: &str, record: LaneRecord) {
        self.guard.resolve(board_id);
        let Some(board) = self.ws.board_mut(board_id) else { return };
        let Some(at) = board.draft_lane_index() else { return };
        {
            let lane = &mut board.lanes[at];
            lane.id = Some(record.id.clone());
            lane.sort_mode = record.sort_mode;
            lane.sort_order = record.sort_order;
            lane.ensure_draft_card();
        }
        board.ensure_draft_lane();
        sort::sort_lanes(&mut board.lanes);
    }

    /// The store created the entity but withheld the record: the reload's
    /// fresh row is the one we do not know yet.
    fn resolve_card_refetch(&mut self, lane_id: &str, records: StoreRecords) {
        let record = records
            .cards
            .iter()
            .find(|c| c.lane_id == lane_id && self.ws.card(&c.id).is_none())
            .cloned();
        match record {
            Some(record) => self.finish_card_create(lane_id, record),
            None => {
                self.guard.abort(lane_id);
                self.report_error(
                    JournalCategory::Conflict,
                    "created card missing from reload",
                );
            }
        }
    }

    fn resolve_lane_refetch(&mut self, board_id: &str, records: StoreRecords) {
        let record = records
            .lanes
            .iter()
            .find(|l| l.board_id == board_id && !l.closed && self.ws.lane(&l.id).is_none())
            .cloned();
        match record {
            Some(record) => self.finish_lane_create(board_id, record),
            None => {
                self.guard.abort(board_id);
                self.report_error(
                    JournalCategory::Conflict,
                    "created lane missing from reload",
                );
            }
        }
    }

    /// Replace the model with a fresh load, keeping the selection where
    /// possible.
    fn apply_reload(&mut self, records: StoreRecords) {
        self.ws = records.into_workspace();
        if self.ws.board(&self.active_board).is_none() {
            self.active_board = self.ws.boards.first().map(|b| b.id.clone()).unwrap_or_default();
        }
        self.clamp_cursor();
    }

    // -----------------------------------------------------------------------
    // Persisted UI state
    // -----------------------------------------------------------------------

    pub fn restore_ui_state(&mut self) {
        let Some(state) = read_ui_state(&self.dir) else { return };
        if self.ws.board(&state.active_board).is_some() {
            self.active_board = state.active_board;
        }
        for (id, board_state) in state.boards {
            if self.ws.board(&id).is_some() {
                self.board_states.insert(id, board_state);
            }
        }
        self.clamp_cursor();
    }

    pub fn save_ui_state(&self) {
        let state = UiState {
            active_board: self.active_board.clone(),
            boards: self
                .ws
                .boards
                .iter()
                .filter_map(|b| Some((b.id.clone(), self.board_states.get(&b.id)?.clone())))
                .collect(),
        };
        if let Err(e) = write_ui_state(&self.dir, &state) {
            eprintln!("warning: could not save ui state: {}", e);
        }
    }

    /// Debounced state save, called after every handled input.
    pub fn note_input(&mut self) {
        self.inputs_since_save += 1;
        if self.inputs_since_save >= 5 {
            self.inputs_since_save = 0;
            self.save_ui_state();
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the TUI against the store in `dir`.
pub fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(dir)?;
    let store_path = dir.join(&config.store.path);
    let store: Arc<dyn Transport> = Arc::new(crate::api::FileStore::new(&store_path));
    let ws = store.load()?.into_workspace();
    let mut app = App::new(ws, store, &config, dir.to_path_buf());
    app.restore_ui_state();

    let watcher = StoreWatcher::start(&store_path).ok();

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    // put the terminal back together before the default panic output
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        default_hook(info);
    }));

    let result = event_loop(&mut terminal, &mut app, watcher.as_ref());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    app.save_ui_state();

    result.map_err(Into::into)
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> io::Result<()> {
    let tick = Duration::from_millis(app.timing.tick_ms.max(10));
    while !app.should_quit {
        terminal.draw(|frame| render::render(frame, app))?;
        if event::poll(tick)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                    app.note_input();
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }
        let store_changed = watcher.is_some_and(|w| w.poll());
        app.on_tick(store_changed);
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::testing::{pump_until, test_app};
    use super::*;
    use crate::api::{CreateMode, Fault, StoreCall, Updates};
    use crate::tui::drag::{DragPayload, DragSession, DwellSwitch};
    use crate::tui::input;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            input::handle_key(app, key(KeyCode::Char(c)));
        }
    }

    fn submit_new_card(app: &mut App, title: &str) {
        input::handle_key(app, key(KeyCode::Char('a')));
        type_text(app, title);
        input::handle_key(app, key(KeyCode::Enter));
    }

    #[test]
    fn create_resolution_flushes_in_flight_toggles_as_one_update() {
        let (mut app, store) = test_app();
        store.clear_calls();
        submit_new_card(&mut app, "errands");
        assert!(app.guard.is_busy("l1"));

        // flag the still-saving row: applies locally, queues behind the create
        input::handle_key(&mut app, key(KeyCode::Char('f')));
        // a second submit for the same lane is refused while the first is out
        submit_new_card(&mut app, "too soon");
        assert!(app.status.is_some());

        pump_until(&mut app, 2); // create, then the follow-up update
        let lane = app.ws.lane("l1").unwrap();
        let created = lane
            .real_cards()
            .find(|c| c.title == "errands")
            .expect("promoted card");
        assert!(created.id.is_some());
        assert!(created.flagged);
        assert!(lane.draft_index().is_some());
        assert!(!app.guard.is_busy("l1"));

        let writes = store.writes();
        let creates = writes
            .iter()
            .filter(|c| matches!(c, StoreCall::CreateCard { .. }))
            .count();
        assert_eq!(creates, 1);
        let Some(StoreCall::Update(Updates::Cards(patches))) = writes.last() else {
            panic!("expected a follow-up card update, got {:?}", writes.last());
        };
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].flagged, Some(true));
        let id = created.id.clone().unwrap();
        assert_eq!(store.records().card(&id).map(|c| c.flagged), Some(true));
        assert!(app.snapshots.is_empty());
    }

    #[test]
    fn refetch_mode_resolves_the_create_from_a_reload() {
        let (mut app, store) = test_app();
        store.set_create_mode(CreateMode::RequireRefetch);
        submit_new_card(&mut app, "groceries");

        pump_until(&mut app, 2); // create reply, then the refetch load
        let lane = app.ws.lane("l1").unwrap();
        let created = lane
            .real_cards()
            .find(|c| c.title == "groceries")
            .expect("promoted card");
        assert!(created.id.is_some());
        assert!(!app.guard.is_busy("l1"));
        assert!(lane.draft_index().is_some());
    }

    #[test]
    fn rejected_create_keeps_the_draft_and_frees_the_guard() {
        let (mut app, store) = test_app();
        store.script_fault(Fault::Reject("lane is gone".into()));
        submit_new_card(&mut app, "doomed");

        pump_until(&mut app, 1);
        assert!(!app.guard.is_busy("l1"));
        assert!(app.error.is_some());
        let lane = app.ws.lane("l1").unwrap();
        assert_eq!(lane.real_card_count(), 3);
        // the text survives for another attempt
        assert_eq!(lane.cards[lane.draft_index().unwrap()].title, "doomed");
    }

    #[test]
    fn due_dwell_switches_the_board_mid_drag() {
        let (mut app, _store) = test_app();
        let mut dwell = DwellSwitch::arm("b2");
        dwell.armed_at = Instant::now() - Duration::from_millis(600);
        app.drag = Some(DragSession {
            payload: DragPayload::Card {
                card_id: "a".into(),
                origin_lane: "l1".into(),
            },
            home_board: "b1".into(),
            insertion: None,
            adoption: None,
            swap_block: None,
            dwell: Some(dwell),
            prior_lanes: None,
        });

        drag::tick(&mut app);
        assert_eq!(app.active_board, "b2");
        let session = app.drag.as_ref().expect("drag survives the switch");
        assert!(session.dwell.is_none());
        assert!(session.insertion.is_none());
    }

    #[test]
    fn external_change_cancels_the_drag_and_reloads() {
        let (mut app, store) = test_app();
        app.drag = Some(DragSession {
            payload: DragPayload::Tab { board_id: "b2".into() },
            home_board: "b1".into(),
            insertion: None,
            adoption: None,
            swap_block: None,
            dwell: None,
            prior_lanes: None,
        });
        store.tamper(|r| r.cards.retain(|c| c.id != "a"));

        app.on_tick(true);
        assert!(app.drag.is_none());
        assert!(app.status.is_some());

        let deadline = Instant::now() + Duration::from_secs(2);
        while app.ws.card("a").is_some() {
            assert!(Instant::now() < deadline, "reload never landed");
            app.pump_sync();
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(app.ws.lane("l1").unwrap().real_card_count(), 2);
    }
}
