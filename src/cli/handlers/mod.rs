use std::error::Error;
use std::path::{Path, PathBuf};

use crate::api::{CardFields, EntityKind, FileStore, LaneFields, StoreRecords, Transport};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::load_config;
use crate::model::SortMode;
use crate::ops::check::{self, CheckError, CheckWarning};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let dir = resolve_dir(cli.dir.as_deref())?;
    match cli.command {
        Some(Commands::Seed(args)) => cmd_seed(&dir, &args, cli.json),
        Some(Commands::Check) => cmd_check(&dir, cli.json),
        Some(Commands::Boards) => cmd_boards(&dir, cli.json),
        None => Ok(()), // no subcommand launches the TUI from main
    }
}

/// Working directory for this invocation (`-C` or the process cwd).
pub fn resolve_dir(dir: Option<&str>) -> Result<PathBuf, Box<dyn Error>> {
    match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e).into()),
        None => std::env::current_dir().map_err(Into::into),
    }
}

fn open_store(dir: &Path) -> Result<FileStore, Box<dyn Error>> {
    let config = load_config(dir)?;
    Ok(FileStore::new(dir.join(&config.store.path)))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_seed(dir: &Path, args: &SeedArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let store = open_store(dir)?;
    if store.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        )
        .into());
    }
    let records = starter_records();
    store.save(&records)?;

    if json {
        let out = SeedJson {
            path: store.path().display().to_string(),
            boards: records.boards.len(),
            lanes: records.lanes.len(),
            cards: records.cards.len(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "seeded {} ({} board, {} lanes, {} cards)",
            store.path().display(),
            records.boards.len(),
            records.lanes.len(),
            records.cards.len()
        );
    }
    Ok(())
}

fn cmd_check(dir: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let store = open_store(dir)?;
    let records = store.load()?;
    let result = check::check_store(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for error in &result.errors {
            println!("error: {}", describe_error(error));
        }
        for warning in &result.warnings {
            println!("warning: {}", describe_warning(warning));
        }
        if result.valid && result.warnings.is_empty() {
            println!(
                "store ok ({} boards, {} lanes, {} cards)",
                records.boards.len(),
                records.lanes.len(),
                records.cards.len()
            );
        }
    }
    if !result.valid {
        return Err(format!("store failed validation ({} errors)", result.errors.len()).into());
    }
    Ok(())
}

fn cmd_boards(dir: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let store = open_store(dir)?;
    let records = store.load()?;
    let summaries = board_summaries(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    for board in &summaries {
        println!("{} ({})", board.name, board.id);
        for lane in &board.lanes {
            let mut counts = format!("{} cards", lane.cards);
            if lane.flagged > 0 {
                counts.push_str(&format!(", {} flagged", lane.flagged));
            }
            if lane.done > 0 {
                counts.push_str(&format!(", {} done", lane.done));
            }
            println!("  {} · {} · {}", lane.name, lane.sort_mode.label(), counts);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The document `dk seed` writes: one board, three lanes, a few cards to
/// drag around.
fn starter_records() -> StoreRecords {
    let mut records = StoreRecords::default();
    let board_id = records.allocate_id("b");
    records.boards.push(crate::api::BoardRecord {
        id: board_id.clone(),
        name: "Main".into(),
        sort_order: 0,
    });

    let lanes = [
        ("To do", SortMode::Hand),
        ("Doing", SortMode::Hand),
        ("Done", SortMode::Priority),
    ];
    let mut lane_ids = Vec::new();
    for (i, (name, mode)) in lanes.into_iter().enumerate() {
        let fields = LaneFields {
            name: name.into(),
            sort_mode: mode,
            sort_order: Some(i as i64),
        };
        if let Ok(record) = records.insert_lane(&board_id, &fields) {
            lane_ids.push(record.id);
        }
    }

    let cards = [
        ("Drag this card with the mouse", false),
        ("Flag a card with f", true),
        ("Toggle the lane's sort with s", false),
    ];
    if let Some(lane_id) = lane_ids.first() {
        for (i, (title, flagged)) in cards.into_iter().enumerate() {
            let _ = records.insert_card(
                lane_id,
                &CardFields {
                    title: title.into(),
                    flagged,
                    done: false,
                    sort_order: Some(i as i64),
                },
            );
        }
    }
    records
}

fn kind_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Card => "card",
        EntityKind::Lane => "lane",
        EntityKind::Board => "board",
    }
}

fn describe_error(error: &CheckError) -> String {
    match error {
        CheckError::DuplicateId { kind, id } => {
            format!("duplicate {} id '{}'", kind_name(*kind), id)
        }
        CheckError::EmptyId { kind } => format!("{} with an empty id", kind_name(*kind)),
        CheckError::DanglingLane { lane_id, board_id } => {
            format!("lane '{}' points at unknown board '{}'", lane_id, board_id)
        }
        CheckError::DanglingCard { card_id, lane_id } => {
            format!("card '{}' points at unknown lane '{}'", card_id, lane_id)
        }
    }
}

fn describe_warning(warning: &CheckWarning) -> String {
    match warning {
        CheckWarning::MissingCardOrder { lane_id, card_id } => {
            format!("card '{}' in hand lane '{}' has no sort order", card_id, lane_id)
        }
        CheckWarning::MissingLaneOrder { lane_id } => {
            format!("open lane '{}' has no sort order", lane_id)
        }
        CheckWarning::AmbiguousCardOrder { lane_id, sort_order } => {
            format!("lane '{}' has two cards at order {}", lane_id, sort_order)
        }
        CheckWarning::AmbiguousLaneOrder { board_id, sort_order } => {
            format!("board '{}' has two lanes at order {}", board_id, sort_order)
        }
        CheckWarning::SparseOrder { kind, host_id } => {
            if host_id.is_empty() {
                format!("{} orders are not contiguous from zero", kind_name(*kind))
            } else {
                format!(
                    "{} orders under '{}' are not contiguous from zero",
                    kind_name(*kind),
                    host_id
                )
            }
        }
        CheckWarning::ClosedLaneOrdered { lane_id } => {
            format!("closed lane '{}' still carries a sort order", lane_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_store_passes_validation() {
        let records = starter_records();
        let result = check::check_store(&records);
        assert!(result.valid, "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    }

    #[test]
    fn starter_store_builds_a_workspace_with_drafts() {
        let ws = starter_records().into_workspace();
        assert_eq!(ws.boards.len(), 1);
        let board = &ws.boards[0];
        assert_eq!(board.real_lane_count(), 3);
        assert!(board.lanes.last().is_some_and(|l| l.is_draft()));
        for lane in board.real_lanes() {
            assert!(lane.cards.last().is_some_and(|c| c.is_draft()));
        }
    }
}
