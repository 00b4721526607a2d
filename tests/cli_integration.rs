//! Integration tests for the `dk` CLI.
//!
//! Each test works in a temp directory, runs `dk` as a subprocess, and
//! verifies stdout and/or the store document on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Path to the built `dk` binary (cargo test builds it next to the test
/// binary's parent directory).
fn dk_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // test binary name
    path.pop(); // deps/
    path.push("dk");
    path
}

/// Run `dk` with the given args in the given directory, returning
/// (stdout, stderr, success).
fn run_dk(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(dk_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run dk");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `dk` expecting success, return stdout.
fn run_dk_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_dk(dir, args);
    if !success {
        panic!(
            "dk {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

// ---------------------------------------------------------------------------
// seed
// ---------------------------------------------------------------------------

#[test]
fn seed_writes_a_store_document() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = run_dk_ok(tmp.path(), &["seed"]);
    assert!(out.contains("seeded"));
    assert!(tmp.path().join("deck.json").exists());

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("deck.json")).unwrap()).unwrap();
    assert_eq!(doc["boards"].as_array().unwrap().len(), 1);
    assert_eq!(doc["lanes"].as_array().unwrap().len(), 3);
    assert!(!doc["cards"].as_array().unwrap().is_empty());
}

#[test]
fn seed_json_reports_counts() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = run_dk_ok(tmp.path(), &["seed", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["boards"], 1);
    assert_eq!(parsed["lanes"], 3);
    assert!(parsed["path"].as_str().unwrap().ends_with("deck.json"));
}

#[test]
fn seed_refuses_an_existing_store() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_dk_ok(tmp.path(), &["seed"]);

    let (_stdout, stderr, success) = run_dk(tmp.path(), &["seed"]);
    assert!(!success);
    assert!(stderr.contains("--force"));
}

#[test]
fn seed_force_overwrites() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_dk_ok(tmp.path(), &["seed"]);
    fs::write(tmp.path().join("deck.json"), "{ mangled").unwrap();

    run_dk_ok(tmp.path(), &["seed", "--force"]);
    run_dk_ok(tmp.path(), &["check"]);
}

#[test]
fn seed_honors_the_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    let cwd = tempfile::TempDir::new().unwrap();

    run_dk_ok(cwd.path(), &["seed", "-C", tmp.path().to_str().unwrap()]);
    assert!(tmp.path().join("deck.json").exists());
    assert!(!cwd.path().join("deck.json").exists());
}

#[test]
fn seed_honors_the_configured_store_path() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("deck.toml"), "[store]\npath = \"boards.json\"\n").unwrap();

    run_dk_ok(tmp.path(), &["seed"]);
    assert!(tmp.path().join("boards.json").exists());
    assert!(!tmp.path().join("deck.json").exists());
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_on_a_seeded_store() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_dk_ok(tmp.path(), &["seed"]);

    let out = run_dk_ok(tmp.path(), &["check"]);
    assert!(out.contains("store ok"));
}

#[test]
fn check_json_reports_valid() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_dk_ok(tmp.path(), &["seed"]);

    let out = run_dk_ok(tmp.path(), &["check", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["valid"], true);
    assert!(parsed["errors"].as_array().unwrap().is_empty());
}

#[test]
fn check_fails_on_a_dangling_card() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("deck.json"),
        r#"{
  "boards": [{ "id": "b1", "name": "Work", "sort_order": 0 }],
  "lanes": [],
  "cards": [{ "id": "c1", "lane_id": "ghost", "title": "lost" }],
  "next_id": 5
}"#,
    )
    .unwrap();

    let (stdout, stderr, success) = run_dk(tmp.path(), &["check"]);
    assert!(!success);
    assert!(stdout.contains("unknown lane 'ghost'"));
    assert!(stderr.contains("failed validation"));
}

#[test]
fn check_warns_without_failing() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("deck.json"),
        r#"{
  "boards": [{ "id": "b1", "name": "Work", "sort_order": 0 }],
  "lanes": [{ "id": "l1", "board_id": "b1", "name": "Backlog" }],
  "cards": [],
  "next_id": 5
}"#,
    )
    .unwrap();

    let out = run_dk_ok(tmp.path(), &["check"]);
    assert!(out.contains("warning:"));
}

#[test]
fn check_on_a_missing_store_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_stdout, stderr, success) = run_dk(tmp.path(), &["check"]);
    assert!(!success);
    assert!(stderr.contains("dk seed"));
}

// ---------------------------------------------------------------------------
// boards
// ---------------------------------------------------------------------------

#[test]
fn boards_summarizes_the_store() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_dk_ok(tmp.path(), &["seed"]);

    let out = run_dk_ok(tmp.path(), &["boards"]);
    assert!(out.contains("Main"));
    assert!(out.contains("To do"));
    assert!(out.contains("Doing"));
    assert!(out.contains("priority"));
}

#[test]
fn boards_json_carries_per_lane_counts() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_dk_ok(tmp.path(), &["seed"]);

    let out = run_dk_ok(tmp.path(), &["boards", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let boards = parsed.as_array().unwrap();
    assert_eq!(boards.len(), 1);
    let lanes = boards[0]["lanes"].as_array().unwrap();
    assert_eq!(lanes.len(), 3);
    assert_eq!(lanes[0]["name"], "To do");
    assert_eq!(lanes[0]["cards"].as_u64().unwrap(), 3);
    assert_eq!(lanes[0]["flagged"].as_u64().unwrap(), 1);
}

#[test]
fn boards_skips_closed_lanes() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("deck.json"),
        r#"{
  "boards": [{ "id": "b1", "name": "Work", "sort_order": 0 }],
  "lanes": [
    { "id": "l1", "board_id": "b1", "name": "Open", "sort_order": 0 },
    { "id": "l2", "board_id": "b1", "name": "Archived", "closed": true }
  ],
  "cards": [],
  "next_id": 5
}"#,
    )
    .unwrap();

    let out = run_dk_ok(tmp.path(), &["boards"]);
    assert!(out.contains("Open"));
    assert!(!out.contains("Archived"));
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[test]
fn help_lists_the_subcommands() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_dk_ok(tmp.path(), &["--help"]);
    assert!(out.contains("deck"));
    assert!(out.contains("seed"));
    assert!(out.contains("check"));
    assert!(out.contains("boards"));
}
