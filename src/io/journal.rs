use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::io::lock::StoreLock;

/// Maximum size of the journal before inline trimming (256 KB).
const MAX_JOURNAL_SIZE: u64 = 262_144;

/// Entries older than this are dropped by a trim.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Self-documenting header written at the top of a new journal.
const FILE_HEADER: &str = "\
<!-- deck journal — append-only failure log
     Every store write that failed or was refused lands here, together
     with conflict aborts and external reloads. The status row shows the
     live message; this file is the durable record.
     Safe to delete if empty or stale. -->

---
";

/// Why an entry was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalCategory {
    /// The store call never completed.
    Transport,
    /// The store completed the round trip and refused the write.
    Rejected,
    /// The model no longer matched what a commit assumed.
    Conflict,
    /// The store changed under us and was reloaded.
    Reload,
}

impl fmt::Display for JournalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalCategory::Transport => write!(f, "transport"),
            JournalCategory::Rejected => write!(f, "rejected"),
            JournalCategory::Conflict => write!(f, "conflict"),
            JournalCategory::Reload => write!(f, "reload"),
        }
    }
}

impl JournalCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "transport" => Some(JournalCategory::Transport),
            "rejected" => Some(JournalCategory::Rejected),
            "conflict" => Some(JournalCategory::Conflict),
            "reload" => Some(JournalCategory::Reload),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub category: JournalCategory,
    pub message: String,
}

/// Path of the journal next to the store.
pub fn journal_path(dir: &Path) -> PathBuf {
    dir.join(".deck.journal.md")
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Append an entry to the journal in `dir`. Errors are swallowed and printed
/// to stderr: a broken journal must never take the UI down with it.
pub fn append(dir: &Path, category: JournalCategory, message: &str) {
    if let Err(e) = append_inner(dir, category, message) {
        eprintln!("warning: could not write to journal: {}", e);
    }
}

fn append_inner(dir: &Path, category: JournalCategory, message: &str) -> io::Result<()> {
    let path = journal_path(dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_JOURNAL_SIZE
    {
        try_inline_trim(dir, &path);
    }

    let needs_header = !path.exists() || std::fs::metadata(&path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }

    let entry = format!(
        "## {} — {}: {}\n\n---\n",
        Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        category,
        message.replace('\n', " "),
    );
    file.write_all(entry.as_bytes())?;
    Ok(())
}

/// Drop entries past the prune age when the journal grows too large. Skips
/// silently when another process holds the store lock.
fn try_inline_trim(dir: &Path, path: &Path) {
    let Some(_lock) = StoreLock::try_exclusive(dir) else {
        return;
    };
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
    let trimmed = prune_before(&content, &cutoff);
    if trimmed.len() < content.len() {
        let _ = atomic_write(path, trimmed.as_bytes());
    }
}

/// Parse journal entries (header lines only; anything unparseable is kept
/// out of the result but never deleted by reads).
pub fn parse_entries(content: &str) -> Vec<JournalEntry> {
    let mut entries = Vec::new();
    for line in content.lines() {
        let Some(rest) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((stamp, rest)) = rest.split_once(" — ") else {
            continue;
        };
        let Some((category, message)) = rest.split_once(": ") else {
            continue;
        };
        let Ok(timestamp) = DateTime::parse_from_rfc3339(stamp) else {
            continue;
        };
        let Some(category) = JournalCategory::parse_category(category) else {
            continue;
        };
        entries.push(JournalEntry {
            timestamp: timestamp.with_timezone(&Utc),
            category,
            message: message.to_string(),
        });
    }
    entries
}

/// Read all entries from the journal in `dir`, oldest first.
pub fn read_entries(dir: &Path) -> Vec<JournalEntry> {
    match std::fs::read_to_string(journal_path(dir)) {
        Ok(content) => parse_entries(&content),
        Err(_) => Vec::new(),
    }
}

/// Rewrite `content`, keeping only entries at or after `cutoff`.
fn prune_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut out = String::from(FILE_HEADER);
    for entry in parse_entries(content) {
        if entry.timestamp >= *cutoff {
            out.push_str(&format!(
                "## {} — {}: {}\n\n---\n",
                entry
                    .timestamp
                    .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                entry.category,
                entry.message,
            ));
        }
    }
    out
}

/// Rewrite the journal in `dir`, dropping entries older than `age_days`.
pub fn prune(dir: &Path, age_days: i64) -> io::Result<usize> {
    let path = journal_path(dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let before = parse_entries(&content).len();
    let cutoff = Utc::now() - chrono::Duration::days(age_days);
    let trimmed = prune_before(&content, &cutoff);
    atomic_write(&path, trimmed.as_bytes())?;
    Ok(before - parse_entries(&trimmed).len())
}
