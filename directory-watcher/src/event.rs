//! Change events produced by directory scans.

use std::fmt;
use std::fs::Metadata;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata remembered for each tracked file.
///
/// Identity is the path; this record only captures what a scan observed
/// about the file at that path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Last modification time, when the filesystem reports one.
    pub modified: Option<DateTime<Utc>>,

    /// File size in bytes.
    pub size: u64,
}

impl FileRecord {
    /// Build a record from filesystem metadata.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            size: metadata.len(),
        }
    }

    /// Whether this record's modification time is strictly after `earlier`'s.
    ///
    /// Change detection rests on modification time alone: a tie, a
    /// regression, or a missing timestamp on either side all read as
    /// unchanged. Size is recorded but not consulted.
    pub fn modified_after(&self, earlier: &FileRecord) -> bool {
        match (self.modified, earlier.modified) {
            (Some(current), Some(previous)) => current > previous,
            _ => false,
        }
    }
}

/// What happened to a file between two scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The file appeared since the previous scan.
    Added,

    /// The file's modification time moved forward.
    Changed,

    /// The file stopped matching the watch, by removal or by rename.
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Added => "added",
            ChangeKind::Changed => "changed",
            ChangeKind::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// A single file change observed by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The kind of change.
    pub kind: ChangeKind,

    /// Path to the affected file.
    pub path: PathBuf,

    /// The observed record for `Added` and `Changed`, the last-known
    /// record for `Deleted`.
    pub record: FileRecord,
}

impl ChangeEvent {
    /// Create an event for a newly discovered file.
    pub fn added(path: impl Into<PathBuf>, record: FileRecord) -> Self {
        Self {
            kind: ChangeKind::Added,
            path: path.into(),
            record,
        }
    }

    /// Create an event for a modified file.
    pub fn changed(path: impl Into<PathBuf>, record: FileRecord) -> Self {
        Self {
            kind: ChangeKind::Changed,
            path: path.into(),
            record,
        }
    }

    /// Create an event for a vanished file.
    pub fn deleted(path: impl Into<PathBuf>, record: FileRecord) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            path: path.into(),
            record,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path.display())
    }
}

/// Everything one scan pass observed, tagged with the pass start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBatch {
    /// When the scan producing these events began.
    pub at: DateTime<Utc>,

    /// Observed changes in discovery order, deletions appended last.
    pub events: Vec<ChangeEvent>,
}

impl EventBatch {
    /// Create a batch from one scan's events.
    pub fn new(at: DateTime<Utc>, events: Vec<ChangeEvent>) -> Self {
        Self { at, events }
    }

    /// Whether the scan observed no changes.
    ///
    /// Empty batches never reach observers.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Iterate over the events.
    pub fn iter(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.events.iter()
    }
}
