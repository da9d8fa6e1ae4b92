//! Last-known state of the watched directory.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::event::{ChangeEvent, ChangeKind, FileRecord};
use crate::scan::ScanEntry;

/// The watcher's memory of its last scan pass: one record per tracked file.
///
/// After [`Snapshot::reconcile`] returns, the snapshot holds exactly the
/// files the pass saw, so the next pass diffs against fresh state.
#[derive(Debug, Default)]
pub struct Snapshot {
    files: HashMap<PathBuf, FileRecord>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are tracked.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether `path` is currently tracked.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// The record tracked for `path`, if any.
    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.files.get(path)
    }

    /// Iterate over the tracked paths, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Fold one scan pass into the snapshot, returning the changes.
    ///
    /// Entries are consumed in discovery order. A path the snapshot does
    /// not know yields `Added`; a known path whose modification time moved
    /// strictly forward yields `Changed` and replaces the stored record;
    /// any other known path yields nothing and keeps its record. Tracked
    /// paths the pass never touched yield `Deleted`, carrying the
    /// last-known record, and leave the snapshot; those come after every
    /// added and changed event.
    pub fn reconcile(&mut self, entries: impl IntoIterator<Item = ScanEntry>) -> Vec<ChangeEvent> {
        let mut touched: HashSet<PathBuf> = HashSet::new();
        let mut events = Vec::new();

        for ScanEntry { path, record } in entries {
            touched.insert(path.clone());

            let kind = match self.files.get(&path) {
                None => Some(ChangeKind::Added),
                Some(stored) if record.modified_after(stored) => Some(ChangeKind::Changed),
                Some(_) => None,
            };

            if let Some(kind) = kind {
                events.push(ChangeEvent {
                    kind,
                    path: path.clone(),
                    record: record.clone(),
                });
                self.files.insert(path, record);
            }
        }

        let vanished: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|path| !touched.contains(*path))
            .cloned()
            .collect();
        for path in vanished {
            if let Some(record) = self.files.remove(&path) {
                events.push(ChangeEvent::deleted(path, record));
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::DateTime;

    fn record_at(secs: i64, size: u64) -> FileRecord {
        FileRecord {
            modified: Some(DateTime::from_timestamp(secs, 0).unwrap()),
            size,
        }
    }

    fn entry(path: &str, secs: i64) -> ScanEntry {
        ScanEntry {
            path: PathBuf::from(path),
            record: record_at(secs, 1),
        }
    }

    #[test]
    fn test_first_pass_adds_everything() {
        let mut snapshot = Snapshot::new();

        let events = snapshot.reconcile(vec![entry("/w/a.txt", 1), entry("/w/b.txt", 2)]);

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == ChangeKind::Added));
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains(Path::new("/w/a.txt")));
        assert!(snapshot.contains(Path::new("/w/b.txt")));
    }

    #[test]
    fn test_identical_pass_is_silent() {
        let mut snapshot = Snapshot::new();
        snapshot.reconcile(vec![entry("/w/a.txt", 1)]);

        let events = snapshot.reconcile(vec![entry("/w/a.txt", 1)]);

        assert!(events.is_empty());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_newer_mtime_yields_changed() {
        let mut snapshot = Snapshot::new();
        snapshot.reconcile(vec![entry("/w/a.txt", 1)]);

        let events = snapshot.reconcile(vec![entry("/w/a.txt", 2)]);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::Changed);
        assert_eq!(
            snapshot.get(Path::new("/w/a.txt")).unwrap().modified,
            DateTime::from_timestamp(2, 0),
        );
    }

    #[test]
    fn test_tie_and_regression_are_silent() {
        let mut snapshot = Snapshot::new();
        snapshot.reconcile(vec![entry("/w/a.txt", 5)]);

        assert!(snapshot.reconcile(vec![entry("/w/a.txt", 5)]).is_empty());
        assert!(snapshot.reconcile(vec![entry("/w/a.txt", 3)]).is_empty());

        // The stored record keeps the original timestamp.
        assert_eq!(
            snapshot.get(Path::new("/w/a.txt")).unwrap().modified,
            DateTime::from_timestamp(5, 0),
        );
    }

    #[test]
    fn test_vanished_path_yields_deleted_with_last_known_record() {
        let mut snapshot = Snapshot::new();
        snapshot.reconcile(vec![ScanEntry {
            path: PathBuf::from("/w/a.txt"),
            record: record_at(1, 7),
        }]);

        let events = snapshot.reconcile(Vec::new());

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::Deleted);
        assert_eq!(events[0].path, Path::new("/w/a.txt"));
        assert_eq!(events[0].record.size, 7);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_deletions_come_after_additions() {
        let mut snapshot = Snapshot::new();
        snapshot.reconcile(vec![entry("/w/old.txt", 1)]);

        let events = snapshot.reconcile(vec![entry("/w/new.txt", 2)]);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ChangeKind::Added);
        assert_eq!(events[0].path, Path::new("/w/new.txt"));
        assert_eq!(events[1].kind, ChangeKind::Deleted);
        assert_eq!(events[1].path, Path::new("/w/old.txt"));
    }

    #[test]
    fn test_missing_timestamps_never_read_as_changed() {
        let mut snapshot = Snapshot::new();
        snapshot.reconcile(vec![ScanEntry {
            path: PathBuf::from("/w/a.txt"),
            record: FileRecord {
                modified: None,
                size: 1,
            },
        }]);

        let events = snapshot.reconcile(vec![entry("/w/a.txt", 9)]);

        assert!(events.is_empty());
    }
}
