//! Traversal strategies feeding scan passes.

use std::fs;
use std::iter;
use std::path::PathBuf;

use glob::Pattern;
use tracing::warn;
use walkdir::WalkDir;

use crate::event::FileRecord;

/// One file produced by a traversal.
#[derive(Debug, Clone)]
pub struct ScanEntry {
    /// Path of the file.
    pub path: PathBuf,

    /// Metadata observed during the pass.
    pub record: FileRecord,
}

/// A traversal strategy over the watch root.
///
/// Every call to [`Scanner::entries`] walks the filesystem afresh and
/// yields a finite, single-use sequence. Directories never appear in it,
/// and entries that cannot be read or statted mid-pass are skipped, so a
/// tree that shrinks during traversal shortens the sequence rather than
/// failing it.
pub trait Scanner: Send + Sync {
    /// Produce the entries of one scan pass.
    fn entries(&self) -> Box<dyn Iterator<Item = ScanEntry> + '_>;
}

/// Flat traversal: the root's immediate children, filtered by pattern.
///
/// Subdirectories are not descended into and never reported, even when
/// their names match. Stat calls follow symlinks, so a link to a file is
/// reported with its target's metadata.
pub struct GlobScanner {
    root: PathBuf,
    pattern: Pattern,
}

impl GlobScanner {
    /// Create a flat scanner over `root`.
    pub fn new(root: PathBuf, pattern: Pattern) -> Self {
        Self { root, pattern }
    }
}

impl Scanner for GlobScanner {
    fn entries(&self) -> Box<dyn Iterator<Item = ScanEntry> + '_> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read {}: {e}", self.root.display());
                return Box::new(iter::empty());
            }
        };

        Box::new(entries.filter_map(Result::ok).filter_map(|entry| {
            let name = entry.file_name();
            if !self.pattern.matches(name.to_str()?) {
                return None;
            }

            let path = entry.path();
            let metadata = fs::metadata(&path).ok()?;
            if metadata.is_dir() {
                return None;
            }

            Some(ScanEntry {
                path,
                record: FileRecord::from_metadata(&metadata),
            })
        }))
    }
}

/// Recursive traversal: every file in the subtree whose base name matches.
///
/// Directories are descended into regardless of the pattern but never
/// reported. Symlinks are not followed.
pub struct WalkScanner {
    root: PathBuf,
    pattern: Pattern,
}

impl WalkScanner {
    /// Create a recursive scanner over `root`.
    pub fn new(root: PathBuf, pattern: Pattern) -> Self {
        Self { root, pattern }
    }
}

impl Scanner for WalkScanner {
    fn entries(&self) -> Box<dyn Iterator<Item = ScanEntry> + '_> {
        Box::new(
            WalkDir::new(&self.root)
                .follow_links(false)
                .into_iter()
                .filter_map(Result::ok)
                .filter_map(|entry| {
                    if entry.file_type().is_dir() {
                        return None;
                    }
                    if !self.pattern.matches(entry.file_name().to_str()?) {
                        return None;
                    }

                    let metadata = entry.metadata().ok()?;
                    Some(ScanEntry {
                        record: FileRecord::from_metadata(&metadata),
                        path: entry.into_path(),
                    })
                }),
        )
    }
}
