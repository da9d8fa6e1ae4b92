//! # Directory Watcher
//!
//! This crate provides polling-based change notification for a directory.
//! A watcher rescans its root on a fixed interval, diffs each pass against
//! the previous snapshot and fans batches of added/changed/deleted events
//! out to every subscriber. There is no OS notification integration; a
//! deliberate full rescan per tick behaves the same on every platform and
//! filesystem, at the cost of change latency up to one interval.
//!
//! ## Features
//!
//! - **Two traversal strategies**: a flat glob over the root's children,
//!   or a full recursive walk, chosen when the watcher starts
//! - **Snapshot diffing**: added/changed/deleted detection keyed on path
//!   and modification time
//! - **Observer fan-out**: non-blocking delivery to any number of
//!   subscriber channels
//! - **Idempotent lifecycle**: start, stop and restart freely, with the
//!   snapshot kept across gaps
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use lookout_directory_watcher::{DirectoryWatcher, WatcherConfig};
//!
//! # async fn demo() -> lookout_directory_watcher::Result<()> {
//! let config = WatcherConfig::new()
//!     .with_interval(Duration::from_millis(500))
//!     .with_pattern("*.txt");
//! let mut watcher = DirectoryWatcher::with_config("/some/dir", config)?;
//!
//! let mut batches = watcher.subscribe().await;
//! watcher.start();
//!
//! while let Some(batch) = batches.recv().await {
//!     for event in batch.iter() {
//!         println!("{event}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod scan;
pub mod snapshot;
pub mod watcher;

pub use config::{DEFAULT_INTERVAL, DEFAULT_PATTERN, WatcherConfig};
pub use error::{Result, WatchError};
pub use event::{ChangeEvent, ChangeKind, EventBatch, FileRecord};
pub use scan::{GlobScanner, ScanEntry, Scanner, WalkScanner};
pub use snapshot::Snapshot;
pub use watcher::{DirectoryWatcher, OBSERVER_BUFFER, WatcherStats};
