//! The polling watcher: lifecycle, scan loop and observer fan-out.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use glob::Pattern;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, RwLock, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::config::WatcherConfig;
use crate::error::{Result, WatchError};
use crate::event::EventBatch;
use crate::scan::{GlobScanner, Scanner, WalkScanner};
use crate::snapshot::Snapshot;

/// Buffer capacity of channels handed out by [`DirectoryWatcher::subscribe`].
pub const OBSERVER_BUFFER: usize = 64;

type ObserverList = Arc<RwLock<Vec<mpsc::Sender<EventBatch>>>>;

/// A watcher that polls one directory for file changes.
///
/// The watcher rescans its root on a fixed interval, diffs each pass
/// against the previous snapshot and fans the resulting [`EventBatch`] out
/// to every observer. Observers receive only non-empty batches, in
/// registration order, and delivery never blocks the scan loop.
///
/// Starting and stopping are idempotent, and the snapshot survives a stop,
/// so a restarted watcher reports whatever changed across the gap as a
/// single batch. Dropping the watcher stops the scan loop.
pub struct DirectoryWatcher {
    /// Root directory being watched.
    path: PathBuf,

    /// Options fixed when the watcher was built.
    config: WatcherConfig,

    /// Compiled file name pattern.
    pattern: Pattern,

    /// Last-known state, shared with the scan loop.
    snapshot: Arc<Mutex<Snapshot>>,

    /// Registered observers, in registration order.
    observers: ObserverList,

    /// Shutdown handle of the live scan loop; `Some` while running.
    shutdown: Option<watch::Sender<bool>>,
}

impl DirectoryWatcher {
    /// Create a watcher over `path` with the default configuration.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(path, WatcherConfig::default())
    }

    /// Create a watcher over `path` with `config`.
    ///
    /// Fails without side effects when the configuration does not
    /// validate, the path cannot be statted, or the path is not a
    /// directory.
    pub fn with_config(path: impl Into<PathBuf>, config: WatcherConfig) -> Result<Self> {
        let path = path.into();
        let pattern = config.validate()?;

        let metadata = std::fs::metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WatchError::PathNotFound(path.display().to_string())
            } else {
                WatchError::Io(e)
            }
        })?;
        if !metadata.is_dir() {
            return Err(WatchError::NotADirectory(path.display().to_string()));
        }

        Ok(Self {
            path,
            config,
            pattern,
            snapshot: Arc::new(Mutex::new(Snapshot::new())),
            observers: Arc::new(RwLock::new(Vec::new())),
            shutdown: None,
        })
    }

    /// The watched root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The watcher's configuration.
    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Register a caller-owned delivery channel.
    ///
    /// Delivery is a non-blocking send: an observer whose channel is full
    /// loses that batch, and an observer whose receiver was dropped is
    /// removed on the next delivery attempt.
    pub async fn add_observer(&self, observer: mpsc::Sender<EventBatch>) {
        self.observers.write().await.push(observer);
    }

    /// Create, register and return a fresh observer channel.
    ///
    /// The channel buffers up to [`OBSERVER_BUFFER`] batches. To
    /// unsubscribe, drop the receiver.
    pub async fn subscribe(&self) -> mpsc::Receiver<EventBatch> {
        let (tx, rx) = mpsc::channel(OBSERVER_BUFFER);
        self.add_observer(tx).await;
        rx
    }

    /// Start the scan loop. A no-op when already running.
    ///
    /// The loop scans once immediately, then once per interval. The first
    /// pass reports every matching file as added unless `preload` is set,
    /// in which case it only primes the snapshot. The traversal strategy
    /// is chosen here from `recursive`.
    ///
    /// Must be called from within a Tokio runtime; returns without
    /// blocking.
    pub fn start(&mut self) {
        if self.shutdown.is_some() {
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown = Some(shutdown_tx);

        let scanner: Box<dyn Scanner> = if self.config.recursive {
            Box::new(WalkScanner::new(self.path.clone(), self.pattern.clone()))
        } else {
            Box::new(GlobScanner::new(self.path.clone(), self.pattern.clone()))
        };

        info!(
            "Starting watcher for {} (pattern {}, recursive {}, every {:?})",
            self.path.display(),
            self.config.pattern,
            self.config.recursive,
            self.config.interval
        );

        tokio::spawn(run_loop(
            scanner,
            self.snapshot.clone(),
            self.observers.clone(),
            self.config.interval,
            self.config.preload,
            shutdown_rx,
        ));
    }

    /// Stop the scan loop. A no-op when idle.
    ///
    /// A pass already in flight finishes, including delivery; no further
    /// ticks fire. The snapshot is kept, so a later [`DirectoryWatcher::start`]
    /// picks up from the state seen last.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
            info!("Stopping watcher for {}", self.path.display());
        }
    }

    /// Whether the scan loop is running.
    pub fn running(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Counters describing the watcher's current state.
    pub async fn stats(&self) -> WatcherStats {
        WatcherStats {
            tracked_files: self.snapshot.lock().await.len(),
            observers: self.observers.read().await.len(),
            running: self.running(),
        }
    }
}

/// Counters describing a watcher's current state.
#[derive(Debug, Clone)]
pub struct WatcherStats {
    /// Files currently tracked in the snapshot.
    pub tracked_files: usize,

    /// Registered observers.
    pub observers: usize,

    /// Whether the scan loop is running.
    pub running: bool,
}

/// The scan loop: one immediate pass, then one per interval tick.
async fn run_loop(
    scanner: Box<dyn Scanner>,
    snapshot: Arc<Mutex<Snapshot>>,
    observers: ObserverList,
    interval: Duration,
    preload: bool,
    mut shutdown: watch::Receiver<bool>,
) {
    // The first pass establishes the baseline. With preload its events are
    // discarded after priming the snapshot; otherwise they are delivered
    // like any other pass.
    let batch = scan_pass(scanner.as_ref(), &snapshot).await;
    if preload {
        debug!("Preload scan suppressed {} events", batch.len());
    } else {
        deliver(&observers, batch).await;
    }

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let batch = scan_pass(scanner.as_ref(), &snapshot).await;
                deliver(&observers, batch).await;
            }
            changed = shutdown.changed() => {
                // Err means the watcher itself is gone; both mean stop.
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    debug!("Scan loop exited");
}

/// Run one pass: traverse, diff against the snapshot, stamp the batch.
async fn scan_pass(scanner: &dyn Scanner, snapshot: &Mutex<Snapshot>) -> EventBatch {
    let at = Utc::now();
    let events = snapshot.lock().await.reconcile(scanner.entries());

    if !events.is_empty() {
        debug!("Scan found {} changes", events.len());
    }

    EventBatch::new(at, events)
}

/// Deliver a batch to every observer, in registration order.
///
/// Empty batches are skipped. Sends never block the loop: a full channel
/// costs its observer this batch, a closed channel removes the observer.
async fn deliver(observers: &ObserverList, batch: EventBatch) {
    if batch.is_empty() {
        return;
    }

    let mut observers = observers.write().await;
    observers.retain(|observer| match observer.try_send(batch.clone()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!("Observer falling behind, dropping batch of {} events", batch.len());
            true
        }
        Err(TrySendError::Closed(_)) => {
            debug!("Observer receiver dropped, removing it");
            false
        }
    });
}
