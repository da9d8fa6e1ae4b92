//! Watch a directory and print every change batch.
//!
//! Usage: cargo run -p lookout-directory-watcher --example watch -- [path]

use std::time::Duration;

use lookout_directory_watcher::{DirectoryWatcher, WatcherConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logs
    tracing_subscriber::fmt::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());

    let config = WatcherConfig::new()
        .with_interval(Duration::from_millis(500))
        .recursive()
        .preload();
    let mut watcher = DirectoryWatcher::with_config(&path, config)?;

    let mut batches = watcher.subscribe().await;
    watcher.start();

    println!("Watching {path} for changes, Ctrl-C to quit");
    while let Some(batch) = batches.recv().await {
        println!("{} changes at {}", batch.len(), batch.at.to_rfc3339());
        for event in batch.iter() {
            println!("  {event}");
        }
    }

    Ok(())
}
