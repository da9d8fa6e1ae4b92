//! Configuration types for the directory watcher.

use std::time::Duration;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WatchError};

/// Default polling interval between scan passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Default file name pattern, matching every name.
pub const DEFAULT_PATTERN: &str = "*";

/// Configuration for a directory watcher.
///
/// All options are fixed when the watcher is built; there is no way to
/// reconfigure a live watcher other than building a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Polling interval between scan passes.
    pub interval: Duration,

    /// Walk the whole subtree instead of listing the root's children.
    pub recursive: bool,

    /// Shell glob (`*`, `?`, `[...]`) applied to file names.
    pub pattern: String,

    /// Treat the first scan as a baseline: prime the snapshot without
    /// delivering its events.
    pub preload: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            recursive: false,
            pattern: DEFAULT_PATTERN.to_string(),
            preload: false,
        }
    }
}

impl WatcherConfig {
    /// Create a configuration with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the file name pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Walk the whole subtree under the root.
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Suppress delivery of the first scan's events.
    pub fn preload(mut self) -> Self {
        self.preload = true;
        self
    }

    /// Validate the configuration and compile its pattern.
    ///
    /// Rejects a zero interval and a pattern that does not compile.
    pub fn validate(&self) -> Result<Pattern> {
        if self.interval.is_zero() {
            return Err(WatchError::Config(
                "interval must be greater than zero".to_string(),
            ));
        }

        Pattern::new(&self.pattern).map_err(|source| WatchError::InvalidPattern {
            pattern: self.pattern.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = WatcherConfig::new();

        assert_eq!(config.interval, Duration::from_millis(2000));
        assert_eq!(config.pattern, "*");
        assert!(!config.recursive);
        assert!(!config.preload);
    }

    #[test]
    fn test_builder_sets_options() {
        let config = WatcherConfig::new()
            .with_interval(Duration::from_millis(250))
            .with_pattern("*.txt")
            .recursive()
            .preload();

        assert_eq!(config.interval, Duration::from_millis(250));
        assert_eq!(config.pattern, "*.txt");
        assert!(config.recursive);
        assert!(config.preload);
    }

    #[test]
    fn test_validate_compiles_pattern() {
        let pattern = WatcherConfig::new().with_pattern("*.rs").validate().unwrap();

        assert!(pattern.matches("main.rs"));
        assert!(!pattern.matches("main.go"));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let result = WatcherConfig::new()
            .with_interval(Duration::ZERO)
            .validate();

        assert!(matches!(result, Err(WatchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_malformed_pattern() {
        let result = WatcherConfig::new().with_pattern("[").validate();

        match result {
            Err(WatchError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "["),
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }
}
