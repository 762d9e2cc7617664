//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable naming the Chrome binary.
pub const CHROME_BIN_ENV: &str = "CHROME_BIN";

/// Fallback Chrome binary.
pub const DEFAULT_CHROME_BINARY: &str = "/usr/bin/chromium";

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    pub chrome: PathBuf,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// The browser binary comes from `--chrome=PATH`, then `$CHROME_BIN`,
    /// then [`DEFAULT_CHROME_BINARY`].
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();

        let chrome = args
            .iter()
            .find_map(|a| a.strip_prefix("--chrome="))
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(CHROME_BIN_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CHROME_BINARY));

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            chrome,
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
///
/// Logs go to stderr so stdout stays free for replies.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "paint_timeline=debug"
    } else {
        "paint_timeline=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
