//! Capture run configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use paint_timeline::capture::CaptureConfig;
//!
//! let config = CaptureConfig::default()
//!     .with_viewport(1024, 768)
//!     .with_capture_timeout(Duration::from_secs(20));
//!
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

use super::model::Viewport;

// ============================================================================
// Constants
// ============================================================================

/// Default capture viewport width.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1200;

/// Default capture viewport height.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 800;

/// Trace categories recorded by default.
pub const DEFAULT_TRACE_CATEGORIES: &[&str] = &[
    "blink.user_timing",
    "devtools.timeline",
    "disabled-by-default-devtools.timeline",
];

/// Computed styles requested with every DOM snapshot.
pub const DEFAULT_COMPUTED_STYLES: &[&str] = &["font-size", "opacity", "z-index"];

/// Default upper bound for one page capture.
const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for the source reachability fetch.
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// CaptureConfig
// ============================================================================

/// Settings for one instrumented page load.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Viewport the page is rendered at.
    pub viewport: Viewport,
    /// Trace categories to record.
    pub trace_categories: Vec<String>,
    /// Computed styles requested per DOM snapshot.
    pub computed_styles: Vec<String>,
    /// Directory for the transient trace file.
    pub trace_dir: PathBuf,
    /// Upper bound on the wait for drain completion.
    pub capture_timeout: Duration,
    /// Timeout of the source reachability fetch.
    pub fetch_timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            trace_categories: DEFAULT_TRACE_CATEGORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            computed_styles: DEFAULT_COMPUTED_STYLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trace_dir: std::env::temp_dir(),
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

// ============================================================================
// CaptureConfig - Builder Methods
// ============================================================================

impl CaptureConfig {
    /// Creates the default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capture viewport.
    #[inline]
    #[must_use]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    /// Replaces the trace categories.
    #[must_use]
    pub fn with_trace_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trace_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the computed style whitelist.
    #[must_use]
    pub fn with_computed_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.computed_styles = styles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets where the transient trace file is written.
    #[inline]
    #[must_use]
    pub fn with_trace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trace_dir = dir.into();
        self
    }

    /// Sets the capture timeout.
    #[inline]
    #[must_use]
    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }

    /// Sets the source fetch timeout.
    #[inline]
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

// ============================================================================
// CaptureConfig - Validation
// ============================================================================

impl CaptureConfig {
    /// Checks the configuration for values a run cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::config(format!(
                "Viewport dimensions must be non-zero, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }

        if self.trace_categories.is_empty() {
            return Err(Error::config("At least one trace category is required"));
        }

        if self.capture_timeout.is_zero() {
            return Err(Error::config("Capture timeout must be greater than zero"));
        }

        if self.fetch_timeout.is_zero() {
            return Err(Error::config("Fetch timeout must be greater than zero"));
        }

        if self.trace_dir.as_os_str().is_empty() {
            return Err(Error::config("Trace directory must not be empty"));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
