//! Builder pattern for driver configuration.
//!
//! Provides a fluent API for configuring and creating [`Driver`] instances.
//!
//! # Example
//!
//! ```no_run
//! use paint_timeline::Driver;
//!
//! # fn example() -> paint_timeline::Result<()> {
//! let driver = Driver::builder()
//!     .binary("/usr/bin/google-chrome")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

use super::core::Driver;

// ============================================================================
// Constants
// ============================================================================

/// Default time to wait for the DevTools banner on stderr.
const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for configuring a [`Driver`] instance.
///
/// Use [`Driver::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct DriverBuilder {
    /// Path to the browser binary.
    binary: Option<PathBuf>,
    /// How long to wait for the DevTools endpoint.
    launch_timeout: Option<Duration>,
}

impl DriverBuilder {
    /// Creates a new driver builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path to the Chrome/Chromium binary executable.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the browser binary (e.g., "/usr/bin/chromium")
    #[inline]
    #[must_use]
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Sets how long to wait for the browser to expose its DevTools endpoint.
    #[inline]
    #[must_use]
    pub fn launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = Some(timeout);
        self
    }

    /// Builds the driver with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if binary not set or launch timeout is zero
    /// - [`Error::BrowserNotFound`] if binary path doesn't exist
    pub fn build(self) -> Result<Driver> {
        let binary = self.validate_binary()?;
        let launch_timeout = self.launch_timeout.unwrap_or(DEFAULT_LAUNCH_TIMEOUT);

        if launch_timeout.is_zero() {
            return Err(Error::config("Launch timeout must be greater than zero"));
        }

        Ok(Driver::new(binary, launch_timeout))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DriverBuilder {
    /// Validates the binary path configuration.
    fn validate_binary(&self) -> Result<PathBuf> {
        let binary = self.binary.clone().ok_or_else(|| {
            Error::config(
                "Browser binary path is required. Use .binary() to set it.\n\
                 Example: Driver::builder().binary(\"/usr/bin/chromium\")",
            )
        })?;

        if !binary.exists() {
            return Err(Error::browser_not_found(binary));
        }

        if !binary.is_file() {
            return Err(Error::config(format!(
                "Browser binary path is not a file: {}",
                binary.display()
            )));
        }

        Ok(binary)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_binary_fails() {
        let result = DriverBuilder::new().build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_build_with_missing_binary_fails() {
        let result = DriverBuilder::new()
            .binary("/definitely/not/a/browser")
            .build();
        assert!(matches!(result, Err(Error::BrowserNotFound { .. })));
    }

    #[test]
    fn test_build_with_directory_fails() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let result = DriverBuilder::new().binary(dir.path()).build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_zero_launch_timeout_rejected() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let result = DriverBuilder::new()
            .binary(file.path())
            .launch_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_build_with_existing_file() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let driver = DriverBuilder::new().binary(file.path()).build();
        assert!(driver.is_ok());
    }
}
