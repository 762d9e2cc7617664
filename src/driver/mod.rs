//! Browser driver module.
//!
//! This module provides the entry point for launching an instrumented
//! browser.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Factory for creating browser windows |
//! | [`DriverBuilder`] | Fluent configuration builder |
//! | [`ChromeOptions`] | Browser launch options |
//! | [`Profile`] | User data directory management |
//!
//! # Example
//!
//! ```no_run
//! use paint_timeline::{Driver, Result};
//!
//! # async fn example() -> Result<()> {
//! let driver = Driver::builder()
//!     .binary("/usr/bin/chromium")
//!     .build()?;
//!
//! let window = driver.window().headless().spawn().await?;
//! let tab = window.new_tab().await?;
//!
//! tab.goto("https://example.com").await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for driver configuration.
pub mod builder;

/// Core driver implementation.
pub mod core;

/// Chrome launch options.
pub mod options;

/// User data directory management.
pub mod profile;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DriverBuilder;
pub use core::Driver;
pub use options::ChromeOptions;
pub use profile::Profile;
