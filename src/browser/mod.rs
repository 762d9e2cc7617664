//! Browser entities module.
//!
//! This module provides the browser automation types:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Window`] | Browser instance (owns Chrome process + DevTools connection) |
//! | [`Tab`] | Page target attached as a flat session |
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

/// Page target automation.
pub mod tab;

/// Browser window management.
pub mod window;

// ============================================================================
// Re-exports
// ============================================================================

pub use tab::Tab;
pub use window::{Window, WindowBuilder};
