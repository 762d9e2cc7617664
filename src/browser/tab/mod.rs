//! Page target automation.
//!
//! Each [`Tab`] is one page target attached in flat session mode.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Tab struct, accessors, event subscription |
//! | `navigation` | Page enable, navigation, close |
//! | `emulation` | Viewport override |
//! | `capture` | DOM snapshots, layer snapshots and command logs |
//! | `trace` | Trace start/stop into a file |
//!
//! # Example
//!
//! ```ignore
//! let tab = window.new_tab().await?;
//!
//! tab.enable_page().await?;
//! tab.enable_capture_domains().await?;
//! tab.set_viewport(1200, 800).await?;
//! tab.start_tracing(&categories).await?;
//!
//! tab.goto("https://example.com").await?;
//!
//! tab.stop_tracing(Path::new("/tmp/trace.json")).await?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod capture;
mod core;
mod emulation;
mod navigation;
mod trace;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::Tab;
