//! Raw capture of one page load.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | [`CaptureConfig`] and defaults |
//! | `model` | Capture records and paint area types |
//! | `drain` | [`DrainCoordinator`] completion gate |
//! | `session` | [`CaptureSession`] per-run accumulators |
//! | `source` | [`CaptureSource`] seam and its DevTools implementation |
//! | `recorder` | [`record`] drives a page load end to end |
//!
//! # Example
//!
//! ```no_run
//! use paint_timeline::capture::{self, CaptureConfig};
//!
//! # async fn example(tab: paint_timeline::Tab) -> paint_timeline::Result<()> {
//! let raw = capture::record(&tab, "https://example.com", &CaptureConfig::default()).await?;
//! println!("{} paint logs", raw.paint_logs.len());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Capture run configuration.
pub mod config;

/// Drain gate for in-flight captures.
pub mod drain;

/// Capture record types.
pub mod model;

/// Instrumented page load.
pub mod recorder;

/// Per-run capture state.
pub mod session;

/// Capture source abstraction.
pub mod source;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::CaptureConfig;
pub use drain::DrainCoordinator;
pub use model::{
    AreaKind, DomSnapshot, DomSnapshotEntry, DrawCommand, LayoutTable, PaintCommand,
    PaintLogEntry, PaintRect, ValidPaintArea, Viewport, now_ms,
};
pub use recorder::{RawCapture, record};
pub use session::CaptureSession;
pub use source::{CaptureSource, TabCaptureSource};
