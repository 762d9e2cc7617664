//! Paint Timeline - Navigation-aligned paint capture for Chrome page loads.
//!
//! This library loads a page in an instrumented Chrome, records every
//! compositor paint with a matching DOM layout snapshot, and correlates
//! both with the browser's performance trace on one timeline.
//!
//! # Architecture
//!
//! A run has two phases:
//!
//! - **Capture**: each `LayerTree.layerPainted` event before page load
//!   spawns a DOM snapshot task and a paint command log task; a drain gate
//!   fires once the page has loaded and no capture is in flight
//! - **Analysis**: the trace is parsed, all streams are rebased onto the
//!   trace's `navigationStart` and sorted, and paint commands are turned
//!   into typed on-screen areas
//!
//! Key design principles:
//!
//! - Each [`Window`] owns: Chrome process + DevTools connection + event loop
//! - Each [`Tab`] is a flat CDP session with its own event subscribers
//! - Per-run state lives in a [`CaptureSession`], never in globals
//! - Capture failures degrade to placeholders instead of aborting the run
//!
//! # Quick Start
//!
//! ```no_run
//! use paint_timeline::{CaptureConfig, Driver, PaintAnalysis, Result, capture, analysis};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let driver = Driver::builder()
//!         .binary("/usr/bin/chromium")
//!         .build()?;
//!
//!     let config = CaptureConfig::default();
//!     let window = driver.window().headless().window_size(1200, 800).spawn().await?;
//!     let tab = window.new_tab().await?;
//!
//!     let raw = capture::record(&tab, "https://example.com", &config).await?;
//!     let viewport = raw.viewport;
//!     let timeline = analysis::synchronize(raw).await?;
//!     let analysis = PaintAnalysis::new(timeline, viewport);
//!
//!     for area in analysis.valid_areas(1)? {
//!         println!("{area:?}");
//!     }
//!
//!     driver.close().await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`analysis`] | Timeline synchronization, text resolution, paint areas |
//! | [`browser`] | Browser entities: [`Window`], [`Tab`] |
//! | [`capture`] | Instrumented page load and drain gate |
//! | [`driver`] | Driver factory and configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | DevTools message types (internal) |
//! | [`service`] | Shell request/reply handling |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Post-run correlation.
///
/// Turns a drained capture into a [`Timeline`] and a queryable
/// [`PaintAnalysis`].
pub mod analysis;

/// Browser entities: Window, Tab.
///
/// - [`Window`] - Browser instance (owns Chrome process)
/// - [`Tab`] - Attached page session
pub mod browser;

/// Instrumented page load.
///
/// Use [`capture::record`] to capture one page load in a [`Tab`].
pub mod capture;

/// Driver factory and configuration.
///
/// Use [`Driver::builder()`] to create a configured driver instance.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for DevTools entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// DevTools protocol message types.
///
/// Internal module defining command/response/event structures.
pub mod protocol;

/// Shell request/reply handling.
pub mod service;

/// WebSocket transport layer.
///
/// Internal module handling the DevTools WebSocket connection.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Analysis types
pub use analysis::{PaintAnalysis, PaintQuery, ReplayStep, Timeline, TraceEvent};

// Browser types
pub use browser::{Tab, Window};

// Capture types
pub use capture::{
    AreaKind, CaptureConfig, CaptureSession, DomSnapshot, DomSnapshotEntry, DrawCommand,
    PaintCommand, PaintLogEntry, RawCapture, ValidPaintArea, Viewport,
};

// Driver types
pub use driver::{ChromeOptions, Driver, DriverBuilder, Profile};

// Error types
pub use error::{CaptureKind, Error, Result};

// Identifier types
pub use identifiers::{LayerId, RequestId, SessionId, SnapshotId, StreamHandle, TargetId};

// Service types
pub use service::{Analyzer, ShellMessage, ShellReply};
