//! Shell-facing request/reply layer.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `message` | [`ShellMessage`] / [`ShellReply`] wire types |
//! | `source` | Source document fetch |
//! | `analyzer` | [`Analyzer`] runs captures and answers queries |
//!
//! # Example
//!
//! ```no_run
//! use paint_timeline::{Analyzer, CaptureConfig, Driver, ShellMessage};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> paint_timeline::Result<()> {
//! let driver = Driver::builder().binary("/usr/bin/chromium").build()?;
//! let analyzer = Analyzer::new(driver, CaptureConfig::default())?;
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! analyzer
//!     .handle(ShellMessage::PassUrl { url: "https://example.com".into() }, &tx)
//!     .await;
//!
//! while let Ok(reply) = rx.try_recv() {
//!     println!("{}", serde_json::to_string(&reply)?);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Message handling.
pub mod analyzer;

/// Wire types.
pub mod message;

/// Source document fetch.
pub mod source;

// ============================================================================
// Re-exports
// ============================================================================

pub use analyzer::Analyzer;
pub use message::{ReplyType, ShellMessage, ShellReply};
pub use source::{fetch_source, prepare_document};
