//! DevTools protocol message types.
//!
//! This module defines the message format for communication with the
//! browser's DevTools WebSocket endpoint.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Browser | Command request |
//! | `Response` | Browser → Local | Command reply (same `id`) |
//! | `Event` | Browser → Local | Domain notification |
//!
//! # Command Naming
//!
//! Commands follow `Domain.method` format:
//!
//! - `Page.navigate`
//! - `DOMSnapshot.captureSnapshot`
//! - `LayerTree.snapshotCommandLog`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions by domain |
//! | `event` | Event types |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by domain.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{
    BrowserCommand, Command, DomCommand, DomSnapshotCommand, EmulationCommand, IoCommand,
    LayerTreeCommand, PageCommand, TargetCommand, TraceConfig, TracingCommand,
};
pub use event::{Event, ParsedEvent};
pub use request::{CdpError, Request, Response};
