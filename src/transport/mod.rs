//! WebSocket transport layer.
//!
//! This module handles communication between the local end (Rust) and the
//! browser's DevTools endpoint via WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Window (Rust)  │                              │  Chrome         │
//! │                 │         WebSocket            │                 │
//! │  Connection     │─────────────────────────────►│  DevTools       │
//! │  (event loop)   │◄─────────────────────────────│  endpoint       │
//! │                 │   ws://127.0.0.1:PORT/...    │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. Browser launches with `--remote-debugging-port=0`
//! 2. `Connection::connect` - Dial the advertised `ws://` URL
//! 3. `Connection::send` - Commands correlated by integer `id`
//! 4. Events routed to the installed [`EventHandler`]
//! 5. `Connection::shutdown` - Close the socket

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Scripted endpoint used by unit tests.
#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, EventHandler};
