//! Post-run correlation.
//!
//! Runs only after the drain gate has fired:
//!
//! ```text
//! RawCapture ──► timeline::synchronize ──► Timeline
//!                                            │
//!                     extract (+ resolver) ◄─┘
//!                                            │
//!                                            ▼
//!                                      PaintAnalysis ──► PaintQuery
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | `timeline` | Clock reconciliation and sorting |
//! | `resolver` | Nearest text node lookup |
//! | `extract` | Paint commands to typed areas |
//! | `query` | Replay and area queries |

// ============================================================================
// Submodules
// ============================================================================

/// Paint command to paint area conversion.
pub mod extract;

/// Replay and area queries.
pub mod query;

/// Nearest-node text resolution.
pub mod resolver;

/// Clock reconciliation.
pub mod timeline;

// ============================================================================
// Re-exports
// ============================================================================

pub use extract::{extract_all, extract_areas};
pub use query::{PaintAnalysis, PaintQuery, ReplayStep};
pub use resolver::{TextResolver, resolve};
pub use timeline::{
    NAVIGATION_START, Timeline, TraceEvent, navigation_start, parse_trace, synchronize,
    synchronize_streams,
};
