//! Type-safe identifiers for DevTools entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Source |
//! |------|--------|
//! | [`RequestId`] | Local counter, correlates command replies |
//! | [`SessionId`] | `Target.attachToTarget` (flat session) |
//! | [`TargetId`] | `Target.createTarget` |
//! | [`LayerId`] | `LayerTree.layerPainted` |
//! | [`SnapshotId`] | `LayerTree.makeSnapshot` |
//! | [`StreamHandle`] | `Tracing.tracingComplete` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Global counter for request IDs.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a command sent over a DevTools connection.
///
/// Replies carry the same integer `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Allocates the next request ID.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps a raw ID.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw integer.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// String IDs
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw string ID.
            #[inline]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the ID as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Flat-mode session attached to a page target.
    SessionId
);

string_id!(
    /// Browser target (page).
    TargetId
);

string_id!(
    /// Compositor layer.
    LayerId
);

string_id!(
    /// Layer snapshot created by `LayerTree.makeSnapshot`.
    SnapshotId
);

string_id!(
    /// IO stream handle returned when tracing completes.
    StreamHandle
);

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_increments() {
        let a = RequestId::next();
        let b = RequestId::next();
        assert!(b > a);
    }

    #[test]
    fn test_request_id_serializes_as_integer() {
        let id = RequestId::from_raw(42);
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "42");
    }

    #[test]
    fn test_string_id_transparent() {
        let layer: LayerId = serde_json::from_str("\"17\"").expect("parse");
        assert_eq!(layer.as_str(), "17");
        assert_eq!(layer.to_string(), "17");
    }
}
