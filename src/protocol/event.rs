//! Event message types.
//!
//! Events are notifications pushed by the DevTools endpoint when browser
//! activity occurs. Unlike replies they carry no `id`.
//!
//! # Event Types
//!
//! | Domain | Events |
//! |--------|--------|
//! | `LayerTree` | `layerPainted` |
//! | `Page` | `loadEventFired` |
//! | `Tracing` | `tracingComplete` |
//! | `Target` | `detachedFromTarget` |

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::identifiers::{LayerId, SessionId, StreamHandle};

// ============================================================================
// Event
// ============================================================================

/// An event notification from the DevTools endpoint.
///
/// # Format
///
/// ```json
/// {
///   "method": "Domain.eventName",
///   "params": { ... },
///   "sessionId": "..."
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,

    /// Session the event belongs to (absent for browser-level events).
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<SessionId>,
}

impl Event {
    /// Returns the domain name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = Event { method: "Page.loadEventFired".into(), .. };
    /// assert_eq!(event.domain(), "Page");
    /// ```
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        match self.method.as_str() {
            "LayerTree.layerPainted" => ParsedEvent::LayerPainted {
                layer_id: LayerId::new(self.get_string("layerId")),
            },

            "Page.loadEventFired" => ParsedEvent::LoadEventFired {
                timestamp: self.get_f64("timestamp"),
            },

            "Tracing.tracingComplete" => ParsedEvent::TracingComplete {
                stream: self
                    .get_optional_string("stream")
                    .map(StreamHandle::new),
                data_loss: self
                    .params
                    .get("dataLossOccurred")
                    .and_then(|v| v.as_bool())
                    .unwrap_or_default(),
            },

            "Target.detachedFromTarget" => ParsedEvent::DetachedFromTarget {
                session_id: SessionId::new(self.get_string("sessionId")),
            },

            _ => ParsedEvent::Unknown {
                method: self.method.clone(),
                params: self.params.clone(),
            },
        }
    }

    /// Gets a string from params.
    #[inline]
    fn get_string(&self, key: &str) -> String {
        self.get_optional_string(key).unwrap_or_default()
    }

    /// Gets an optional string from params.
    #[inline]
    fn get_optional_string(&self, key: &str) -> Option<String> {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Gets an f64 from params.
    #[inline]
    fn get_f64(&self, key: &str) -> f64 {
        self.params
            .get(key)
            .and_then(|v| v.as_f64())
            .unwrap_or_default()
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone)]
pub enum ParsedEvent {
    /// A compositor layer was repainted.
    LayerPainted {
        /// Layer that painted.
        layer_id: LayerId,
    },

    /// The page `load` event fired.
    LoadEventFired {
        /// Monotonic timestamp in seconds.
        timestamp: f64,
    },

    /// Tracing stopped and the trace is ready to be read.
    TracingComplete {
        /// Stream handle holding the trace (stream transfer mode).
        stream: Option<StreamHandle>,
        /// Whether the trace buffer overflowed.
        data_loss: bool,
    },

    /// A flat session was detached.
    DetachedFromTarget {
        /// Detached session.
        session_id: SessionId,
    },

    /// Unknown event type.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

// ============================================================================
// Tests
// ============================================================================
