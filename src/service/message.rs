//! Shell request/reply messages.
//!
//! One JSON object per message, discriminated by `name`:
//!
//! ```json
//! {"name": "SEE-PAINT", "index": 3}
//! {"name": "SEE-PAINT", "value": {"method": "drawTextBlob", "params": {}}, "content": "Hi"}
//! {"name": "PASS-URL", "type": "error", "value": "Input URL to continue!"}
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::analysis::ReplayStep;
use crate::capture::{ValidPaintArea, Viewport};

// ============================================================================
// Constants
// ============================================================================

/// Start a run.
pub const PASS_URL: &str = "PASS-URL";

/// Replay a paint snapshot.
pub const SEE_PAINT: &str = "SEE-PAINT";

/// List the valid paint areas of a paint snapshot.
pub const SEE_PAINT_AREA: &str = "SEE-PAINT-AREA";

/// Capture viewport announcement.
pub const PAINT_REGION: &str = "PAINT-REGION";

/// Paint snapshot count announcement.
pub const PAINT_COUNT: &str = "PAINT-COUNT";

// ============================================================================
// ShellMessage
// ============================================================================

/// Inbound message from the shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "name")]
pub enum ShellMessage {
    /// Fetch, capture and synchronize `url`.
    #[serde(rename = "PASS-URL")]
    PassUrl {
        /// Page to load; may be empty.
        #[serde(default)]
        url: String,
    },

    /// Replay paint snapshot `index` (1-based).
    #[serde(rename = "SEE-PAINT")]
    SeePaint {
        /// 1-based paint snapshot index.
        index: usize,
    },

    /// List valid paint areas of paint snapshot `index` (1-based).
    #[serde(rename = "SEE-PAINT-AREA")]
    SeePaintArea {
        /// 1-based paint snapshot index.
        index: usize,
    },

    /// Any other message; ignored.
    #[serde(other)]
    Unsupported,
}

impl ShellMessage {
    /// Returns the wire name replies to this message are sent under.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::PassUrl { .. } => Some(PASS_URL),
            Self::SeePaint { .. } => Some(SEE_PAINT),
            Self::SeePaintArea { .. } => Some(SEE_PAINT_AREA),
            Self::Unsupported => None,
        }
    }
}

// ============================================================================
// ShellReply
// ============================================================================

/// Reply classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyType {
    /// `value` is a human-readable error message.
    Error,
}

/// Outbound message to the shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShellReply {
    /// Message name.
    pub name: &'static str,
    /// Set for error replies.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReplyType>,
    /// Payload.
    pub value: Value,
    /// Resolved text of a replayed text command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ShellReply {
    /// Creates an error reply under `name`.
    pub fn error(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            kind: Some(ReplyType::Error),
            value: Value::String(message.into()),
            content: None,
        }
    }

    /// Creates a `SEE-PAINT` reply for one replayed command.
    pub fn paint(step: ReplayStep) -> Self {
        let value = json!({
            "method": step.command.method,
            "params": step.command.params,
        });
        Self {
            name: SEE_PAINT,
            kind: None,
            value,
            content: step.content,
        }
    }

    /// Creates a `SEE-PAINT-AREA` reply for one area.
    pub fn paint_area(area: &ValidPaintArea) -> Self {
        Self {
            name: SEE_PAINT_AREA,
            kind: None,
            value: serde_json::to_value(area).unwrap_or(Value::Null),
            content: None,
        }
    }

    /// Creates the `PAINT-REGION` announcement.
    #[must_use]
    pub fn paint_region(viewport: Viewport) -> Self {
        Self {
            name: PAINT_REGION,
            kind: None,
            value: json!({ "width": viewport.width, "height": viewport.height }),
            content: None,
        }
    }

    /// Creates the `PAINT-COUNT` announcement.
    #[must_use]
    pub fn paint_count(count: usize) -> Self {
        Self {
            name: PAINT_COUNT,
            kind: None,
            value: json!(count),
            content: None,
        }
    }

    /// Returns `true` for error replies.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == Some(ReplyType::Error)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::capture::{AreaKind, PaintCommand, PaintRect};

    #[test]
    fn test_parse_messages() {
        let msg: ShellMessage =
            serde_json::from_str(r#"{"name": "PASS-URL", "url": "https://example.com"}"#)
                .expect("parse");
        assert_eq!(
            msg,
            ShellMessage::PassUrl {
                url: "https://example.com".into()
            }
        );

        let msg: ShellMessage =
            serde_json::from_str(r#"{"name": "SEE-PAINT-AREA", "index": 2}"#).expect("parse");
        assert_eq!(msg, ShellMessage::SeePaintArea { index: 2 });
        assert_eq!(msg.name(), Some(SEE_PAINT_AREA));
    }

    #[test]
    fn test_missing_url_is_empty() {
        let msg: ShellMessage = serde_json::from_str(r#"{"name": "PASS-URL"}"#).expect("parse");
        assert_eq!(msg, ShellMessage::PassUrl { url: String::new() });
    }

    #[test]
    fn test_unknown_message_is_unsupported() {
        let msg: ShellMessage =
            serde_json::from_str(r#"{"name": "UPDATE-WINDOW", "value": {}}"#).expect("parse");
        assert_eq!(msg, ShellMessage::Unsupported);
        assert_eq!(msg.name(), None);
    }

    #[test]
    fn test_error_reply_shape() {
        let reply = ShellReply::error(PASS_URL, "Input URL to continue!");
        assert!(reply.is_error());
        assert_eq!(
            serde_json::to_value(&reply).expect("json"),
            json!({"name": "PASS-URL", "type": "error", "value": "Input URL to continue!"})
        );
    }

    #[test]
    fn test_paint_reply_carries_content() {
        let reply = ShellReply::paint(ReplayStep {
            command: PaintCommand::new("drawTextBlob", json!({"x": 1, "y": 2})),
            content: Some("Hello".into()),
        });
        assert_eq!(
            serde_json::to_value(&reply).expect("json"),
            json!({
                "name": "SEE-PAINT",
                "value": {"method": "drawTextBlob", "params": {"x": 1, "y": 2}},
                "content": "Hello"
            })
        );
    }

    #[test]
    fn test_area_reply_shape() {
        let rect = PaintRect {
            left: 0.0,
            top: 0.0,
            right: 10.0,
            bottom: 5.0,
        };
        let reply = ShellReply::paint_area(&ValidPaintArea::shape(rect, AreaKind::RRect));
        assert_eq!(reply.value["type"], "rrect");
        assert_eq!(reply.value["right"], 10.0);
    }

    #[test]
    fn test_announcements() {
        let region = ShellReply::paint_region(Viewport::new(1200, 800));
        assert_eq!(region.value, json!({"width": 1200, "height": 800}));

        let count = ShellReply::paint_count(7);
        assert_eq!(count.name, PAINT_COUNT);
        assert_eq!(count.value, json!(7));
    }
}
