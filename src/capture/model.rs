//! Capture record types.
//!
//! Raw records produced during a page load and the typed paint areas
//! derived from them.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DomSnapshotEntry`] | Timestamped DOM layout snapshot (or placeholder) |
//! | [`PaintLogEntry`] | Timestamped paint command log (or placeholder) |
//! | [`PaintCommand`] | One replay command as reported by the compositor |
//! | [`DrawCommand`] | Closed classification of a paint command |
//! | [`ValidPaintArea`] | Typed on-screen rectangle with resolved content |

// ============================================================================
// Imports
// ============================================================================

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CaptureKind, Error, Result};

// ============================================================================
// Clock
// ============================================================================

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Capture timestamps and the navigation anchor share this clock.
#[must_use]
pub fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        * 1000.0
}

// ============================================================================
// Viewport
// ============================================================================

/// Capture viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

// ============================================================================
// DOM Snapshots
// ============================================================================

/// Flattened layout of the main document.
///
/// `text` and `bounds` are parallel. `text[i] == -1` means layout node `i`
/// has no resolvable text; otherwise it indexes the snapshot's string table.
/// `bounds[i]` is `[x, y, width, height]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTable {
    /// String-table index per layout node.
    #[serde(default)]
    pub text: Vec<i64>,
    /// Bounding box per layout node.
    #[serde(default)]
    pub bounds: Vec<[f64; 4]>,
}

/// A captured DOM snapshot reduced to what text resolution needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomSnapshot {
    /// Shared string table.
    pub strings: Vec<String>,
    /// Layout of the main document.
    pub layout: LayoutTable,
}

impl DomSnapshot {
    /// Extracts the main document layout from a `DOMSnapshot.captureSnapshot`
    /// result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptureFailure`] if the result has no document or
    /// its layout table cannot be read.
    pub fn from_cdp(mut result: Value) -> Result<Self> {
        let layout = result
            .get_mut("documents")
            .and_then(|docs| docs.get_mut(0))
            .and_then(|doc| doc.get_mut("layout"))
            .map(Value::take)
            .ok_or_else(|| Error::capture_failure(CaptureKind::Dom, "snapshot has no document"))?;

        let layout: LayoutTable = serde_json::from_value(layout)
            .map_err(|e| Error::capture_failure(CaptureKind::Dom, format!("bad layout: {e}")))?;

        let strings: Vec<String> = match result.get_mut("strings").map(Value::take) {
            Some(strings) => serde_json::from_value(strings).map_err(|e| {
                Error::capture_failure(CaptureKind::Dom, format!("bad string table: {e}"))
            })?,
            None => Vec::new(),
        };

        Ok(Self { strings, layout })
    }

    /// Returns the string a layout node's text index points at.
    #[must_use]
    pub fn text_of(&self, node: usize) -> Option<&str> {
        let index = *self.layout.text.get(node)?;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
    }
}

/// A DOM snapshot stamped with its capture start.
///
/// A failed capture leaves a placeholder with no snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomSnapshotEntry {
    /// Timestamp in ms (wall clock, then navigation-relative).
    pub ts: f64,
    /// Snapshot contents, absent for placeholders.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<DomSnapshot>,
}

impl DomSnapshotEntry {
    /// Creates an entry for a successful capture.
    #[inline]
    #[must_use]
    pub fn captured(ts: f64, snapshot: DomSnapshot) -> Self {
        Self {
            ts,
            snapshot: Some(snapshot),
        }
    }

    /// Creates a placeholder for a failed capture.
    #[inline]
    #[must_use]
    pub fn placeholder(ts: f64) -> Self {
        Self { ts, snapshot: None }
    }

    /// Returns `true` if the capture failed.
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.snapshot.is_none()
    }
}

// ============================================================================
// Paint Logs
// ============================================================================

/// Axis-aligned rectangle as reported in paint command params.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
}

impl PaintRect {
    /// Reads a rectangle from `params[key]`.
    fn from_params(params: &Value, key: &str) -> Option<Self> {
        serde_json::from_value(params.get(key)?.clone()).ok()
    }
}

/// One compositor replay command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintCommand {
    /// Command name, e.g. `drawRect`.
    pub method: String,
    /// Command parameters.
    #[serde(default)]
    pub params: Value,
}

impl PaintCommand {
    /// Creates a command.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Classifies the command.
    ///
    /// Shape commands whose geometry cannot be read fall into
    /// [`DrawCommand::Unmeasured`].
    #[must_use]
    pub fn kind(&self) -> DrawCommand {
        let params = &self.params;
        let rect = |key: &str| PaintRect::from_params(params, key);

        match self.method.as_str() {
            "drawRect" => rect("rect").map_or(DrawCommand::Unmeasured, DrawCommand::Rect),
            "drawRRect" => rect("rrect").map_or(DrawCommand::Unmeasured, DrawCommand::RRect),
            "drawImageRect" => {
                rect("dst").map_or(DrawCommand::Unmeasured, DrawCommand::ImageRect)
            }
            "drawTextBlob" => {
                let coord = |key: &str| params.get(key).and_then(Value::as_f64);
                match (coord("x"), coord("y")) {
                    (Some(x), Some(y)) => DrawCommand::TextBlob { x, y },
                    _ => DrawCommand::Other,
                }
            }
            "drawCircle" => DrawCommand::Circle,
            _ => DrawCommand::Other,
        }
    }
}

/// Closed classification of paint commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// `drawRect` with its `rect`.
    Rect(PaintRect),
    /// `drawRRect` with the bounds of its `rrect`.
    RRect(PaintRect),
    /// `drawImageRect` with its destination `dst`.
    ImageRect(PaintRect),
    /// `drawTextBlob` anchored at `(x, y)`.
    TextBlob {
        /// Anchor x.
        x: f64,
        /// Anchor y.
        y: f64,
    },
    /// `drawCircle`; replayed, never turned into an area.
    Circle,
    /// Shape or image command without readable geometry; replayed as
    /// captured, never turned into an area.
    Unmeasured,
    /// Anything else.
    Other,
}

/// A paint command log stamped with its capture start.
///
/// A failed capture leaves a placeholder with no command log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintLogEntry {
    /// Timestamp in ms (wall clock, then navigation-relative).
    pub ts: f64,
    /// Replay commands, absent for placeholders.
    #[serde(
        rename = "commandLog",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub command_log: Option<Vec<PaintCommand>>,
}

impl PaintLogEntry {
    /// Creates an entry for a successful capture.
    #[inline]
    #[must_use]
    pub fn captured(ts: f64, commands: Vec<PaintCommand>) -> Self {
        Self {
            ts,
            command_log: Some(commands),
        }
    }

    /// Creates a placeholder for a failed capture.
    #[inline]
    #[must_use]
    pub fn placeholder(ts: f64) -> Self {
        Self {
            ts,
            command_log: None,
        }
    }

    /// Returns the commands, empty for placeholders.
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[PaintCommand] {
        self.command_log.as_deref().unwrap_or_default()
    }

    /// Returns `true` if the capture failed.
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.command_log.is_none()
    }
}

// ============================================================================
// Paint Areas
// ============================================================================

/// Kind of a valid paint area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    /// Plain rectangle.
    Rect,
    /// Rounded rectangle.
    RRect,
    /// Image destination.
    Image,
    /// Text node box.
    Text,
}

/// A typed on-screen rectangle.
///
/// ```json
/// { "left": 0, "top": 0, "right": 10, "bottom": 5, "type": "text", "value": "Hello" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidPaintArea {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Area kind.
    #[serde(rename = "type")]
    pub kind: AreaKind,
    /// Resolved text for text areas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidPaintArea {
    /// Creates a shape or image area.
    #[must_use]
    pub fn shape(rect: PaintRect, kind: AreaKind) -> Self {
        Self {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
            kind,
            value: None,
        }
    }

    /// Creates a text area from a layout box `[x, y, width, height]`.
    #[must_use]
    pub fn text(bounds: [f64; 4], value: impl Into<String>) -> Self {
        let [x, y, width, height] = bounds;
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
            kind: AreaKind::Text,
            value: Some(value.into()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_dom_snapshot_from_cdp() {
        let result = json!({
            "documents": [{
                "layout": {
                    "nodeIndex": [3, 4],
                    "text": [-1, 0],
                    "bounds": [[0, 0, 100, 20], [8, 8, 40, 16]]
                }
            }],
            "strings": ["Hello"]
        });

        let snapshot = DomSnapshot::from_cdp(result).expect("snapshot");
        assert_eq!(snapshot.layout.text, vec![-1, 0]);
        assert_eq!(snapshot.layout.bounds[1], [8.0, 8.0, 40.0, 16.0]);
        assert_eq!(snapshot.text_of(1), Some("Hello"));
        assert_eq!(snapshot.text_of(0), None);
        assert_eq!(snapshot.text_of(5), None);
    }

    #[test]
    fn test_dom_snapshot_without_document_fails() {
        let result = DomSnapshot::from_cdp(json!({"documents": [], "strings": []}));
        assert!(matches!(
            result,
            Err(Error::CaptureFailure {
                kind: CaptureKind::Dom,
                ..
            })
        ));
    }

    #[test]
    fn test_draw_command_classification() {
        let rect = PaintCommand::new(
            "drawRect",
            json!({"rect": {"left": 1, "top": 2, "right": 3, "bottom": 4}, "paint": {}}),
        );
        assert_eq!(
            rect.kind(),
            DrawCommand::Rect(PaintRect {
                left: 1.0,
                top: 2.0,
                right: 3.0,
                bottom: 4.0
            })
        );

        let rrect = PaintCommand::new(
            "drawRRect",
            json!({"rrect": {"left": 0, "top": 0, "right": 9, "bottom": 9, "upperLeftRadius": {"x": 2, "y": 2}}}),
        );
        assert!(matches!(rrect.kind(), DrawCommand::RRect(_)));

        let text = PaintCommand::new("drawTextBlob", json!({"x": 5.5, "y": 7}));
        assert_eq!(text.kind(), DrawCommand::TextBlob { x: 5.5, y: 7.0 });

        assert_eq!(
            PaintCommand::new("drawCircle", json!({})).kind(),
            DrawCommand::Circle
        );
        assert_eq!(
            PaintCommand::new("save", Value::Null).kind(),
            DrawCommand::Other
        );
        assert_eq!(
            PaintCommand::new("drawRect", json!({})).kind(),
            DrawCommand::Unmeasured
        );
        assert_eq!(
            PaintCommand::new("drawImageRect", json!({"dst": {"left": "a"}})).kind(),
            DrawCommand::Unmeasured
        );
        assert_eq!(
            PaintCommand::new("drawTextBlob", json!({"x": 1})).kind(),
            DrawCommand::Other
        );
    }

    #[test]
    fn test_placeholders_serialize_timestamp_only() {
        let dom = serde_json::to_value(DomSnapshotEntry::placeholder(12.0)).expect("json");
        assert_eq!(dom, json!({"ts": 12.0}));

        let paint = serde_json::to_value(PaintLogEntry::placeholder(3.0)).expect("json");
        assert_eq!(paint, json!({"ts": 3.0}));
        assert!(PaintLogEntry::placeholder(3.0).commands().is_empty());
    }

    #[test]
    fn test_paint_log_entry_wire_shape() {
        let entry: PaintLogEntry = serde_json::from_value(json!({
            "ts": 4.0,
            "commandLog": [{"method": "drawRect", "params": {}}]
        }))
        .expect("entry");
        assert_eq!(entry.commands().len(), 1);
        assert!(!entry.is_placeholder());
    }

    #[test]
    fn test_text_area_from_bounds() {
        let area = ValidPaintArea::text([0.0, 0.0, 10.0, 5.0], "hi");
        let json = serde_json::to_value(&area).expect("json");
        assert_eq!(
            json,
            json!({"left": 0.0, "top": 0.0, "right": 10.0, "bottom": 5.0, "type": "text", "value": "hi"})
        );
    }

    #[test]
    fn test_now_ms_is_epoch_millis() {
        assert!(now_ms() > 1.0e12);
    }
}
