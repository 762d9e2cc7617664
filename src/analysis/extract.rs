//! Paint command to paint area conversion.

use tracing::trace;

use crate::capture::{
    AreaKind, DomSnapshot, DomSnapshotEntry, DrawCommand, PaintCommand, PaintLogEntry,
    ValidPaintArea,
};

use super::resolver::TextResolver;

// ============================================================================
// Text Lookup
// ============================================================================

/// Resolves text draw commands against one optional snapshot.
pub(crate) struct TextLookup<'a> {
    snapshot: Option<(&'a DomSnapshot, TextResolver)>,
}

impl<'a> TextLookup<'a> {
    /// Prepares lookups against `snapshot`; `None` resolves nothing.
    pub(crate) fn new(snapshot: Option<&'a DomSnapshot>) -> Self {
        Self {
            snapshot: snapshot.map(|s| (s, TextResolver::new(&s.layout))),
        }
    }

    /// Returns the closest text node's box and string.
    pub(crate) fn lookup(&self, x: f64, y: f64) -> Option<([f64; 4], &'a str)> {
        let (snapshot, resolver) = self.snapshot.as_ref()?;
        let snapshot: &'a DomSnapshot = *snapshot;
        let node = resolver.resolve(x, y)?;
        let bounds = *snapshot.layout.bounds.get(node)?;
        let text = snapshot.text_of(node)?;
        Some((bounds, text))
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Converts one paint log into its valid paint areas.
///
/// Command order is preserved. Text commands that resolve to no node and
/// commands of any other kind produce nothing.
#[must_use]
pub fn extract_areas(
    snapshot: Option<&DomSnapshot>,
    commands: &[PaintCommand],
) -> Vec<ValidPaintArea> {
    let texts = TextLookup::new(snapshot);

    commands
        .iter()
        .filter_map(|command| match command.kind() {
            DrawCommand::Rect(rect) => Some(ValidPaintArea::shape(rect, AreaKind::Rect)),
            DrawCommand::RRect(rect) => Some(ValidPaintArea::shape(rect, AreaKind::RRect)),
            DrawCommand::ImageRect(rect) => Some(ValidPaintArea::shape(rect, AreaKind::Image)),
            DrawCommand::TextBlob { x, y } => {
                let resolved = texts.lookup(x, y);
                if resolved.is_none() {
                    trace!(x, y, "Text command unresolved");
                }
                resolved.map(|(bounds, text)| ValidPaintArea::text(bounds, text))
            }
            DrawCommand::Circle | DrawCommand::Unmeasured | DrawCommand::Other => None,
        })
        .collect()
}

/// Computes the valid paint areas of every paint log.
///
/// Paint log `i` is paired with DOM snapshot `i`; a missing or placeholder
/// snapshot resolves no text.
#[must_use]
pub fn extract_all(
    dom_snapshots: &[DomSnapshotEntry],
    paint_logs: &[PaintLogEntry],
) -> Vec<Vec<ValidPaintArea>> {
    paint_logs
        .iter()
        .enumerate()
        .map(|(i, log)| {
            let snapshot = dom_snapshots.get(i).and_then(|d| d.snapshot.as_ref());
            extract_areas(snapshot, log.commands())
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
