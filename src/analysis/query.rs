//! Query interface over a synchronized run.
//!
//! Paint snapshots are addressed 1-based, as shown to the user.
//!
//! # Example
//!
//! ```
//! use paint_timeline::analysis::{PaintAnalysis, PaintQuery, Timeline};
//! use paint_timeline::capture::Viewport;
//!
//! let query = PaintQuery::new();
//! assert!(query.valid_areas(1).is_err());
//!
//! query.publish(PaintAnalysis::new(Timeline::default(), Viewport::new(1200, 800)));
//! assert_eq!(query.paint_count().unwrap(), 0);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info};

use crate::capture::{DrawCommand, PaintCommand, ValidPaintArea, Viewport};
use crate::error::{Error, Result};

use super::extract::{TextLookup, extract_all};
use super::timeline::Timeline;

// ============================================================================
// ReplayStep
// ============================================================================

/// One replayed paint command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStep {
    /// The command as captured.
    pub command: PaintCommand,
    /// Resolved text for text commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// ============================================================================
// PaintAnalysis
// ============================================================================

/// A synchronized run with its precomputed paint areas.
#[derive(Debug, Clone)]
pub struct PaintAnalysis {
    timeline: Timeline,
    valid_areas: Vec<Vec<ValidPaintArea>>,
    viewport: Viewport,
}

impl PaintAnalysis {
    /// Computes the valid paint areas of every snapshot.
    #[must_use]
    pub fn new(timeline: Timeline, viewport: Viewport) -> Self {
        let valid_areas = extract_all(&timeline.dom_snapshots, &timeline.paint_logs);
        info!(
            snapshots = valid_areas.len(),
            areas = valid_areas.iter().map(Vec::len).sum::<usize>(),
            "Valid paint areas computed"
        );

        Self {
            timeline,
            valid_areas,
            viewport,
        }
    }

    /// Returns the number of captured paint logs.
    #[inline]
    #[must_use]
    pub fn paint_count(&self) -> usize {
        self.timeline.paint_logs.len()
    }

    /// Returns the capture viewport.
    #[inline]
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Returns the synchronized streams.
    #[inline]
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Replays the area-producing commands of paint snapshot `index`.
    ///
    /// Shape, image and circle commands are yielded as captured, even when
    /// their geometry cannot be read; text
    /// commands are yielded with their resolved text, or skipped when no
    /// text node matches. A failed capture replays nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` is 0 or past the end.
    pub fn replay_frame(&self, index: usize) -> Result<Vec<ReplayStep>> {
        let slot = self.slot(index)?;
        let snapshot = self
            .timeline
            .dom_snapshots
            .get(slot)
            .and_then(|d| d.snapshot.as_ref());
        let texts = TextLookup::new(snapshot);

        let steps: Vec<ReplayStep> = self.timeline.paint_logs[slot]
            .commands()
            .iter()
            .filter_map(|command| {
                let content = match command.kind() {
                    DrawCommand::Rect(_)
                    | DrawCommand::RRect(_)
                    | DrawCommand::ImageRect(_)
                    | DrawCommand::Circle
                    | DrawCommand::Unmeasured => None,
                    DrawCommand::TextBlob { x, y } => {
                        let (_, text) = texts.lookup(x, y)?;
                        Some(text.to_string())
                    }
                    DrawCommand::Other => return None,
                };
                Some(ReplayStep {
                    command: command.clone(),
                    content,
                })
            })
            .collect();

        debug!(index, steps = steps.len(), "Frame replayed");
        Ok(steps)
    }

    /// Returns the valid paint areas of paint snapshot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` is 0 or past the end.
    pub fn valid_areas(&self, index: usize) -> Result<&[ValidPaintArea]> {
        let slot = self.slot(index)?;
        Ok(&self.valid_areas[slot])
    }

    /// Maps a 1-based index to a slot.
    fn slot(&self, index: usize) -> Result<usize> {
        let count = self.paint_count();
        if index == 0 || index > count {
            return Err(Error::index_out_of_range(index, count));
        }
        Ok(index - 1)
    }
}

// ============================================================================
// PaintQuery
// ============================================================================

/// Shared handle to the most recent analysis.
///
/// Empty until a run publishes its analysis; reset when the next run
/// starts, so queries never observe a half-finished run.
#[derive(Debug, Default)]
pub struct PaintQuery {
    current: RwLock<Option<Arc<PaintAnalysis>>>,
}

impl PaintQuery {
    /// Creates an empty query handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `analysis` the queried run.
    pub fn publish(&self, analysis: PaintAnalysis) {
        *self.current.write() = Some(Arc::new(analysis));
    }

    /// Drops the current analysis.
    pub fn reset(&self) {
        *self.current.write() = None;
    }

    /// Returns the current analysis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if no run has been synchronized.
    pub fn current(&self) -> Result<Arc<PaintAnalysis>> {
        self.current
            .read()
            .clone()
            .ok_or_else(|| Error::not_ready("no synchronized run available"))
    }

    /// Returns the number of paint logs of the current run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] before synchronization.
    pub fn paint_count(&self) -> Result<usize> {
        Ok(self.current()?.paint_count())
    }

    /// See [`PaintAnalysis::replay_frame`].
    ///
    /// # Errors
    ///
    /// [`Error::NotReady`] before synchronization, [`Error::IndexOutOfRange`]
    /// for a bad index.
    pub fn replay_frame(&self, index: usize) -> Result<Vec<ReplayStep>> {
        self.current()?.replay_frame(index)
    }

    /// See [`PaintAnalysis::valid_areas`].
    ///
    /// # Errors
    ///
    /// [`Error::NotReady`] before synchronization, [`Error::IndexOutOfRange`]
    /// for a bad index.
    pub fn valid_areas(&self, index: usize) -> Result<Vec<ValidPaintArea>> {
        Ok(self.current()?.valid_areas(index)?.to_vec())
    }
}

// ============================================================================
// Tests
// ============================================================================
