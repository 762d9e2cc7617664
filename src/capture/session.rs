//! Per-run capture state.
//!
//! A [`CaptureSession`] is created for every requested URL and dropped when
//! the run ends; it is never reused. Capture tasks append to its
//! accumulators and report to its drain gate. The accumulators can only be
//! taken out once the gate has fired.

// ============================================================================
// Imports
// ============================================================================

use std::mem;

use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::drain::DrainCoordinator;
use super::model::{DomSnapshotEntry, PaintLogEntry};

// ============================================================================
// CaptureSession
// ============================================================================

/// Accumulators and drain gate of one run.
#[derive(Debug, Default)]
pub struct CaptureSession {
    drain: DrainCoordinator,
    dom_snapshots: Mutex<Vec<DomSnapshotEntry>>,
    paint_logs: Mutex<Vec<PaintLogEntry>>,
}

impl CaptureSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the drain gate.
    #[inline]
    #[must_use]
    pub fn drain(&self) -> &DrainCoordinator {
        &self.drain
    }

    /// Registers one DOM capture and one paint capture for a paint signal.
    ///
    /// Returns `false` and registers nothing once the page has loaded.
    pub fn begin_paint_signal(&self) -> bool {
        if self.drain.page_loaded() {
            return false;
        }
        self.drain.on_dom_capture_start();
        self.drain.on_paint_capture_start();
        true
    }

    /// Stores a finished DOM capture and releases its counter.
    ///
    /// Returns `true` if this completed the run.
    pub fn record_dom(&self, entry: DomSnapshotEntry) -> bool {
        self.dom_snapshots.lock().push(entry);
        self.drain.on_dom_capture_end()
    }

    /// Stores a finished paint capture and releases its counter.
    ///
    /// Returns `true` if this completed the run.
    pub fn record_paint(&self, entry: PaintLogEntry) -> bool {
        self.paint_logs.lock().push(entry);
        self.drain.on_paint_capture_end()
    }

    /// Returns the number of stored `(dom, paint)` entries.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        (self.dom_snapshots.lock().len(), self.paint_logs.lock().len())
    }

    /// Takes the accumulated streams.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if captures are still draining.
    pub fn finish(&self) -> Result<(Vec<DomSnapshotEntry>, Vec<PaintLogEntry>)> {
        if !self.drain.is_complete() {
            let (dom, paint) = self.drain.ongoing();
            return Err(Error::not_ready(format!(
                "captures still draining (dom: {dom}, paint: {paint})"
            )));
        }

        let dom = mem::take(&mut *self.dom_snapshots.lock());
        let paint = mem::take(&mut *self.paint_logs.lock());
        Ok((dom, paint))
    }
}

// ============================================================================
// Tests
// ============================================================================
