//! Drain gate for in-flight captures.
//!
//! Paint signals keep arriving after the page `load` event (late layers),
//! so a run is complete only once the page has loaded AND every triggered
//! DOM and paint capture has finished. The [`DrainCoordinator`] tracks the
//! counters and fires completion exactly once.
//!
//! # Example
//!
//! ```
//! use paint_timeline::capture::DrainCoordinator;
//!
//! let drain = DrainCoordinator::new();
//! drain.on_dom_capture_start();
//! assert!(!drain.on_page_loaded());
//! assert!(drain.on_dom_capture_end());
//! assert!(drain.is_complete());
//! ```

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

// ============================================================================
// Types
// ============================================================================

/// Counters guarded together so every evaluation sees a consistent view.
#[derive(Debug, Default)]
struct DrainState {
    ongoing_dom: usize,
    ongoing_paint: usize,
    page_loaded: bool,
    completed: bool,
}

// ============================================================================
// DrainCoordinator
// ============================================================================

/// Tracks outstanding captures and decides run completion.
///
/// Every `*_end` call and [`on_page_loaded`](Self::on_page_loaded)
/// re-evaluates the gate. The call that observes `page_loaded` with both
/// counters at zero returns `true`; every later evaluation returns `false`.
#[derive(Debug)]
pub struct DrainCoordinator {
    state: Mutex<DrainState>,
    done_tx: watch::Sender<bool>,
}

impl Default for DrainCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl DrainCoordinator {
    /// Creates a coordinator with no outstanding captures.
    #[must_use]
    pub fn new() -> Self {
        let (done_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(DrainState::default()),
            done_tx,
        }
    }

    /// Registers a DOM capture.
    pub fn on_dom_capture_start(&self) {
        self.state.lock().ongoing_dom += 1;
    }

    /// Marks a DOM capture finished (successfully or not).
    ///
    /// Returns `true` if this call completed the run.
    pub fn on_dom_capture_end(&self) -> bool {
        let mut state = self.state.lock();
        match state.ongoing_dom.checked_sub(1) {
            Some(n) => state.ongoing_dom = n,
            None => warn!("DOM capture ended without a matching start"),
        }
        self.evaluate(&mut state)
    }

    /// Registers a paint capture.
    pub fn on_paint_capture_start(&self) {
        self.state.lock().ongoing_paint += 1;
    }

    /// Marks a paint capture finished (successfully or not).
    ///
    /// Returns `true` if this call completed the run.
    pub fn on_paint_capture_end(&self) -> bool {
        let mut state = self.state.lock();
        match state.ongoing_paint.checked_sub(1) {
            Some(n) => state.ongoing_paint = n,
            None => warn!("Paint capture ended without a matching start"),
        }
        self.evaluate(&mut state)
    }

    /// Records the page load signal.
    ///
    /// Returns `true` if this call completed the run.
    pub fn on_page_loaded(&self) -> bool {
        let mut state = self.state.lock();
        state.page_loaded = true;
        self.evaluate(&mut state)
    }

    /// Returns `true` once the page load signal has been seen.
    #[inline]
    #[must_use]
    pub fn page_loaded(&self) -> bool {
        self.state.lock().page_loaded
    }

    /// Returns `true` once the gate has fired.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.lock().completed
    }

    /// Returns the outstanding `(dom, paint)` capture counts.
    #[inline]
    #[must_use]
    pub fn ongoing(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.ongoing_dom, state.ongoing_paint)
    }

    /// Waits until the gate fires. Returns immediately if it already has.
    pub async fn wait(&self) {
        let mut rx = self.done_tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Fires completion the first time the run is drained.
    fn evaluate(&self, state: &mut DrainState) -> bool {
        if state.completed
            || !state.page_loaded
            || state.ongoing_dom != 0
            || state.ongoing_paint != 0
        {
            return false;
        }

        state.completed = true;
        self.done_tx.send_replace(true);
        debug!("All captures drained");
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
