//! Message handling for one shell.
//!
//! An [`Analyzer`] owns the browser driver and the current analysis. It
//! runs at most one capture at a time; queries are answered from whatever
//! run was last published.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};

use crate::analysis::{PaintAnalysis, PaintQuery, synchronize};
use crate::browser::Window;
use crate::capture::{CaptureConfig, RawCapture, record};
use crate::driver::Driver;
use crate::error::{Error, Result};

use super::message::{PASS_URL, SEE_PAINT, SEE_PAINT_AREA, ShellMessage, ShellReply};
use super::source::fetch_source;

// ============================================================================
// Constants
// ============================================================================

/// Reply to `PASS-URL` without a URL.
pub const EMPTY_URL_MESSAGE: &str = "Input URL to continue!";

/// Reply to `PASS-URL` for an unreachable URL.
pub const UNREACHABLE_URL_MESSAGE: &str = "URL cannot be retrieved!";

/// Reply to `PASS-URL` while another run is in progress.
pub const BUSY_MESSAGE: &str = "A page is already being captured";

// ============================================================================
// Analyzer
// ============================================================================

/// Internal shared state.
struct AnalyzerInner {
    driver: Driver,
    config: CaptureConfig,
    query: PaintQuery,
    client: Client,
    /// Held for the duration of a run.
    run: AsyncMutex<()>,
}

/// Request handler for the shell protocol.
///
/// Cheap to clone; clones share the driver and the current analysis.
#[derive(Clone)]
pub struct Analyzer {
    inner: Arc<AnalyzerInner>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("driver", &self.inner.driver)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Creates an analyzer that launches windows through `driver`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `config` is invalid.
    pub fn new(driver: Driver, config: CaptureConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            inner: Arc::new(AnalyzerInner {
                driver,
                config,
                query: PaintQuery::new(),
                client: Client::new(),
                run: AsyncMutex::new(()),
            }),
        })
    }

    /// Returns the query handle over the last published run.
    #[inline]
    #[must_use]
    pub fn query(&self) -> &PaintQuery {
        &self.inner.query
    }

    /// Returns the capture configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CaptureConfig {
        &self.inner.config
    }

    /// Handles one inbound message, sending any replies to `replies`.
    ///
    /// Never fails: every error is turned into an error reply under the
    /// message's own name. Replies sent after the receiver is gone are
    /// dropped.
    pub async fn handle(&self, message: ShellMessage, replies: &UnboundedSender<ShellReply>) {
        let send = |reply: ShellReply| {
            let _ = replies.send(reply);
        };

        match message {
            ShellMessage::PassUrl { url } => {
                if url.is_empty() {
                    send(ShellReply::error(PASS_URL, EMPTY_URL_MESSAGE));
                    return;
                }

                let Ok(_guard) = self.inner.run.try_lock() else {
                    warn!(url = %url, "Run rejected, another run in progress");
                    send(ShellReply::error(PASS_URL, BUSY_MESSAGE));
                    return;
                };

                if let Err(e) = self.run(&url, replies).await {
                    warn!(url = %url, error = %e, "Run failed");
                    send(ShellReply::error(PASS_URL, run_error_message(&e)));
                }
            }

            ShellMessage::SeePaint { index } => match self.inner.query.replay_frame(index) {
                Ok(steps) => steps.into_iter().map(ShellReply::paint).for_each(send),
                Err(e) => send(ShellReply::error(SEE_PAINT, e.to_string())),
            },

            ShellMessage::SeePaintArea { index } => match self.inner.query.valid_areas(index) {
                Ok(areas) => areas.iter().map(ShellReply::paint_area).for_each(send),
                Err(e) => send(ShellReply::error(SEE_PAINT_AREA, e.to_string())),
            },

            ShellMessage::Unsupported => {
                trace!("Ignoring unsupported message");
            }
        }
    }

    /// Closes every window the driver still tracks.
    ///
    /// # Errors
    ///
    /// See [`Driver::close`].
    pub async fn shutdown(&self) -> Result<()> {
        self.inner.driver.close().await
    }
}

// ============================================================================
// Analyzer - Run
// ============================================================================

impl Analyzer {
    /// Fetches, captures, synchronizes and publishes one page load.
    async fn run(&self, url: &str, replies: &UnboundedSender<ShellReply>) -> Result<()> {
        let inner = &self.inner;
        let started = Instant::now();

        inner.query.reset();
        fetch_source(&inner.client, url, inner.config.fetch_timeout).await?;

        let viewport = inner.config.viewport;
        let window = inner
            .driver
            .window()
            .headless()
            .window_size(viewport.width, viewport.height)
            .spawn()
            .await?;

        let captured = self.capture(&window, url).await;
        if let Err(e) = inner.driver.close_window(&window).await {
            debug!(error = %e, "Error closing capture window");
        }

        let timeline = synchronize(captured?).await?;
        let analysis = PaintAnalysis::new(timeline, viewport);
        let count = analysis.paint_count();
        inner.query.publish(analysis);

        let _ = replies.send(ShellReply::paint_region(viewport));
        let _ = replies.send(ShellReply::paint_count(count));

        info!(
            url,
            paint_count = count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Run complete"
        );
        Ok(())
    }

    /// Records `url` in a fresh tab of `window`.
    async fn capture(&self, window: &Window, url: &str) -> Result<RawCapture> {
        let tab = window.new_tab().await?;
        record(&tab, url, &self.inner.config).await
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Maps a run failure to the message shown to the user.
fn run_error_message(err: &Error) -> String {
    match err {
        Error::UnreachableSource { .. } => UNREACHABLE_URL_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
