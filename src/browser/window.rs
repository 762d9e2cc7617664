//! Browser window management and control.
//!
//! Each [`Window`] owns:
//! - One Chrome process (child process)
//! - One DevTools WebSocket connection
//! - One profile directory (temporary or persistent)
//!
//! Page targets are attached in flat session mode, so every tab shares the
//! window's connection and events are routed to tabs by `sessionId`.
//!
//! # Example
//!
//! ```no_run
//! use paint_timeline::Driver;
//!
//! # async fn example() -> paint_timeline::Result<()> {
//! let driver = Driver::builder().binary("/usr/bin/chromium").build()?;
//!
//! let window = driver.window()
//!     .headless()
//!     .window_size(1200, 800)
//!     .spawn()
//!     .await?;
//!
//! let tab = window.new_tab().await?;
//! tab.goto("https://example.com").await?;
//!
//! window.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::process::Child;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::driver::{ChromeOptions, Driver, Profile};
use crate::error::{Error, Result};
use crate::identifiers::{SessionId, TargetId};
use crate::protocol::{BrowserCommand, Command, Event, ParsedEvent, Request, TargetCommand};
use crate::transport::Connection;

use super::Tab;

// ============================================================================
// Constants
// ============================================================================

/// Grace period for `Browser.close` before the process is killed.
const BROWSER_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards a child process and ensures it is killed when dropped.
struct ProcessGuard {
    /// The child process handle.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
}

impl ProcessGuard {
    /// Creates a new process guard.
    fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Process guard created");
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Takes the child out of the guard for an async shutdown.
    fn take(&mut self) -> Option<Child> {
        self.child.take()
    }

    /// Returns the process ID.
    #[inline]
    fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// Types
// ============================================================================

/// Tabs keyed by their flat session.
type TabMap = FxHashMap<SessionId, Tab>;

/// Internal shared state for a window.
pub(crate) struct WindowInner {
    /// Unique identifier for this window.
    pub uuid: Uuid,
    /// Protected process handle.
    process: Mutex<ProcessGuard>,
    /// DevTools connection.
    pub connection: Connection,
    /// Profile directory.
    #[allow(dead_code)]
    profile: Profile,
    /// Browser-level DevTools URL.
    pub ws_url: String,
    /// Attached tabs (shared with the event router).
    tabs: Arc<Mutex<TabMap>>,
}

// ============================================================================
// Window
// ============================================================================

/// A handle to a Chrome browser instance.
///
/// The window owns a browser process, DevTools connection, and profile.
/// When the last handle is dropped, the process is killed.
#[derive(Clone)]
pub struct Window {
    /// Shared inner state.
    pub(crate) inner: Arc<WindowInner>,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("uuid", &self.inner.uuid)
            .field("ws_url", &self.inner.ws_url)
            .field("tab_count", &self.tab_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Window - Constructor
// ============================================================================

impl Window {
    /// Creates a new window handle and installs the event router.
    pub(crate) fn new(
        connection: Connection,
        process: Child,
        profile: Profile,
        ws_url: String,
    ) -> Self {
        let uuid = Uuid::new_v4();
        let tabs: Arc<Mutex<TabMap>> = Arc::new(Mutex::new(FxHashMap::default()));

        let router_tabs = Arc::clone(&tabs);
        connection.set_event_handler(Box::new(move |event: Event| {
            Self::route_event(&router_tabs, event);
        }));

        debug!(uuid = %uuid, url = %ws_url, "Window created");

        Self {
            inner: Arc::new(WindowInner {
                uuid,
                process: Mutex::new(ProcessGuard::new(process)),
                connection,
                profile,
                ws_url,
                tabs,
            }),
        }
    }

    /// Delivers a session event to its tab.
    fn route_event(tabs: &Mutex<TabMap>, event: Event) {
        let Some(session_id) = event.session_id.clone() else {
            if let ParsedEvent::DetachedFromTarget { session_id } = event.parse() {
                let removed = tabs.lock().remove(&session_id).is_some();
                debug!(session_id = %session_id, removed, "Session detached");
            } else {
                trace!(method = %event.method, "Browser-level event ignored");
            }
            return;
        };

        let tab = tabs.lock().get(&session_id).cloned();
        match tab {
            Some(tab) => tab.dispatch(event),
            None => trace!(session_id = %session_id, method = %event.method, "Event for unknown session"),
        }
    }
}

// ============================================================================
// Window - Accessors
// ============================================================================

impl Window {
    /// Returns the Rust-side unique UUID.
    #[inline]
    #[must_use]
    pub fn uuid(&self) -> &Uuid {
        &self.inner.uuid
    }

    /// Returns the browser-level DevTools URL.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> &str {
        &self.inner.ws_url
    }

    /// Returns the browser process ID.
    #[inline]
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.inner.process.lock().pid()
    }

    /// Returns the number of attached tabs.
    #[inline]
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.inner.tabs.lock().len()
    }
}

// ============================================================================
// Window - Lifecycle
// ============================================================================

impl Window {
    /// Closes the browser and waits for the process to exit.
    ///
    /// Asks the browser to close gracefully first and kills it if it does
    /// not exit in time.
    ///
    /// # Errors
    ///
    /// Returns an error only if waiting on the process fails.
    pub async fn close(&self) -> Result<()> {
        debug!(uuid = %self.inner.uuid, "Closing window");

        let request = Request::new(Command::Browser(BrowserCommand::Close));
        if let Err(e) = self
            .inner
            .connection
            .send_with_timeout(request, BROWSER_CLOSE_TIMEOUT)
            .await
        {
            debug!(error = %e, "Browser.close not acknowledged");
        }
        self.inner.connection.clear_event_handler();
        self.inner.connection.shutdown();
        self.inner.tabs.lock().clear();

        let child = self.inner.process.lock().take();
        if let Some(mut child) = child {
            match tokio::time::timeout(BROWSER_CLOSE_TIMEOUT, child.wait()).await {
                Ok(status) => {
                    status?;
                }
                Err(_) => {
                    debug!(uuid = %self.inner.uuid, "Browser did not exit, killing");
                    child.kill().await?;
                }
            }
        }

        info!(uuid = %self.inner.uuid, "Window closed");
        Ok(())
    }
}

// ============================================================================
// Window - Tab Management
// ============================================================================

impl Window {
    /// Opens a new page target and attaches a flat session to it.
    ///
    /// # Errors
    ///
    /// Returns an error if target creation or attach fails.
    pub async fn new_tab(&self) -> Result<Tab> {
        let created = self
            .send_command(Command::Target(TargetCommand::CreateTarget {
                url: "about:blank".to_string(),
            }))
            .await?;
        let target_id = created
            .get("targetId")
            .and_then(|v| v.as_str())
            .map(TargetId::new)
            .ok_or_else(|| Error::protocol("Expected targetId in createTarget response"))?;

        let attached = self
            .send_command(Command::Target(TargetCommand::AttachToTarget {
                target_id: target_id.clone(),
                flatten: true,
            }))
            .await?;
        let session_id = attached
            .get("sessionId")
            .and_then(|v| v.as_str())
            .map(SessionId::new)
            .ok_or_else(|| Error::protocol("Expected sessionId in attachToTarget response"))?;

        let tab = Tab::new(session_id.clone(), target_id, self.inner.connection.clone());
        self.inner.tabs.lock().insert(session_id.clone(), tab.clone());

        debug!(uuid = %self.inner.uuid, session_id = %session_id, "New tab attached");
        Ok(tab)
    }

    /// Closes a tab's page target and detaches it from event routing.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be closed.
    pub async fn close_tab(&self, tab: &Tab) -> Result<()> {
        self.inner.tabs.lock().remove(tab.session_id());
        self.send_command(Command::Target(TargetCommand::CloseTarget {
            target_id: tab.target_id().clone(),
        }))
        .await?;
        debug!(session_id = %tab.session_id(), "Tab closed");
        Ok(())
    }
}

// ============================================================================
// Window - Internal
// ============================================================================

impl Window {
    /// Sends a browser-level command and returns its result.
    pub(crate) async fn send_command(&self, command: Command) -> Result<serde_json::Value> {
        let request = Request::new(command);
        self.inner.connection.send(request).await?.into_result()
    }
}

// ============================================================================
// WindowBuilder
// ============================================================================

/// Builder for spawning browser windows.
///
/// # Example
///
/// ```no_run
/// # use paint_timeline::Driver;
/// # async fn example() -> paint_timeline::Result<()> {
/// # let driver = Driver::builder().binary("/usr/bin/chromium").build()?;
/// let window = driver.window()
///     .headless()
///     .window_size(1200, 800)
///     .profile("./my_profile")
///     .spawn()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct WindowBuilder<'a> {
    /// Reference to the driver.
    driver: &'a Driver,
    /// Browser launch options.
    options: ChromeOptions,
    /// Optional custom profile path.
    profile: Option<PathBuf>,
}

impl<'a> WindowBuilder<'a> {
    /// Creates a new window builder.
    pub(crate) fn new(driver: &'a Driver) -> Self {
        Self {
            driver,
            options: ChromeOptions::new(),
            profile: None,
        }
    }

    /// Enables headless mode.
    #[must_use]
    pub fn headless(mut self) -> Self {
        self.options = self.options.with_headless();
        self
    }

    /// Sets the window size.
    #[must_use]
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.options = self.options.with_window_size(width, height);
        self
    }

    /// Replaces all launch options.
    #[must_use]
    pub fn options(mut self, options: ChromeOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses a custom profile directory.
    #[must_use]
    pub fn profile(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile = Some(path.into());
        self
    }

    /// Spawns the window.
    ///
    /// # Errors
    ///
    /// Returns an error if window creation fails.
    pub async fn spawn(self) -> Result<Window> {
        self.driver.spawn_window(self.options, self.profile).await
    }
}

// ============================================================================
// Tests
// ============================================================================
