//! Chrome launcher and window factory.
//!
//! The [`Driver`] struct acts as the central coordinator for browser
//! automation. It spawns Chrome processes and tracks their windows.
//!
//! # Example
//!
//! ```no_run
//! use paint_timeline::Driver;
//!
//! # async fn example() -> paint_timeline::Result<()> {
//! let driver = Driver::builder()
//!     .binary("/usr/bin/chromium")
//!     .build()?;
//!
//! let window = driver.window().headless().spawn().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::time::timeout;
use tracing::{debug, info, trace};

use crate::browser::{Window, WindowBuilder};
use crate::error::{Error, Result};
use crate::transport::Connection;

use super::builder::DriverBuilder;
use super::options::ChromeOptions;
use super::profile::Profile;

// ============================================================================
// Constants
// ============================================================================

/// Prefix of the stderr line announcing the DevTools endpoint.
const DEVTOOLS_BANNER: &str = "DevTools listening on ";

/// Flags every spawned browser receives.
const BASE_ARGS: &[&str] = &[
    "--remote-debugging-port=0",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-background-networking",
    "--disable-extensions",
];

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the driver.
pub(crate) struct DriverInner {
    /// Path to the browser binary executable.
    pub binary: PathBuf,

    /// How long to wait for the DevTools banner.
    pub launch_timeout: Duration,

    /// Active windows tracked by their internal UUID.
    pub windows: Mutex<FxHashMap<uuid::Uuid, Window>>,
}

// ============================================================================
// Driver
// ============================================================================

/// Chrome launcher.
///
/// The driver is responsible for:
/// - Spawning Chrome processes with isolated profiles
/// - Discovering and dialing each process's DevTools endpoint
/// - Tracking active browser windows
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    pub(crate) inner: Arc<DriverInner>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("binary", &self.inner.binary)
            .field("window_count", &self.window_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Driver - Public API
// ============================================================================

impl Driver {
    /// Creates a configuration builder for the driver.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Creates a window builder for spawning new browser windows.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use paint_timeline::Driver;
    /// # async fn example(driver: &Driver) -> paint_timeline::Result<()> {
    /// let window = driver.window()
    ///     .headless()
    ///     .window_size(1200, 800)
    ///     .spawn()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    #[must_use]
    pub fn window(&self) -> WindowBuilder<'_> {
        WindowBuilder::new(self)
    }

    /// Returns the number of active windows currently tracked.
    #[inline]
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.inner.windows.lock().len()
    }

    /// Closes all active windows.
    ///
    /// # Errors
    ///
    /// Individual window failures are logged, not returned.
    pub async fn close(&self) -> Result<()> {
        let windows: Vec<Window> = {
            let mut map = self.inner.windows.lock();
            map.drain().map(|(_, w)| w).collect()
        };

        info!(count = windows.len(), "Shutting down all windows");

        for window in windows {
            if let Err(e) = window.close().await {
                debug!(error = %e, "Error closing window during shutdown");
            }
        }

        Ok(())
    }

    /// Closes one window and stops tracking it.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser process cannot be stopped.
    pub async fn close_window(&self, window: &Window) -> Result<()> {
        self.inner.windows.lock().remove(window.uuid());
        window.close().await
    }
}

// ============================================================================
// Driver - Internal API
// ============================================================================

impl Driver {
    /// Creates a new driver instance.
    pub(crate) fn new(binary: PathBuf, launch_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(DriverInner {
                binary,
                launch_timeout,
                windows: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Spawns a new Chrome window with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Options are invalid
    /// - Profile creation fails
    /// - The process fails to spawn or never announces its endpoint
    /// - The DevTools WebSocket cannot be dialed
    pub(crate) async fn spawn_window(
        &self,
        options: ChromeOptions,
        custom_profile: Option<PathBuf>,
    ) -> Result<Window> {
        options.validate().map_err(Error::config)?;

        let profile = match custom_profile {
            Some(path) => Profile::from_path(path)?,
            None => Profile::new_temp()?,
        };

        let mut child = self.spawn_chrome_process(&profile, &options)?;
        let pid = child.id();
        info!(pid, "Browser process spawned");

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::process_launch_failed("stderr not captured"))?;
        let ws_url = self.read_devtools_url(stderr).await?;
        debug!(url = %ws_url, "DevTools endpoint discovered");

        let connection = Connection::connect(&ws_url).await?;
        let window = Window::new(connection, child, profile, ws_url);

        self.inner
            .windows
            .lock()
            .insert(*window.uuid(), window.clone());

        info!(
            window_count = self.window_count(),
            "Window spawned successfully"
        );

        Ok(window)
    }

    /// Spawns the browser process with the given configuration.
    fn spawn_chrome_process(&self, profile: &Profile, options: &ChromeOptions) -> Result<Child> {
        let mut cmd = Command::new(&self.inner.binary);

        cmd.args(BASE_ARGS)
            .arg(profile.to_arg())
            .args(options.to_args())
            .arg("about:blank");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd.spawn()
            .map_err(|e| Error::process_launch_failed(e.to_string()))
    }

    /// Reads stderr until the DevTools banner appears.
    ///
    /// The rest of stderr keeps draining in the background so the browser
    /// never blocks on a full pipe.
    async fn read_devtools_url(&self, stderr: ChildStderr) -> Result<String> {
        let mut lines = BufReader::new(stderr).lines();
        let launch_timeout = self.inner.launch_timeout;

        let found = timeout(launch_timeout, async {
            while let Some(line) = lines.next_line().await? {
                trace!(line = %line, "browser stderr");
                if let Some(url) = parse_devtools_banner(&line) {
                    return Ok(url.to_string());
                }
            }
            Err::<String, Error>(Error::process_launch_failed(
                "Browser exited before announcing its DevTools endpoint",
            ))
        })
        .await
        .map_err(|_| Error::connection_timeout(launch_timeout.as_millis() as u64))??;

        tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                trace!(line = %line, "browser stderr");
            }
        });

        Ok(found)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Extracts the `ws://` URL from a `DevTools listening on ...` line.
pub(crate) fn parse_devtools_banner(line: &str) -> Option<&str> {
    let url = line.trim().strip_prefix(DEVTOOLS_BANNER)?.trim();
    url.starts_with("ws://").then_some(url)
}

// ============================================================================
// Tests
// ============================================================================
