//! Tab navigation methods.

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Command, PageCommand};

use super::Tab;

// ============================================================================
// Tab - Navigation
// ============================================================================

impl Tab {
    /// Enables `Page` domain events (`Page.loadEventFired`).
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn enable_page(&self) -> Result<()> {
        self.send_command(Command::Page(PageCommand::Enable)).await?;
        Ok(())
    }

    /// Navigates to a URL.
    ///
    /// Returns once the navigation is committed; load completion is signalled
    /// separately by `Page.loadEventFired`.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to navigate to
    ///
    /// # Errors
    ///
    /// Returns an error if navigation fails.
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!(url = %url, session_id = %self.inner.session_id, "Navigating");

        let command = Command::Page(PageCommand::Navigate {
            url: url.to_string(),
        });
        let result = self.send_command(command).await?;

        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str())
            && !error_text.is_empty()
        {
            return Err(Error::protocol(format!(
                "Navigation to {url} failed: {error_text}"
            )));
        }

        Ok(())
    }

    /// Closes the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn close(&self) -> Result<()> {
        debug!(session_id = %self.inner.session_id, "Closing page");
        self.send_command(Command::Page(PageCommand::Close)).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
