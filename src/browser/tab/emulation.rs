//! Viewport emulation.

use tracing::debug;

use crate::error::Result;
use crate::protocol::{Command, EmulationCommand};

use super::Tab;

// ============================================================================
// Tab - Emulation
// ============================================================================

impl Tab {
    /// Pins the viewport to `width` x `height` CSS pixels at scale 1.
    ///
    /// Paint coordinates are reported in this space.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
        debug!(width, height, session_id = %self.inner.session_id, "Setting viewport");

        let command = Command::Emulation(EmulationCommand::SetDeviceMetricsOverride {
            width,
            height,
            device_scale_factor: 1.0,
            mobile: false,
        });
        self.send_command(command).await?;
        Ok(())
    }
}
