//! DOM and layer snapshot capture.
//!
//! Thin wrappers over `DOMSnapshot` and `LayerTree`. Results are returned as
//! raw JSON; shaping them into capture records is the recorder's job.

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::{LayerId, SnapshotId};
use crate::protocol::{Command, DomCommand, DomSnapshotCommand, LayerTreeCommand};

use super::Tab;

// ============================================================================
// Tab - Capture
// ============================================================================

impl Tab {
    /// Enables the `DOM`, `DOMSnapshot` and `LayerTree` domains.
    ///
    /// After this, `LayerTree.layerPainted` events are emitted for the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns an error if any domain fails to enable.
    pub async fn enable_capture_domains(&self) -> Result<()> {
        self.send_command(Command::Dom(DomCommand::Enable)).await?;
        self.send_command(Command::DomSnapshot(DomSnapshotCommand::Enable))
            .await?;
        self.send_command(Command::LayerTree(LayerTreeCommand::Enable))
            .await?;
        debug!(session_id = %self.inner.session_id, "Capture domains enabled");
        Ok(())
    }

    /// Captures a flattened DOM snapshot with layout information.
    ///
    /// # Arguments
    ///
    /// * `computed_styles` - Computed style properties to include per node
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot fails.
    pub async fn capture_snapshot(&self, computed_styles: &[String]) -> Result<Value> {
        let command = Command::DomSnapshot(DomSnapshotCommand::CaptureSnapshot {
            computed_styles: computed_styles.to_vec(),
            include_paint_order: true,
            include_dom_rects: true,
        });
        self.send_command(command).await
    }

    /// Snapshots a layer's current paint.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is gone or the response is malformed.
    pub async fn make_layer_snapshot(&self, layer_id: &LayerId) -> Result<SnapshotId> {
        let result = self
            .send_command(Command::LayerTree(LayerTreeCommand::MakeSnapshot {
                layer_id: layer_id.clone(),
            }))
            .await?;

        let snapshot_id = result
            .get("snapshotId")
            .and_then(|v| v.as_str())
            .map(SnapshotId::new)
            .ok_or_else(|| Error::protocol("Expected snapshotId in makeSnapshot response"))?;

        trace!(layer_id = %layer_id, snapshot_id = %snapshot_id, "Layer snapshot made");
        Ok(snapshot_id)
    }

    /// Returns the replay command log of a layer snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is unknown.
    pub async fn snapshot_command_log(&self, snapshot_id: &SnapshotId) -> Result<Vec<Value>> {
        let mut result = self
            .send_command(Command::LayerTree(LayerTreeCommand::SnapshotCommandLog {
                snapshot_id: snapshot_id.clone(),
            }))
            .await?;

        match result.get_mut("commandLog").map(Value::take) {
            Some(Value::Array(commands)) => Ok(commands),
            _ => Err(Error::protocol(
                "Expected commandLog array in snapshotCommandLog response",
            )),
        }
    }

    /// Releases a layer snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn release_snapshot(&self, snapshot_id: &SnapshotId) -> Result<()> {
        self.send_command(Command::LayerTree(LayerTreeCommand::ReleaseSnapshot {
            snapshot_id: snapshot_id.clone(),
        }))
        .await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
