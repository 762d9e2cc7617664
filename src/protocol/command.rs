//! Command definitions organized by DevTools domain.
//!
//! Commands follow the CDP `Domain.method` format.
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `Target` | Page target creation and flat session attach |
//! | `Page` | Lifecycle events, navigation |
//! | `DOM` / `DOMSnapshot` | Flattened layout snapshots |
//! | `LayerTree` | Layer snapshots and paint command logs |
//! | `Tracing` / `IO` | Performance trace recording and streaming |
//! | `Emulation` | Viewport metrics |
//! | `Browser` | Shutdown |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::{LayerId, SnapshotId, StreamHandle, TargetId};

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by domain.
///
/// This enum wraps domain-specific command enums for unified serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Target domain commands.
    Target(TargetCommand),
    /// Page domain commands.
    Page(PageCommand),
    /// DOM domain commands.
    Dom(DomCommand),
    /// DOMSnapshot domain commands.
    DomSnapshot(DomSnapshotCommand),
    /// LayerTree domain commands.
    LayerTree(LayerTreeCommand),
    /// Tracing domain commands.
    Tracing(TracingCommand),
    /// IO domain commands.
    Io(IoCommand),
    /// Emulation domain commands.
    Emulation(EmulationCommand),
    /// Browser domain commands.
    Browser(BrowserCommand),
}

impl Command {
    /// Returns the `Domain.method` name of the command.
    #[must_use]
    pub fn method(&self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.get("method").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_default()
    }
}

// ============================================================================
// Target Commands
// ============================================================================

/// Target domain commands for page creation and session attach.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum TargetCommand {
    /// Create a new page target.
    #[serde(rename = "Target.createTarget")]
    CreateTarget {
        /// Initial URL.
        url: String,
    },

    /// Attach to a target with a flat session.
    #[serde(rename = "Target.attachToTarget")]
    AttachToTarget {
        /// Target to attach to.
        #[serde(rename = "targetId")]
        target_id: TargetId,
        /// Use flat session mode (session ID on every message).
        flatten: bool,
    },

    /// Close a target.
    #[serde(rename = "Target.closeTarget")]
    CloseTarget {
        /// Target to close.
        #[serde(rename = "targetId")]
        target_id: TargetId,
    },
}

// ============================================================================
// Page Commands
// ============================================================================

/// Page domain commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum PageCommand {
    /// Enable page lifecycle events.
    #[serde(rename = "Page.enable")]
    Enable,

    /// Navigate to URL.
    #[serde(rename = "Page.navigate")]
    Navigate {
        /// URL to navigate to.
        url: String,
    },

    /// Close the page.
    #[serde(rename = "Page.close")]
    Close,
}

// ============================================================================
// DOM Commands
// ============================================================================

/// DOM domain commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum DomCommand {
    /// Enable the DOM agent.
    #[serde(rename = "DOM.enable")]
    Enable,
}

/// DOMSnapshot domain commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum DomSnapshotCommand {
    /// Enable the DOMSnapshot agent.
    #[serde(rename = "DOMSnapshot.enable")]
    Enable,

    /// Capture a flattened document snapshot.
    #[serde(rename = "DOMSnapshot.captureSnapshot")]
    CaptureSnapshot {
        /// Computed style whitelist.
        #[serde(rename = "computedStyles")]
        computed_styles: Vec<String>,
        /// Include paint order for layout nodes.
        #[serde(rename = "includePaintOrder")]
        include_paint_order: bool,
        /// Include client and scroll rects.
        #[serde(rename = "includeDOMRects")]
        include_dom_rects: bool,
    },
}

// ============================================================================
// LayerTree Commands
// ============================================================================

/// LayerTree domain commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum LayerTreeCommand {
    /// Enable layer tree events.
    #[serde(rename = "LayerTree.enable")]
    Enable,

    /// Snapshot a layer's current paint.
    #[serde(rename = "LayerTree.makeSnapshot")]
    MakeSnapshot {
        /// Layer to snapshot.
        #[serde(rename = "layerId")]
        layer_id: LayerId,
    },

    /// Replay log for a snapshot.
    #[serde(rename = "LayerTree.snapshotCommandLog")]
    SnapshotCommandLog {
        /// Snapshot to read.
        #[serde(rename = "snapshotId")]
        snapshot_id: SnapshotId,
    },

    /// Release a snapshot.
    #[serde(rename = "LayerTree.releaseSnapshot")]
    ReleaseSnapshot {
        /// Snapshot to release.
        #[serde(rename = "snapshotId")]
        snapshot_id: SnapshotId,
    },
}

// ============================================================================
// Tracing Commands
// ============================================================================

/// Trace configuration for `Tracing.start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Category filter.
    #[serde(rename = "includedCategories")]
    pub included_categories: Vec<String>,
}

/// Tracing domain commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum TracingCommand {
    /// Start recording.
    #[serde(rename = "Tracing.start")]
    Start {
        /// Category configuration.
        #[serde(rename = "traceConfig")]
        trace_config: TraceConfig,
        /// `ReturnAsStream` delivers the trace through an IO stream.
        #[serde(rename = "transferMode")]
        transfer_mode: String,
    },

    /// Stop recording and flush.
    #[serde(rename = "Tracing.end")]
    End,
}

/// IO domain commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum IoCommand {
    /// Read a chunk of a stream.
    #[serde(rename = "IO.read")]
    Read {
        /// Stream handle.
        handle: StreamHandle,
    },

    /// Close a stream.
    #[serde(rename = "IO.close")]
    Close {
        /// Stream handle.
        handle: StreamHandle,
    },
}

// ============================================================================
// Emulation / Browser Commands
// ============================================================================

/// Emulation domain commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum EmulationCommand {
    /// Override the viewport metrics.
    #[serde(rename = "Emulation.setDeviceMetricsOverride")]
    SetDeviceMetricsOverride {
        /// Viewport width in CSS pixels.
        width: u32,
        /// Viewport height in CSS pixels.
        height: u32,
        /// Device scale factor.
        #[serde(rename = "deviceScaleFactor")]
        device_scale_factor: f64,
        /// Mobile emulation.
        mobile: bool,
    },
}

/// Browser domain commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum BrowserCommand {
    /// Close the browser gracefully.
    #[serde(rename = "Browser.close")]
    Close,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_command_serialization() {
        let command = Command::LayerTree(LayerTreeCommand::Enable);
        let json = serde_json::to_value(&command).expect("serialize");
        assert_eq!(json["method"], "LayerTree.enable");
    }

    #[test]
    fn test_capture_snapshot_params() {
        let command = Command::DomSnapshot(DomSnapshotCommand::CaptureSnapshot {
            computed_styles: vec!["font-size".into()],
            include_paint_order: true,
            include_dom_rects: true,
        });
        let json = serde_json::to_value(&command).expect("serialize");
        assert_eq!(json["method"], "DOMSnapshot.captureSnapshot");
        assert_eq!(json["params"]["computedStyles"][0], "font-size");
        assert_eq!(json["params"]["includeDOMRects"], true);
    }

    #[test]
    fn test_make_snapshot_params() {
        let command = Command::LayerTree(LayerTreeCommand::MakeSnapshot {
            layer_id: LayerId::new("12"),
        });
        let json = serde_json::to_value(&command).expect("serialize");
        assert_eq!(json["params"]["layerId"], "12");
    }

    #[test]
    fn test_command_method() {
        let command = Command::Tracing(TracingCommand::End);
        assert_eq!(command.method(), "Tracing.end");
    }
}
