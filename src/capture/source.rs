//! Where capture records come from.
//!
//! The recorder only needs two operations per paint signal, so they sit
//! behind [`CaptureSource`]. [`TabCaptureSource`] implements them over a
//! live DevTools session.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tracing::debug;

use crate::browser::Tab;
use crate::error::{CaptureKind, Error, Result};
use crate::identifiers::LayerId;

use super::model::{DomSnapshot, PaintCommand};

// ============================================================================
// CaptureSource
// ============================================================================

/// Produces the two captures triggered by a paint signal.
#[async_trait::async_trait]
pub trait CaptureSource: Send + Sync {
    /// Captures the current DOM layout.
    async fn dom_snapshot(&self) -> Result<DomSnapshot>;

    /// Captures the paint command log of a layer.
    async fn paint_log(&self, layer_id: &LayerId) -> Result<Vec<PaintCommand>>;
}

// ============================================================================
// TabCaptureSource
// ============================================================================

/// Capture source backed by a [`Tab`].
#[derive(Debug, Clone)]
pub struct TabCaptureSource {
    tab: Tab,
    computed_styles: Vec<String>,
}

impl TabCaptureSource {
    /// Creates a source capturing through `tab`.
    #[must_use]
    pub fn new(tab: Tab, computed_styles: Vec<String>) -> Self {
        Self {
            tab,
            computed_styles,
        }
    }
}

#[async_trait::async_trait]
impl CaptureSource for TabCaptureSource {
    async fn dom_snapshot(&self) -> Result<DomSnapshot> {
        let result = self.tab.capture_snapshot(&self.computed_styles).await?;
        DomSnapshot::from_cdp(result)
    }

    async fn paint_log(&self, layer_id: &LayerId) -> Result<Vec<PaintCommand>> {
        let snapshot_id = self.tab.make_layer_snapshot(layer_id).await?;
        let log = self.tab.snapshot_command_log(&snapshot_id).await;

        if let Err(e) = self.tab.release_snapshot(&snapshot_id).await {
            debug!(error = %e, snapshot_id = %snapshot_id, "Snapshot release failed");
        }

        log?.into_iter().map(parse_command).collect()
    }
}

/// Parses one raw command-log entry.
fn parse_command(raw: Value) -> Result<PaintCommand> {
    serde_json::from_value(raw)
        .map_err(|e| Error::capture_failure(CaptureKind::Paint, format!("bad command: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use serde_json::json;

    use crate::identifiers::{SessionId, TargetId};
    use crate::transport::mock::{MockEndpoint, reply};

    #[test]
    fn test_parse_command_requires_method() {
        assert!(parse_command(json!({"method": "drawRect", "params": {}})).is_ok());
        assert!(matches!(
            parse_command(json!({"params": {}})),
            Err(Error::CaptureFailure {
                kind: CaptureKind::Paint,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_paint_log_releases_snapshot() {
        let released = Arc::new(AtomicBool::new(false));
        let released_seen = Arc::clone(&released);

        let endpoint = MockEndpoint::bind().await.expect("bind");
        let connection = endpoint
            .connect(Box::new(move |command| {
                let result = match command["method"].as_str().unwrap_or_default() {
                    "LayerTree.makeSnapshot" => json!({"snapshotId": "s1"}),
                    "LayerTree.snapshotCommandLog" => json!({"commandLog": [
                        {"method": "drawTextBlob", "params": {"x": 1, "y": 2}},
                        {"method": "restore"}
                    ]}),
                    "LayerTree.releaseSnapshot" => {
                        released_seen.store(true, Ordering::SeqCst);
                        json!({})
                    }
                    _ => json!({}),
                };
                vec![reply(command, result)]
            }))
            .await
            .expect("connect");

        let tab = Tab::new(SessionId::new("S1"), TargetId::new("T1"), connection);
        let source = TabCaptureSource::new(tab, Vec::new());

        let commands = source.paint_log(&LayerId::new("7")).await.expect("log");
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].method, "restore");
        assert!(released.load(Ordering::SeqCst));
    }
}
