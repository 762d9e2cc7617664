//! Instrumented page load.
//!
//! [`record`] prepares a tab, starts tracing, navigates and then reacts to
//! session events until the drain gate fires:
//!
//! - `LayerTree.layerPainted` before load spawns one DOM capture task and
//!   one paint capture task, each stamped at its start
//! - `Page.loadEventFired` marks the page loaded
//!
//! Afterwards the trace is streamed to a file and the page is closed.

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::browser::Tab;
use crate::error::{CaptureKind, Error, Result};
use crate::identifiers::LayerId;
use crate::protocol::{Event, ParsedEvent};

use super::config::CaptureConfig;
use super::model::{DomSnapshotEntry, PaintLogEntry, Viewport, now_ms};
use super::session::CaptureSession;
use super::source::{CaptureSource, TabCaptureSource};

// ============================================================================
// RawCapture
// ============================================================================

/// Everything a drained run hands to synchronization.
#[derive(Debug)]
pub struct RawCapture {
    /// DOM snapshots in completion order, wall-clock stamped.
    pub dom_snapshots: Vec<DomSnapshotEntry>,
    /// Paint logs in completion order, wall-clock stamped.
    pub paint_logs: Vec<PaintLogEntry>,
    /// Trace file written when tracing stopped.
    pub trace_path: PathBuf,
    /// Wall-clock ms at which navigation was initiated.
    pub backend_start: f64,
    /// Viewport the page was captured at.
    pub viewport: Viewport,
}

// ============================================================================
// Recording
// ============================================================================

/// Instruments one page load of `url` in `tab`.
///
/// # Errors
///
/// - [`Error::Config`] if `config` is invalid
/// - [`Error::Timeout`] if captures do not drain within the capture timeout
/// - Any protocol error from preparing the tab, navigating or stopping the
///   trace
///
/// Individual capture failures are not errors; they leave placeholders.
pub async fn record(tab: &Tab, url: &str, config: &CaptureConfig) -> Result<RawCapture> {
    config.validate()?;

    let mut events = tab.subscribe();

    tab.enable_page().await?;
    tab.enable_capture_domains().await?;
    tab.set_viewport(config.viewport.width, config.viewport.height)
        .await?;
    tab.start_tracing(&config.trace_categories).await?;

    let backend_start = now_ms();
    tab.goto(url).await?;

    let session = Arc::new(CaptureSession::new());
    let source: Arc<dyn CaptureSource> = Arc::new(TabCaptureSource::new(
        tab.clone(),
        config.computed_styles.clone(),
    ));

    let drained = timeout(
        config.capture_timeout,
        drive(source, Arc::clone(&session), &mut events),
    )
    .await;
    drop(events);

    match drained {
        Ok(result) => result?,
        Err(_) => {
            let (dom, paint) = session.drain().ongoing();
            warn!(dom, paint, "Captures did not drain in time");
            return Err(Error::timeout(
                "page capture",
                config.capture_timeout.as_millis() as u64,
            ));
        }
    }

    let trace_path = config
        .trace_dir
        .join(format!("trace_{}.json", Uuid::new_v4().simple()));
    tab.stop_tracing(&trace_path).await?;

    if let Err(e) = tab.close().await {
        debug!(error = %e, "Page close failed");
    }

    let (dom_snapshots, paint_logs) = session.finish()?;
    info!(
        dom = dom_snapshots.len(),
        paint = paint_logs.len(),
        "Capture complete"
    );

    Ok(RawCapture {
        dom_snapshots,
        paint_logs,
        trace_path,
        backend_start,
        viewport: config.viewport,
    })
}

/// Dispatches session events until the drain gate fires.
///
/// # Errors
///
/// Returns [`Error::ConnectionClosed`] if the event stream ends first.
pub(crate) async fn drive(
    source: Arc<dyn CaptureSource>,
    session: Arc<CaptureSession>,
    events: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    loop {
        tokio::select! {
            biased;

            () = session.drain().wait() => return Ok(()),

            event = events.recv() => {
                let Some(event) = event else {
                    return Err(Error::ConnectionClosed);
                };
                handle_event(&source, &session, event);
            }
        }
    }
}

/// Reacts to one session event.
fn handle_event(source: &Arc<dyn CaptureSource>, session: &Arc<CaptureSession>, event: Event) {
    match event.parse() {
        ParsedEvent::LayerPainted { layer_id } => {
            if !session.begin_paint_signal() {
                trace!(layer_id = %layer_id, "Paint after load ignored");
                return;
            }
            tokio::spawn(capture_dom(Arc::clone(source), Arc::clone(session)));
            tokio::spawn(capture_paint(
                Arc::clone(source),
                Arc::clone(session),
                layer_id,
            ));
        }

        ParsedEvent::LoadEventFired { .. } => {
            info!("Page loaded");
            session.drain().on_page_loaded();
        }

        _ => {}
    }
}

// ============================================================================
// Capture Tasks
// ============================================================================

/// Captures one DOM snapshot into the session.
async fn capture_dom(source: Arc<dyn CaptureSource>, session: Arc<CaptureSession>) {
    let ts = now_ms();
    let started = Instant::now();

    let entry = match source.dom_snapshot().await {
        Ok(snapshot) => {
            debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "DOM snapshot captured"
            );
            DomSnapshotEntry::captured(ts, snapshot)
        }
        Err(e) => {
            let error = Error::capture_failure(CaptureKind::Dom, e.to_string());
            warn!(error = %error, "DOM snapshot failed");
            DomSnapshotEntry::placeholder(now_ms())
        }
    };

    session.record_dom(entry);
}

/// Captures one layer's paint log into the session.
async fn capture_paint(
    source: Arc<dyn CaptureSource>,
    session: Arc<CaptureSession>,
    layer_id: LayerId,
) {
    let ts = now_ms();
    let started = Instant::now();

    let entry = match source.paint_log(&layer_id).await {
        Ok(commands) => {
            debug!(
                layer_id = %layer_id,
                commands = commands.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Paint log captured"
            );
            PaintLogEntry::captured(ts, commands)
        }
        Err(e) => {
            let error = Error::capture_failure(CaptureKind::Paint, e.to_string());
            warn!(layer_id = %layer_id, error = %error, "Paint log failed");
            PaintLogEntry::placeholder(now_ms())
        }
    };

    session.record_paint(entry);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::analysis::{PaintAnalysis, synchronize};
    use crate::capture::model::{AreaKind, DomSnapshot, PaintCommand};
    use crate::identifiers::{SessionId, TargetId};
    use crate::transport::mock::{MockEndpoint, event, reply};

    /// Source with canned answers; layer `"bad"` fails both captures.
    struct FakeSource {
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl CaptureSource for FakeSource {
        async fn dom_snapshot(&self) -> Result<DomSnapshot> {
            tokio::time::sleep(self.delay).await;
            Ok(DomSnapshot::default())
        }

        async fn paint_log(&self, layer_id: &LayerId) -> Result<Vec<PaintCommand>> {
            tokio::time::sleep(self.delay).await;
            if layer_id.as_str() == "bad" {
                return Err(Error::cdp(-32000, "Invalid layer id"));
            }
            Ok(vec![PaintCommand::new("drawRect", json!({}))])
        }
    }

    fn painted(layer: &str) -> Event {
        serde_json::from_value(json!({
            "method": "LayerTree.layerPainted",
            "params": {"layerId": layer},
            "sessionId": "S1"
        }))
        .expect("event")
    }

    fn loaded() -> Event {
        serde_json::from_value(json!({
            "method": "Page.loadEventFired",
            "params": {"timestamp": 1.0},
            "sessionId": "S1"
        }))
        .expect("event")
    }

    fn fake(delay_ms: u64) -> Arc<dyn CaptureSource> {
        Arc::new(FakeSource {
            delay: Duration::from_millis(delay_ms),
        })
    }

    #[tokio::test]
    async fn test_drive_waits_for_late_captures() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = Arc::new(CaptureSession::new());

        tx.send(painted("1")).expect("send");
        tx.send(painted("2")).expect("send");
        tx.send(loaded()).expect("send");

        drive(fake(20), Arc::clone(&session), &mut rx)
            .await
            .expect("drained");

        let (dom, paint) = session.finish().expect("finished");
        assert_eq!(dom.len(), 2);
        assert_eq!(paint.len(), 2);
        assert!(paint.iter().all(|p| !p.is_placeholder()));
    }

    #[tokio::test]
    async fn test_failed_capture_becomes_placeholder() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = Arc::new(CaptureSession::new());

        tx.send(painted("1")).expect("send");
        tx.send(painted("bad")).expect("send");
        tx.send(loaded()).expect("send");

        drive(fake(1), Arc::clone(&session), &mut rx)
            .await
            .expect("drained");

        let (_, paint) = session.finish().expect("finished");
        assert_eq!(paint.len(), 2);
        assert_eq!(paint.iter().filter(|p| p.is_placeholder()).count(), 1);
    }

    #[tokio::test]
    async fn test_load_without_paint_completes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = Arc::new(CaptureSession::new());
        tx.send(loaded()).expect("send");

        drive(fake(0), Arc::clone(&session), &mut rx)
            .await
            .expect("drained");

        let (dom, paint) = session.finish().expect("finished");
        assert!(dom.is_empty());
        assert!(paint.is_empty());
    }

    #[tokio::test]
    async fn test_closed_stream_before_load_fails() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = Arc::new(CaptureSession::new());
        tx.send(painted("1")).expect("send");
        drop(tx);

        let result = drive(fake(0), session, &mut rx).await;
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_capture_timestamps_are_wall_clock() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = Arc::new(CaptureSession::new());
        let before = now_ms();

        tx.send(painted("1")).expect("send");
        tx.send(loaded()).expect("send");
        drive(fake(0), Arc::clone(&session), &mut rx)
            .await
            .expect("drained");

        let (dom, paint) = session.finish().expect("finished");
        assert!(dom[0].ts >= before);
        assert!(paint[0].ts >= before);
    }

    #[tokio::test]
    async fn test_record_page_load_end_to_end() {
        let endpoint = MockEndpoint::bind().await.expect("bind");
        let methods = Arc::new(Mutex::new(Vec::<String>::new()));
        let seen = Arc::clone(&methods);

        let connection = endpoint
            .connect(Box::new(move |command| {
                let method = command["method"].as_str().unwrap_or_default().to_string();
                seen.lock().push(method.clone());

                match method.as_str() {
                    "Page.navigate" => vec![
                        reply(command, json!({"frameId": "F1"})),
                        event("LayerTree.layerPainted", json!({"layerId": "1"}), Some("S1")),
                        event("LayerTree.layerPainted", json!({"layerId": "2"}), Some("S1")),
                        event("Page.loadEventFired", json!({"timestamp": 1.0}), Some("S1")),
                        event("LayerTree.layerPainted", json!({"layerId": "3"}), Some("S1")),
                    ],
                    "DOMSnapshot.captureSnapshot" => vec![reply(
                        command,
                        json!({
                            "documents": [{"layout": {"text": [0], "bounds": [[0, 0, 10, 5]]}}],
                            "strings": ["Hi"]
                        }),
                    )],
                    "LayerTree.makeSnapshot" => {
                        vec![reply(command, json!({"snapshotId": "snap"}))]
                    }
                    "LayerTree.snapshotCommandLog" => vec![reply(
                        command,
                        json!({"commandLog": [{"method": "drawTextBlob", "params": {"x": 1, "y": 1}}]}),
                    )],
                    "Tracing.end" => vec![
                        reply(command, json!({})),
                        event(
                            "Tracing.tracingComplete",
                            json!({"dataLossOccurred": false, "stream": "h1"}),
                            Some("S1"),
                        ),
                    ],
                    "IO.read" => vec![reply(
                        command,
                        json!({
                            "data": "{\"traceEvents\":[{\"name\":\"navigationStart\",\"ts\":0}]}",
                            "eof": true
                        }),
                    )],
                    _ => vec![reply(command, json!({}))],
                }
            }))
            .await
            .expect("connect");

        let tab = Tab::new(SessionId::new("S1"), TargetId::new("T1"), connection.clone());
        let router = tab.clone();
        connection.set_event_handler(Box::new(move |e: Event| router.dispatch(e)));

        let dir = TempDir::new().expect("temp dir");
        let config = CaptureConfig::default()
            .with_trace_dir(dir.path())
            .with_capture_timeout(Duration::from_secs(5));

        let raw = record(&tab, "https://example.com", &config)
            .await
            .expect("record");

        assert_eq!(raw.dom_snapshots.len(), 2);
        assert_eq!(raw.paint_logs.len(), 2);
        assert!(raw.paint_logs.iter().all(|p| !p.is_placeholder()));
        assert!(raw.trace_path.starts_with(dir.path()));
        assert!(raw.trace_path.exists());

        {
            let methods = methods.lock();
            let position = |name: &str| {
                methods
                    .iter()
                    .position(|m| m == name)
                    .unwrap_or_else(|| panic!("{name} not sent"))
            };
            let navigate = position("Page.navigate");
            assert!(position("Page.enable") < navigate);
            assert!(position("LayerTree.enable") < navigate);
            assert!(position("Emulation.setDeviceMetricsOverride") < navigate);
            assert!(position("Tracing.start") < navigate);
            assert!(position("Tracing.end") < position("Page.close"));
            assert_eq!(
                methods.iter().filter(|m| *m == "LayerTree.makeSnapshot").count(),
                2
            );
        }

        let viewport = raw.viewport;
        let analysis = PaintAnalysis::new(synchronize(raw).await.expect("sync"), viewport);
        assert_eq!(analysis.paint_count(), 2);

        let areas = analysis.valid_areas(1).expect("areas");
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].kind, AreaKind::Text);
        assert_eq!(areas[0].value.as_deref(), Some("Hi"));
        assert_eq!(
            (areas[0].left, areas[0].top, areas[0].right, areas[0].bottom),
            (0.0, 0.0, 10.0, 5.0)
        );
    }
}
