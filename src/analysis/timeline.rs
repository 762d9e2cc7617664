//! Clock reconciliation.
//!
//! Three clocks meet here:
//!
//! | Stream | Raw clock | Rebased to |
//! |--------|-----------|------------|
//! | Trace events | monotonic µs | ms since `navigationStart` |
//! | DOM snapshots | wall-clock ms | ms since navigation was initiated |
//! | Paint logs | wall-clock ms | ms since navigation was initiated |
//!
//! All three streams are then stable-sorted by their rebased timestamp.

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::capture::{DomSnapshotEntry, PaintLogEntry, RawCapture};
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Name of the trace event anchoring the timeline.
pub const NAVIGATION_START: &str = "navigationStart";

/// Trace clock units per millisecond.
const MICROS_PER_MILLI: f64 = 1000.0;

// ============================================================================
// Types
// ============================================================================

/// One trace event.
///
/// Only `name`, `ts` and `dur` are interpreted. Fields without a typed
/// member (`id`, `tts`, `s`, `bind_id`, ...) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Event name.
    #[serde(default)]
    pub name: String,
    /// Category list.
    #[serde(default)]
    pub cat: String,
    /// Phase.
    #[serde(default)]
    pub ph: String,
    /// Timestamp (raw µs, then ms since navigation start).
    #[serde(default)]
    pub ts: f64,
    /// Duration (raw µs, then ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dur: Option<f64>,
    /// Process ID.
    #[serde(default)]
    pub pid: u64,
    /// Thread ID.
    #[serde(default)]
    pub tid: u64,
    /// Event arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    /// Remaining fields, as found in the trace.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Trace JSON in either object or bare array format.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TraceFile {
    Object {
        #[serde(rename = "traceEvents")]
        trace_events: Vec<TraceEvent>,
    },
    Array(Vec<TraceEvent>),
}

/// The three streams on one navigation-relative millisecond axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    /// Trace events, sorted by `ts`.
    pub trace_events: Vec<TraceEvent>,
    /// DOM snapshots, sorted by `ts`.
    pub dom_snapshots: Vec<DomSnapshotEntry>,
    /// Paint logs, sorted by `ts`.
    pub paint_logs: Vec<PaintLogEntry>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses trace JSON.
///
/// # Errors
///
/// Returns [`Error::Json`] if the contents are not a trace.
pub fn parse_trace(contents: &str) -> Result<Vec<TraceEvent>> {
    let file: TraceFile = serde_json::from_str(contents)?;
    Ok(match file {
        TraceFile::Object { trace_events } => trace_events,
        TraceFile::Array(events) => events,
    })
}

/// Returns the raw timestamp of the first `navigationStart` event.
///
/// # Errors
///
/// Returns [`Error::MissingNavigationMarker`] if there is none.
pub fn navigation_start(events: &[TraceEvent]) -> Result<f64> {
    events
        .iter()
        .find(|e| e.name == NAVIGATION_START)
        .map(|e| e.ts)
        .ok_or(Error::MissingNavigationMarker)
}

// ============================================================================
// Synchronization
// ============================================================================

/// Rebases and sorts all three streams.
///
/// # Arguments
///
/// * `contents` - Raw trace JSON
/// * `dom_snapshots` / `paint_logs` - Wall-clock stamped captures
/// * `backend_start` - Wall-clock ms at which navigation was initiated
///
/// # Errors
///
/// - [`Error::Json`] if the trace cannot be parsed
/// - [`Error::MissingNavigationMarker`] if the trace has no anchor
pub fn synchronize_streams(
    contents: &str,
    mut dom_snapshots: Vec<DomSnapshotEntry>,
    mut paint_logs: Vec<PaintLogEntry>,
    backend_start: f64,
) -> Result<Timeline> {
    let mut trace_events = parse_trace(contents)?;
    let origin = navigation_start(&trace_events)?;

    for event in &mut trace_events {
        event.ts = (event.ts - origin) / MICROS_PER_MILLI;
        if let Some(dur) = event.dur.as_mut() {
            *dur /= MICROS_PER_MILLI;
        }
    }

    for entry in &mut dom_snapshots {
        entry.ts -= backend_start;
    }
    for entry in &mut paint_logs {
        entry.ts -= backend_start;
    }

    trace_events.sort_by(|a, b| a.ts.total_cmp(&b.ts));
    dom_snapshots.sort_by(|a, b| a.ts.total_cmp(&b.ts));
    paint_logs.sort_by(|a, b| a.ts.total_cmp(&b.ts));

    debug!(
        events = trace_events.len(),
        dom = dom_snapshots.len(),
        paint = paint_logs.len(),
        "Streams synchronized"
    );

    Ok(Timeline {
        trace_events,
        dom_snapshots,
        paint_logs,
    })
}

/// Reads a run's trace file, deletes it and synchronizes the run.
///
/// The trace file is removed as soon as it has been read, whether or not
/// synchronization succeeds.
///
/// # Errors
///
/// - [`Error::Io`] if the trace file cannot be read
/// - Any error of [`synchronize_streams`]
pub async fn synchronize(raw: RawCapture) -> Result<Timeline> {
    let contents = tokio::fs::read_to_string(&raw.trace_path).await?;
    remove_trace(&raw.trace_path).await;

    synchronize_streams(
        &contents,
        raw.dom_snapshots,
        raw.paint_logs,
        raw.backend_start,
    )
}

/// Deletes a consumed trace file.
async fn remove_trace(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "Trace file removed"),
        Err(e) => warn!(path = %path.display(), error = %e, "Trace file not removed"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::capture::{DomSnapshot, Viewport};

    fn trace(events: Value) -> String {
        json!({ "traceEvents": events, "metadata": {} }).to_string()
    }

    #[test]
    fn test_navigation_start_becomes_zero() {
        let contents = trace(json!([
            {"name": "TracingStartedInBrowser", "ph": "I", "ts": 1_000_000.0},
            {"name": "navigationStart", "ph": "R", "ts": 1_005_000.0},
            {"name": "Paint", "ph": "X", "ts": 1_020_000.0, "dur": 1500.0}
        ]));

        let timeline = synchronize_streams(&contents, Vec::new(), Vec::new(), 0.0).expect("sync");
        let names: Vec<_> = timeline.trace_events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["TracingStartedInBrowser", "navigationStart", "Paint"]);

        assert_eq!(timeline.trace_events[0].ts, -5.0);
        assert_eq!(timeline.trace_events[1].ts, 0.0);
        assert_eq!(timeline.trace_events[2].ts, 15.0);
        assert_eq!(timeline.trace_events[2].dur, Some(1.5));
    }

    #[test]
    fn test_first_navigation_start_wins() {
        let contents = trace(json!([
            {"name": "navigationStart", "ts": 2000.0},
            {"name": "navigationStart", "ts": 9000.0}
        ]));

        let timeline = synchronize_streams(&contents, Vec::new(), Vec::new(), 0.0).expect("sync");
        assert_eq!(timeline.trace_events[0].ts, 0.0);
        assert_eq!(timeline.trace_events[1].ts, 7.0);
    }

    #[test]
    fn test_missing_marker_is_fatal() {
        let contents = trace(json!([{"name": "Paint", "ts": 1.0}]));
        let result = synchronize_streams(&contents, Vec::new(), Vec::new(), 0.0);
        assert!(matches!(result, Err(Error::MissingNavigationMarker)));
    }

    #[test]
    fn test_array_format_accepted() {
        let contents = json!([{"name": "navigationStart", "ts": 10.0}]).to_string();
        let events = parse_trace(&contents).expect("parse");
        assert_eq!(events.len(), 1);
        assert_eq!(navigation_start(&events).expect("marker"), 10.0);
    }

    #[test]
    fn test_paint_logs_sorted_ascending() {
        let contents = trace(json!([{"name": "navigationStart", "ts": 0.0}]));
        let paint = vec![PaintLogEntry::placeholder(50.0), PaintLogEntry::placeholder(10.0)];

        let timeline = synchronize_streams(&contents, Vec::new(), paint, 0.0).expect("sync");
        let ts: Vec<f64> = timeline.paint_logs.iter().map(|p| p.ts).collect();
        assert_eq!(ts, [10.0, 50.0]);
    }

    #[test]
    fn test_dom_snapshots_sorted_ascending_and_stable() {
        let contents = trace(json!([{"name": "navigationStart", "ts": 0.0}]));
        let tagged = |ts: f64, tag: usize| {
            let snapshot = DomSnapshot {
                strings: vec![String::new(); tag],
                ..DomSnapshot::default()
            };
            DomSnapshotEntry::captured(ts, snapshot)
        };
        let dom = vec![
            tagged(40.0, 0),
            tagged(10.0, 1),
            tagged(40.0, 2),
            DomSnapshotEntry::placeholder(25.0),
            tagged(10.0, 3),
        ];

        let timeline = synchronize_streams(&contents, dom, Vec::new(), 0.0).expect("sync");
        let order: Vec<(f64, Option<usize>)> = timeline
            .dom_snapshots
            .iter()
            .map(|d| (d.ts, d.snapshot.as_ref().map(|s| s.strings.len())))
            .collect();
        assert_eq!(
            order,
            [
                (10.0, Some(1)),
                (10.0, Some(3)),
                (25.0, None),
                (40.0, Some(0)),
                (40.0, Some(2)),
            ]
        );
    }

    #[test]
    fn test_unknown_trace_fields_kept() {
        let contents = trace(json!([
            {"name": "navigationStart", "ts": 0.0, "tts": 12, "id": "0x1", "s": "t"}
        ]));

        let timeline = synchronize_streams(&contents, Vec::new(), Vec::new(), 0.0).expect("sync");
        let extra = &timeline.trace_events[0].extra;
        assert_eq!(extra.get("tts"), Some(&json!(12)));
        assert_eq!(extra.get("id"), Some(&json!("0x1")));
        assert_eq!(extra.get("s"), Some(&json!("t")));
        assert!(!extra.contains_key("ts"));
    }

    #[test]
    fn test_captures_rebased_to_backend_start() {
        let contents = trace(json!([{"name": "navigationStart", "ts": 0.0}]));
        let dom = vec![DomSnapshotEntry::placeholder(1_700_000_000_250.0)];

        let timeline =
            synchronize_streams(&contents, dom, Vec::new(), 1_700_000_000_000.0).expect("sync");
        assert_eq!(timeline.dom_snapshots[0].ts, 250.0);
    }

    #[tokio::test]
    async fn test_trace_file_removed_after_read() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("trace.json");
        std::fs::write(&path, trace(json!([{"name": "navigationStart", "ts": 0.0}])))
            .expect("write trace");

        let raw = RawCapture {
            dom_snapshots: Vec::new(),
            paint_logs: vec![PaintLogEntry::placeholder(5.0)],
            trace_path: path.clone(),
            backend_start: 0.0,
            viewport: Viewport::new(1200, 800),
        };

        let timeline = synchronize(raw).await.expect("sync");
        assert_eq!(timeline.paint_logs.len(), 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_trace_file_removed_even_without_marker() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("trace.json");
        std::fs::write(&path, trace(json!([]))).expect("write trace");

        let raw = RawCapture {
            dom_snapshots: Vec::new(),
            paint_logs: Vec::new(),
            trace_path: path.clone(),
            backend_start: 0.0,
            viewport: Viewport::new(1200, 800),
        };

        assert!(matches!(
            synchronize(raw).await,
            Err(Error::MissingNavigationMarker)
        ));
        assert!(!path.exists());
    }

    proptest! {
        #[test]
        fn prop_streams_sorted_and_stable(stamps in prop::collection::vec(0u32..50, 0..40)) {
            let contents = trace(json!([{"name": "navigationStart", "ts": 0.0}]));
            // Tag each entry with its input position through its command count.
            let paint: Vec<PaintLogEntry> = stamps
                .iter()
                .enumerate()
                .map(|(i, ts)| {
                    let commands = vec![crate::capture::PaintCommand::new("save", Value::Null); i];
                    PaintLogEntry::captured(f64::from(*ts), commands)
                })
                .collect();

            // Same trick for DOM snapshots, through the string table length.
            let dom: Vec<DomSnapshotEntry> = stamps
                .iter()
                .enumerate()
                .map(|(i, ts)| {
                    let snapshot = DomSnapshot {
                        strings: vec![String::new(); i],
                        ..DomSnapshot::default()
                    };
                    DomSnapshotEntry::captured(f64::from(*ts), snapshot)
                })
                .collect();

            let timeline = synchronize_streams(&contents, dom, paint, 0.0).expect("sync");
            for pair in timeline.paint_logs.windows(2) {
                prop_assert!(pair[0].ts <= pair[1].ts);
                if pair[0].ts == pair[1].ts {
                    prop_assert!(pair[0].commands().len() < pair[1].commands().len());
                }
            }

            let tag = |d: &DomSnapshotEntry| d.snapshot.as_ref().map_or(0, |s| s.strings.len());
            prop_assert_eq!(timeline.dom_snapshots.len(), stamps.len());
            for pair in timeline.dom_snapshots.windows(2) {
                prop_assert!(pair[0].ts <= pair[1].ts);
                if pair[0].ts == pair[1].ts {
                    prop_assert!(tag(&pair[0]) < tag(&pair[1]));
                }
            }
        }

        #[test]
        fn prop_trace_events_finite_and_ordered(
            raw in prop::collection::vec(0.0f64..1.0e9, 1..40),
            anchor in 0usize..40,
        ) {
            let anchor = anchor % raw.len();
            let events: Vec<Value> = raw
                .iter()
                .enumerate()
                .map(|(i, ts)| {
                    let name = if i == anchor { NAVIGATION_START } else { "Layout" };
                    json!({"name": name, "ts": ts})
                })
                .collect();

            let timeline = synchronize_streams(&trace(Value::Array(events)), Vec::new(), Vec::new(), 0.0)
                .expect("sync");

            prop_assert!(timeline.trace_events.iter().all(|e| e.ts.is_finite()));
            prop_assert!(timeline.trace_events.windows(2).all(|w| w[0].ts <= w[1].ts));
            let marker = timeline
                .trace_events
                .iter()
                .find(|e| e.name == NAVIGATION_START)
                .expect("marker");
            prop_assert_eq!(marker.ts, 0.0);
        }
    }
}
