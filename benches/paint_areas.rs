//! Paint area benchmark suite.
//!
//! Benchmarks the post-run analysis on synthetic captures:
//! - Text node counts: 100, 1000, 5000
//! - Commands per paint log: 200, 2000
//!
//! Run with: cargo bench --bench paint_areas
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;

use paint_timeline::analysis::{extract_areas, resolve, synchronize_streams};
use paint_timeline::capture::{
    DomSnapshot, DomSnapshotEntry, LayoutTable, PaintCommand, PaintLogEntry,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const NODE_COUNTS: &[usize] = &[100, 1000, 5000];
const COMMAND_COUNTS: &[usize] = &[200, 2000];
const SNAPSHOT_COUNT: usize = 500;

// ============================================================================
// Fixtures
// ============================================================================

/// Layout where every third node carries text.
fn snapshot(nodes: usize) -> DomSnapshot {
    let mut state = 0x2545_f491_4f6c_dd1d_u64;
    let mut coord = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 % 1200.0
    };

    DomSnapshot {
        strings: (0..nodes).map(|i| format!("node {i}")).collect(),
        layout: LayoutTable {
            text: (0..nodes)
                .map(|i| if i % 3 == 0 { i as i64 } else { -1 })
                .collect(),
            bounds: (0..nodes).map(|_| [coord(), coord(), 40.0, 12.0]).collect(),
        },
    }
}

/// Paint log cycling through every command kind.
fn commands(count: usize) -> Vec<PaintCommand> {
    (0..count)
        .map(|i| {
            let at = (i % 1200) as f64;
            let rect = json!({"left": at, "top": at, "right": at + 10.0, "bottom": at + 10.0});
            match i % 5 {
                0 => PaintCommand::new("drawRect", json!({ "rect": rect })),
                1 => PaintCommand::new("drawRRect", json!({ "rrect": rect })),
                2 => PaintCommand::new("drawImageRect", json!({ "dst": rect })),
                3 => PaintCommand::new("drawTextBlob", json!({"x": at, "y": at})),
                _ => PaintCommand::new("save", json!({})),
            }
        })
        .collect()
}

fn trace_json(events: usize) -> String {
    let mut trace_events = vec![json!({"name": "navigationStart", "ts": 1_000_000})];
    trace_events.extend((0..events).map(|i| json!({"name": "Paint", "ts": 2_000_000 - i})));
    json!({ "traceEvents": trace_events }).to_string()
}

// ============================================================================
// Benchmark: Text Resolution
// ============================================================================

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for &nodes in NODE_COUNTS {
        let snapshot = snapshot(nodes);
        group.bench_with_input(BenchmarkId::new("nodes", nodes), &snapshot, |b, s| {
            b.iter(|| resolve((600.0, 400.0), &s.layout));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Area Extraction
// ============================================================================

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_areas");
    let snapshot = snapshot(1000);

    for &count in COMMAND_COUNTS {
        let log = commands(count);
        group.bench_with_input(BenchmarkId::new("commands", count), &log, |b, log| {
            b.iter(|| extract_areas(Some(&snapshot), log));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Synchronization
// ============================================================================

fn bench_synchronize(c: &mut Criterion) {
    let trace = trace_json(10_000);
    let dom: Vec<DomSnapshotEntry> = (0..SNAPSHOT_COUNT)
        .map(|i| DomSnapshotEntry::placeholder(5_000.0 - i as f64))
        .collect();
    let paint: Vec<PaintLogEntry> = (0..SNAPSHOT_COUNT)
        .map(|i| PaintLogEntry::captured(5_000.0 - i as f64, commands(20)))
        .collect();

    c.bench_function("synchronize_streams", |b| {
        b.iter(|| synchronize_streams(&trace, dom.clone(), paint.clone(), 4_000.0));
    });
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(benches, bench_resolve, bench_extract, bench_synchronize);
criterion_main!(benches);
