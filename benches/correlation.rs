//! Correlation table benchmark suite.
//!
//! Benchmarks the allocate/fulfill hot path at different in-flight depths.
//!
//! Run with: cargo bench --bench correlation
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;

use cdp_client::transport::CorrelationTable;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const IN_FLIGHT_DEPTHS: &[usize] = &[1, 16, 128];

// ============================================================================
// Benchmark: Allocate + Fulfill Round Trip
// ============================================================================

fn bench_allocate_fulfill(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate_fulfill");

    for &depth in IN_FLIGHT_DEPTHS {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let table = CorrelationTable::new();
                let mut slots = Vec::with_capacity(depth);

                for _ in 0..depth {
                    slots.push(table.allocate("Page.navigate"));
                }
                for (id, _rx) in &slots {
                    table.fulfill(*id, json!({"frameId": "F1"}));
                }

                assert!(table.is_empty());
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Drain Under Load
// ============================================================================

fn bench_drain_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_all");

    for &depth in IN_FLIGHT_DEPTHS {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let table = CorrelationTable::new();
                let slots: Vec<_> = (0..depth).map(|_| table.allocate("Page.enable")).collect();

                assert_eq!(table.drain_all(), depth);
                drop(slots);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_allocate_fulfill, bench_drain_all);
criterion_main!(benches);
