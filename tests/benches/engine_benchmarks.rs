//! # Tudu Engine Benchmarks
//!
//! | Component | Operation | Target |
//! |-----------|-----------|--------|
//! | td-05 Reputation Guard | Window selection + average over full history | < 1ms for 10k ratings |
//! | td-01 Escrow Ledger | Hold then release against the in-memory processor | < 100µs |
//! | td-03 Project Lifecycle | Create to Completed, one applicant | < 1ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_types::{ManualTimeSource, ProjectId, UserId};
use std::sync::Arc;
use std::time::Duration;
use td_01_escrow_ledger::{EscrowConfig, EscrowLedger, EscrowLedgerApi, InMemoryPaymentProcessor};
use td_05_reputation_guard::{rolling_average, select_window, ReceivedRating};
use td_tests::integration::Harness;

// ============================================================================
// TD-05: Reputation window
// ============================================================================

fn bench_reputation_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("td-05-reputation-window");
    let mut rng = rand::thread_rng();

    for size in [10usize, 100, 1_000, 10_000] {
        let history: Vec<ReceivedRating> = (0..size as u64)
            .map(|i| ReceivedRating {
                stars: rng.gen_range(1..=5),
                created_at: rng.gen_range(0..1_000_000),
                sequence: i,
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("window_5", size), &history, |b, h| {
            b.iter(|| {
                let window = select_window(black_box(h.clone()), 5);
                black_box(rolling_average(&window))
            })
        });
    }
    group.finish();
}

// ============================================================================
// TD-01: Escrow custody
// ============================================================================

fn bench_escrow_hold_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("td-01-escrow");
    group.measurement_time(Duration::from_secs(5));
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    let ledger = Arc::new(EscrowLedger::new(
        EscrowConfig::default(),
        Arc::new(InMemoryPaymentProcessor::new()),
        Arc::new(ManualTimeSource::new(0)),
    ));
    let (payer, payee) = (UserId::new(), UserId::new());

    group.bench_function("hold_then_release", |b| {
        b.to_async(&runtime).iter(|| {
            let ledger = Arc::clone(&ledger);
            async move {
                let project = ProjectId::new();
                ledger.hold(project, payer, payee, 1_000).await.unwrap();
                black_box(ledger.release(project).await.unwrap())
            }
        })
    });
    group.finish();
}

// ============================================================================
// TD-03: Full project lifecycle
// ============================================================================

fn bench_project_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("td-03-lifecycle");
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let harness = Arc::new(Harness::new());

    group.bench_function("create_to_completed", |b| {
        b.to_async(&runtime).iter(|| {
            let harness = Arc::clone(&harness);
            async move {
                black_box(
                    harness
                        .completed_project(UserId::new(), UserId::new(), 250)
                        .await,
                )
            }
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_reputation_window,
    bench_escrow_hold_release,
    bench_project_lifecycle
);
criterion_main!(benches);
