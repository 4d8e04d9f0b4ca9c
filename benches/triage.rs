//! Performance benchmarks for a3s-watch
//!
//! Run with: cargo bench

use a3s_watch::{
    categorize, filtered_alerts, filtered_logs, severity, triage_all, AlertType, Decision,
    FilterState, LogEntry, LogKind, LogMonitor, MemoryLogSource, Selection, Severity,
};
use criterion::{criterion_group, criterion_main, Criterion};

const REASONS: [&str; 6] = [
    "prompt injection detected",
    "pii in response",
    "canary token echoed",
    "unusual request volume",
    "policy threshold",
    "",
];

fn synthetic_logs(count: usize) -> Vec<LogEntry> {
    (0..count)
        .map(|i| {
            let decision = if i % 3 == 0 {
                Decision::Allow
            } else {
                Decision::Block
            };
            LogEntry::new(i.to_string())
                .with_query(format!("query number {}", i))
                .with_decision(decision)
                .with_reason(REASONS[i % REASONS.len()])
                .with_stopped_by(if i % 4 == 0 { "retrieval_guard" } else { "input_scanner" })
                .with_kind(if i % 5 == 0 { "ingestion" } else { "query" })
                .with_timestamp("2025-01-01T12:00:00Z")
        })
        .collect()
}

fn bench_ladders(c: &mut Criterion) {
    c.bench_function("categorize (first rung)", |b| {
        b.iter(|| categorize("Canary token leaked", "output_filter"));
    });

    c.bench_function("categorize (fallthrough)", |b| {
        b.iter(|| categorize("rate limit exceeded on upstream", "gateway"));
    });

    c.bench_function("severity (fallthrough)", |b| {
        b.iter(|| severity("rate limit exceeded on upstream", "gateway"));
    });
}

fn bench_triage_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("triage_all");
    for count in [100, 1000, 10000] {
        let logs = synthetic_logs(count);
        group.bench_function(format!("{} entries", count), |b| {
            b.iter(|| triage_all(&logs));
        });
    }
    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let logs = synthetic_logs(10000);
    let alerts = triage_all(&logs);

    let open = FilterState::default();
    c.bench_function("filtered_logs (no filters)", |b| {
        b.iter(|| filtered_logs(&logs, &open));
    });

    let narrow = FilterState {
        log_type: Selection::Only(LogKind::Retrieval),
        decision: Selection::Only(Decision::Block),
        search: "Injection".to_string(),
        alert_type: Selection::Only(AlertType::Jailbreak),
        severity: Selection::Only(Severity::Critical),
    };
    c.bench_function("filtered_logs (all filters)", |b| {
        b.iter(|| filtered_logs(&logs, &narrow));
    });

    c.bench_function("filtered_alerts (all filters)", |b| {
        b.iter(|| filtered_alerts(&alerts, &narrow));
    });
}

fn bench_decode(c: &mut Criterion) {
    let body = serde_json::to_vec(&synthetic_logs(1000)).unwrap();
    c.bench_function("decode 1000 entries", |b| {
        b.iter(|| a3s_watch::decode_logs(&body).unwrap());
    });
}

fn bench_monitor_refresh(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let monitor = LogMonitor::new(MemoryLogSource::new(synthetic_logs(1000)));

    c.bench_function("LogMonitor refresh (1000 entries)", |b| {
        b.to_async(&rt)
            .iter(|| async { monitor.refresh().await.unwrap() });
    });

    rt.block_on(async { monitor.refresh().await.unwrap() });
    c.bench_function("LogMonitor view (1000 entries)", |b| {
        b.to_async(&rt).iter(|| async { monitor.view().await });
    });
}

criterion_group!(
    benches,
    bench_ladders,
    bench_triage_throughput,
    bench_filters,
    bench_decode,
    bench_monitor_refresh,
);
criterion_main!(benches);
