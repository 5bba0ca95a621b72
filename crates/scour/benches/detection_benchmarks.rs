//! Detection performance benchmarks.
//!
//! Measures each built-in detector and the full engine pass across table sizes.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scour::detection::{
    AnomalyDetector, DataTypeMismatchDetector, Detector, DetectorRegistry, ErrorDetectionEngine,
    IncompleteDetector, MissingValueDetector,
};
use scour::table::{Table, ingest};
use scour::{DetectorDescriptor, Value};

/// Generate a table mixing numbers, categories, blanks and stray text.
fn generate_table(rows: usize, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let headers = vec![
        "age".to_string(),
        "income".to_string(),
        "city".to_string(),
        "flag".to_string(),
    ];

    let data = (0..rows)
        .map(|_| {
            let age = match rng.gen_range(0..100) {
                0..=2 => Value::Null,
                3..=4 => Value::Text("unknown".to_string()),
                5 => Value::Number(rng.gen_range(500.0..1000.0)),
                _ => Value::Number(rng.gen_range(18.0..90.0)),
            };
            let income = Value::Number(rng.gen_range(10_000.0..200_000.0));
            let city = Value::Text(format!("City_{}", rng.gen_range(0..50)));
            let flag = Value::Bool(rng.gen_bool(0.5));
            vec![age, income, city, flag]
        })
        .collect();

    ingest(headers, data)
}

fn bench_detectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("detectors");
    let detectors: Vec<(&str, Arc<dyn Detector>)> = vec![
        ("missing_value", Arc::new(MissingValueDetector)),
        ("data_type_mismatch", Arc::new(DataTypeMismatchDetector)),
        ("anomaly", Arc::new(AnomalyDetector::default())),
        ("incomplete", Arc::new(IncompleteDetector::default())),
    ];

    for rows in [1_000, 10_000] {
        let table = generate_table(rows, 42);
        group.throughput(Throughput::Elements(rows as u64));
        for (name, detector) in &detectors {
            group.bench_with_input(BenchmarkId::new(*name, rows), &table, |b, table| {
                b.iter(|| detector.detect(black_box(table)))
            });
        }
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    let registry = DetectorRegistry::with_defaults();
    let descriptors = DetectorDescriptor::defaults();

    for rows in [1_000, 10_000, 50_000] {
        let table = generate_table(rows, 7);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("all_detectors", rows), &table, |b, table| {
            b.iter(|| {
                ErrorDetectionEngine::run_descriptors(black_box(table), &registry, &descriptors)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detectors, bench_engine);
criterion_main!(benches);
