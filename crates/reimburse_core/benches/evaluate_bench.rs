use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use reimburse_core::{derive_features, Engine, RoundingMode, TreeModel, TripInput};

const TRIP_COUNT: usize = 1_000;

fn generate_trips(count: usize) -> Vec<TripInput> {
    (0..count)
        .map(|idx| {
            let days = (idx % 14 + 1) as f64;
            let miles = ((idx * 137) % 1_500) as f64;
            let receipts = ((idx * 7_919) % 250_000) as f64 / 100.0;
            TripInput::new(days, miles, receipts)
        })
        .collect()
}

fn benchmark_feature_derivation(c: &mut Criterion) {
    let trips = generate_trips(TRIP_COUNT);

    let mut group = c.benchmark_group("features");
    group.throughput(Throughput::Elements(TRIP_COUNT as u64));
    group.bench_function("derive_1000_trips", |b| {
        b.iter(|| {
            for trip in &trips {
                black_box(derive_features(trip.duration, trip.distance, trip.amount));
            }
        });
    });
    group.finish();
}

fn benchmark_evaluation(c: &mut Criterion) {
    let engine = Engine::embedded().expect("embedded model");
    let model = TreeModel::embedded().expect("embedded model");
    let trips = generate_trips(TRIP_COUNT);
    let features: Vec<_> = trips
        .iter()
        .map(|t| derive_features(t.duration, t.distance, t.amount))
        .collect();

    let mut group = c.benchmark_group("evaluate");
    group.throughput(Throughput::Elements(TRIP_COUNT as u64));
    group.bench_function("tree_walk_1000_trips", |b| {
        b.iter(|| {
            for fv in &features {
                black_box(model.tree.find_leaf(fv).ok());
            }
        });
    });
    group.bench_function("rounded_1000_trips", |b| {
        b.iter(|| {
            for fv in &features {
                black_box(model.tree.evaluate(fv, RoundingMode::HalfEven).ok());
            }
        });
    });
    group.bench_function("engine_1000_trips", |b| {
        b.iter(|| {
            for trip in &trips {
                black_box(engine.evaluate(trip).ok());
            }
        });
    });
    group.finish();
}

fn benchmark_model_hash(c: &mut Criterion) {
    let model = TreeModel::embedded().expect("embedded model");
    c.bench_function("model_hash_hex", |b| b.iter(|| black_box(model.hash_hex().ok())));
}

criterion_group!(
    benches,
    benchmark_feature_derivation,
    benchmark_evaluation,
    benchmark_model_hash
);
criterion_main!(benches);
