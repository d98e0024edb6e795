use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vantage_core::models::{ConfidenceLevel, VariantCounts};
use vantage_evaluator::SignificanceEvaluator;

fn bench_evaluate(c: &mut Criterion) {
    let evaluator = SignificanceEvaluator::default();
    let counts = VariantCounts::new(100_000, 10_000, 100_000, 10_450);

    c.bench_function("evaluate_100k_per_arm", |b| {
        b.iter(|| {
            evaluator
                .evaluate(black_box(&counts), ConfidenceLevel::NinetyFive)
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
