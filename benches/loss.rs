use bayesab::{
    multi_treatment_test, pairwise_test, BernoulliRateModel, ConjugatePosterior,
    ExpectedLossConfig, PosteriorConfig,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn sampled(name: String, seed: u64, successes: u64, trials: u64) -> BernoulliRateModel {
    let mut m = BernoulliRateModel::with_config(name, 1.0, 1.0, PosteriorConfig::seeded(seed))
        .unwrap();
    m.update(successes, trials).unwrap();
    m
}

fn bench_loss(c: &mut Criterion) {
    let cfg = ExpectedLossConfig::new(0.01);
    let ctrl = sampled("ctrl".to_string(), 0, 50, 500);

    let treat = sampled("treat".to_string(), 1, 80, 500);
    c.bench_function("pairwise/100k", |b| {
        b.iter(|| black_box(pairwise_test(&ctrl, &treat, cfg).unwrap()))
    });

    let mut group = c.benchmark_group("multi_treatment/100k");
    for &k in &[2usize, 4, 8] {
        let ts: Vec<BernoulliRateModel> = (0..k)
            .map(|j| sampled(format!("t{j}"), j as u64 + 1, 55 + 5 * j as u64, 500))
            .collect();
        let refs: Vec<&BernoulliRateModel> = ts.iter().collect();
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &_k| {
            b.iter(|| black_box(multi_treatment_test(&ctrl, black_box(refs.as_slice()), cfg).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_loss);
criterion_main!(benches);
