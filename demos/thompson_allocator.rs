//! Route simulated traffic across three conversion variants with Thompson sampling.

use bayesab::{BernoulliRateModel, ConjugatePosterior, PosteriorConfig, ThompsonAllocator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), bayesab::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Simulated true conversion rates.
    let variants = [("a", 0.04), ("b", 0.05), ("c", 0.07)];

    let mut alloc = ThompsonAllocator::with_seed(0);
    for (i, (name, _)) in variants.iter().enumerate() {
        let cfg = PosteriorConfig::for_bandit(i as u64);
        alloc.add_arm(BernoulliRateModel::with_config(*name, 1.0, 1.0, cfg)?)?;
    }

    // Separate RNG to simulate visitors.
    let mut env = StdRng::seed_from_u64(123);
    let mut picks = [0u64; 3];
    for t in 0..5_000u64 {
        let Some(sel) = alloc.select_arm() else {
            break;
        };
        picks[sel.index] += 1;
        let converted = env.random::<f64>() < variants[sel.index].1;
        alloc.update(&sel, if converted { 1.0 } else { 0.0 })?;

        if t % 1_000 == 0 {
            eprintln!("t={t:5} chosen={} phase={:?} picks={picks:?}", sel.name, sel.phase);
        }
    }

    for arm in alloc.arms() {
        let (a, b) = arm.model().shape();
        println!("{}: alpha={a} beta={b} mean={:.4}", arm.name(), arm.model().mean());
    }
    println!("picks={picks:?}");
    Ok(())
}
