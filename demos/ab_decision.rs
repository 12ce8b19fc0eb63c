//! Compare a control against two treatments with the expected-loss rule.
//!
//! Run with `RUST_LOG=bayesab=debug` to see the decision events.

use bayesab::{
    multi_treatment_test, pairwise_test, BernoulliRateModel, ConjugatePosterior,
    ExpectedLossConfig, PosteriorConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), bayesab::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut ctrl = BernoulliRateModel::with_config("ctrl", 1.0, 1.0, PosteriorConfig::seeded(1))?;
    let mut treat_a =
        BernoulliRateModel::with_config("treat_a", 1.0, 1.0, PosteriorConfig::seeded(2))?;
    let mut treat_b =
        BernoulliRateModel::with_config("treat_b", 1.0, 1.0, PosteriorConfig::seeded(3))?;

    ctrl.update(50, 500)?;
    treat_a.update(80, 500)?;
    treat_b.update(65, 500)?;

    for m in [&ctrl, &treat_a, &treat_b] {
        let (lo, hi) = m.hdi(0.95)?;
        println!("{m}  mean={:.4}  95% HDI=[{lo:.4}, {hi:.4}]", m.mean());
    }

    let cfg = ExpectedLossConfig::new(0.01);
    let pair = pairwise_test(&ctrl, &treat_a, cfg)?;
    println!(
        "pairwise: chose {} (expected loss {:.6})",
        pair.chosen, pair.expected_losses[0]
    );

    let multi = multi_treatment_test(&ctrl, &[&treat_a, &treat_b], cfg)?;
    println!(
        "multi: chose {} (losses {:?}, P(best) {:?})",
        multi.chosen, multi.expected_losses, multi.prob_best
    );
    Ok(())
}
