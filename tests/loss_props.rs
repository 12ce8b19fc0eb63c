//! Property tests for the expected-loss rule over real posterior draws.

use bayesab::{
    expected_loss, multi_treatment_test, pairwise_test, BernoulliRateModel, ConjugatePosterior,
    ExpectedLossConfig, PosteriorConfig, Winner,
};
use proptest::prelude::*;

fn model(name: &str, seed: u64, successes: u64, trials: u64) -> BernoulliRateModel {
    let cfg = PosteriorConfig {
        bulk_draws: 2_000,
        refresh_on_update: true,
        seed,
    };
    let mut m = BernoulliRateModel::with_config(name, 1.0, 1.0, cfg).unwrap();
    m.update(successes, trials).unwrap();
    m
}

fn counts() -> impl Strategy<Value = (u64, u64)> {
    (1u64..500).prop_flat_map(|trials| (0..=trials, Just(trials)))
}

proptest! {
    /// The pairwise winner is exactly the `loss < epsilon` gate.
    #[test]
    fn pairwise_matches_gate(
        (cs, ct) in counts(),
        (ts, tt) in counts(),
        eps in 0.0f64..0.05,
        min_diff in 0.0f64..0.05,
        seed in any::<u64>(),
    ) {
        let c = model("c", seed, cs, ct);
        let t = model("t", seed.wrapping_add(1), ts, tt);
        let cfg = ExpectedLossConfig::new(eps).with_min_diff(min_diff);
        let d = pairwise_test(&c, &t, cfg).unwrap();
        let loss = expected_loss(c.samples().unwrap(), t.samples().unwrap(), min_diff).unwrap();
        prop_assert_eq!(d.expected_losses[0], loss);
        prop_assert_eq!(d.adopts_treatment(), loss < eps);
        prop_assert_eq!(d.chosen.as_str(), if loss < eps { "t" } else { "c" });
    }

    /// A multi-treatment winner always passed the gate, and has the top
    /// best-probability among those that did.
    #[test]
    fn multi_winner_passed_gate_and_leads(
        control in counts(),
        ts in proptest::collection::vec(counts(), 1..5),
        eps in 0.0f64..0.05,
        seed in any::<u64>(),
    ) {
        let c = model("c", seed, control.0, control.1);
        let treatments: Vec<BernoulliRateModel> = ts
            .iter()
            .enumerate()
            .map(|(j, &(s, n))| model(&format!("t{j}"), seed.wrapping_add(j as u64 + 1), s, n))
            .collect();
        let refs: Vec<&BernoulliRateModel> = treatments.iter().collect();
        let d = multi_treatment_test(&c, &refs, ExpectedLossConfig::new(eps)).unwrap();

        prop_assert_eq!(d.passed.len(), refs.len());
        match d.winner {
            Winner::Control => {
                prop_assert!(d.passed.iter().all(|&p| !p));
                prop_assert_eq!(d.chosen.as_str(), "c");
            }
            Winner::Treatment(j) => {
                prop_assert!(d.passed[j]);
                let probs = d.prob_best.clone().unwrap();
                let sum: f64 = probs.iter().sum();
                prop_assert!(sum <= 1.0 + 1e-9);
                for (k, &p) in probs.iter().enumerate() {
                    if d.passed[k] {
                        prop_assert!(p <= probs[j]);
                    }
                }
                prop_assert_eq!(d.chosen.clone(), format!("t{j}"));
            }
        }
    }
}
