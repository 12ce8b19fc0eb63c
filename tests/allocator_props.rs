//! Property tests for the Thompson allocator state machine.

use bayesab::{
    BernoulliRateModel, ConjugatePosterior, PoissonRateModel, PosteriorConfig, SelectionPhase,
    ThompsonAllocator,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn allocator(k: usize, seed: u64) -> ThompsonAllocator {
    let mut t = ThompsonAllocator::with_seed(seed);
    for i in 0..k {
        let cfg = PosteriorConfig::for_bandit(seed.wrapping_add(i as u64));
        if i % 2 == 0 {
            t.add_arm(BernoulliRateModel::with_config(format!("arm{i}"), 1.0, 1.0, cfg).unwrap())
                .unwrap();
        } else {
            t.add_arm(PoissonRateModel::with_config(format!("arm{i}"), 1.0, 1.0, cfg).unwrap())
                .unwrap();
        }
    }
    t
}

proptest! {
    /// The first K selections visit every arm exactly once.
    #[test]
    fn priming_is_complete_and_non_repeating(k in 1usize..10, seed in any::<u64>()) {
        let mut t = allocator(k, seed);
        let mut seen = BTreeSet::new();
        for _ in 0..k {
            let s = t.select_arm().unwrap();
            prop_assert_eq!(s.phase, SelectionPhase::Priming);
            prop_assert!(seen.insert(s.index), "arm {} primed twice", s.name);
        }
        prop_assert_eq!(seen.len(), k);
        prop_assert!(t.is_primed());
        prop_assert_eq!(t.select_arm().unwrap().phase, SelectionPhase::Exploitation);
    }

    /// Exploitation returns the argmax of its own draws, lowest index on ties.
    #[test]
    fn exploitation_returns_argmax_of_draws(
        k in 1usize..8,
        seed in any::<u64>(),
        outcomes in proptest::collection::vec(0.0f64..1.0, 0..40),
    ) {
        let mut t = allocator(k, seed);
        for _ in 0..k {
            t.select_arm();
        }
        for (i, &o) in outcomes.iter().enumerate() {
            t.update(i % k, o).unwrap();
        }
        for _ in 0..5 {
            let s = t.select_arm().unwrap();
            let draws = s.draws.clone().unwrap();
            prop_assert_eq!(draws.len(), k);
            let max = draws.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let first = draws.iter().position(|&x| x == max).unwrap();
            prop_assert_eq!(s.index, first);
            prop_assert_eq!(&s.name, &format!("arm{first}"));
        }
    }

    /// Shape parameters stay positive through any sequence of valid feedback.
    #[test]
    fn feedback_keeps_shapes_positive(
        seed in any::<u64>(),
        feedback in proptest::collection::vec((0usize..4, 0.0f64..1.0, 0u64..50), 0..60),
    ) {
        let mut t = allocator(4, seed);
        for (arm, outcome, n) in feedback {
            t.update(arm, outcome).unwrap();
            t.update_counts(arm, n / 2, n).unwrap();
        }
        for arm in t.arms() {
            let (a, b) = arm.model().shape();
            prop_assert!(a > 0.0 && b > 0.0 && a.is_finite() && b.is_finite());
        }
    }

    /// Same seed, same feedback: same choices.
    #[test]
    fn selection_is_reproducible(k in 1usize..6, seed in any::<u64>(), rounds in 1usize..30) {
        let mut t1 = allocator(k, seed);
        let mut t2 = allocator(k, seed);
        for r in 0..rounds {
            let a = t1.select_arm().unwrap();
            let b = t2.select_arm().unwrap();
            prop_assert_eq!(&a, &b);
            let o = (r % 3) as f64 / 2.0;
            t1.update(&a, o).unwrap();
            t2.update(&b, o).unwrap();
        }
    }
}
