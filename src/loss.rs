//! Expected-loss decision rule for control vs. treatment comparisons.
//!
//! All comparisons read the models' cached bulk samples and treat index `i` of
//! every vector as one hypothetical world (paired Monte Carlo draws). Vectors in
//! one comparison must therefore have equal length.
//!
//! - [`pairwise_test`]: adopt the treatment iff
//!   `mean_i(max(control[i] - treatment[i], min_diff)) < epsilon`.
//! - [`multi_treatment_test`]: gate every treatment on the same rule, then pick the
//!   gate-passing treatment with the highest probability of being the best treatment.

use tracing::debug;

use crate::error::{Error, Result};
use crate::posterior::ConjugatePosterior;

/// Thresholds for the expected-loss rule.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpectedLossConfig {
    /// Risk tolerance: the largest expected loss accepted when switching to a treatment.
    pub epsilon: f64,
    /// Floor applied to each per-draw loss. `0.0` tests "treatment > control";
    /// a positive value demands that much uplift.
    pub min_diff: f64,
}

impl ExpectedLossConfig {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            min_diff: 0.0,
        }
    }

    pub fn with_min_diff(mut self, min_diff: f64) -> Self {
        self.min_diff = min_diff;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "epsilon must be finite, got {}",
                self.epsilon
            )));
        }
        if !self.min_diff.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "min_diff must be finite, got {}",
                self.min_diff
            )));
        }
        Ok(())
    }
}

/// Which side of a comparison won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Winner {
    /// No treatment was safe enough to adopt.
    Control,
    /// Adopt the treatment at this position in the treatment list.
    Treatment(usize),
}

/// Outcome of an expected-loss comparison, with the numbers behind it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LossDecision {
    pub winner: Winner,
    /// Name of the winning model.
    pub chosen: String,
    /// Expected loss of each treatment against the control.
    pub expected_losses: Vec<f64>,
    /// Whether each treatment passed the `expected_loss < epsilon` gate.
    pub passed: Vec<bool>,
    /// Per-treatment probability of being the best treatment.
    ///
    /// `None` when no treatment passed the gate (the estimate is never needed).
    pub prob_best: Option<Vec<f64>>,
}

impl LossDecision {
    /// True when a treatment replaces the control.
    pub fn adopts_treatment(&self) -> bool {
        matches!(self.winner, Winner::Treatment(_))
    }
}

fn check_paired(n: usize, got: usize) -> Result<()> {
    if n != got {
        return Err(Error::SampleLengthMismatch { expected: n, got });
    }
    Ok(())
}

/// Monte Carlo expected loss of choosing `treatment` over `control`:
/// `mean_i(max(control[i] - treatment[i], min_diff))`.
pub fn expected_loss(control: &[f64], treatment: &[f64], min_diff: f64) -> Result<f64> {
    if control.is_empty() {
        return Err(Error::EmptySamples);
    }
    check_paired(control.len(), treatment.len())?;
    let total: f64 = control
        .iter()
        .zip(treatment)
        .map(|(&c, &t)| (c - t).max(min_diff))
        .sum();
    Ok(total / control.len() as f64)
}

/// Fraction of draw indices at which each treatment is strictly greater than every
/// other treatment.
///
/// Draws from independently sampled models are paired by index and read as one joint
/// world. This is a Monte Carlo approximation of the probability of being best, not
/// a draw from a literal joint posterior.
///
/// A single treatment has probability `1.0`. Exact ties at the top count for nobody.
pub fn prob_best(treatments: &[&[f64]]) -> Result<Vec<f64>> {
    let first = treatments.first().ok_or(Error::NoTreatments)?;
    let n = first.len();
    if n == 0 {
        return Err(Error::EmptySamples);
    }
    for t in treatments {
        check_paired(n, t.len())?;
    }

    let mut wins = vec![0u64; treatments.len()];
    for i in 0..n {
        // Track the top two values; only the leader can beat "max of the others".
        let mut lead = 0usize;
        let mut top = f64::NEG_INFINITY;
        let mut runner_up = f64::NEG_INFINITY;
        for (j, t) in treatments.iter().enumerate() {
            let x = t[i];
            if x > top {
                runner_up = top;
                top = x;
                lead = j;
            } else if x > runner_up {
                runner_up = x;
            }
        }
        if top > runner_up {
            wins[lead] += 1;
        }
    }
    Ok(wins.into_iter().map(|w| w as f64 / n as f64).collect())
}

/// Decide between `control` and a single `treatment` from their cached samples.
pub fn pairwise_test<C, T>(
    control: &C,
    treatment: &T,
    cfg: ExpectedLossConfig,
) -> Result<LossDecision>
where
    C: ConjugatePosterior + ?Sized,
    T: ConjugatePosterior + ?Sized,
{
    cfg.validate()?;
    let loss = expected_loss(control.samples()?, treatment.samples()?, cfg.min_diff)?;
    let pass = loss < cfg.epsilon;
    let (winner, chosen) = if pass {
        (Winner::Treatment(0), treatment.name())
    } else {
        (Winner::Control, control.name())
    };
    debug!(
        control = control.name(),
        treatment = treatment.name(),
        expected_loss = loss,
        epsilon = cfg.epsilon,
        chosen,
        "pairwise expected-loss test"
    );
    Ok(LossDecision {
        winner,
        chosen: chosen.to_string(),
        expected_losses: vec![loss],
        passed: vec![pass],
        prob_best: None,
    })
}

/// Decide between `control` and several treatments from their cached samples.
///
/// 1. Gate every treatment on `expected_loss < epsilon` against the control.
/// 2. If none passes, keep the control.
/// 3. Otherwise return the passing treatment with the highest [`prob_best`]
///    (ties go to the earlier treatment).
pub fn multi_treatment_test<C, T>(
    control: &C,
    treatments: &[&T],
    cfg: ExpectedLossConfig,
) -> Result<LossDecision>
where
    C: ConjugatePosterior + ?Sized,
    T: ConjugatePosterior + ?Sized,
{
    cfg.validate()?;
    if treatments.is_empty() {
        return Err(Error::NoTreatments);
    }
    let base = control.samples()?;
    let draws: Vec<&[f64]> = treatments
        .iter()
        .map(|t| t.samples())
        .collect::<Result<_>>()?;

    let expected_losses: Vec<f64> = draws
        .iter()
        .map(|t| expected_loss(base, t, cfg.min_diff))
        .collect::<Result<_>>()?;
    let passed: Vec<bool> = expected_losses.iter().map(|&l| l < cfg.epsilon).collect();

    if !passed.iter().any(|&p| p) {
        debug!(
            control = control.name(),
            treatments = treatments.len(),
            epsilon = cfg.epsilon,
            "no treatment passed the expected-loss gate"
        );
        return Ok(LossDecision {
            winner: Winner::Control,
            chosen: control.name().to_string(),
            expected_losses,
            passed,
            prob_best: None,
        });
    }

    let probs = prob_best(&draws)?;
    let mut best: Option<usize> = None;
    for (j, &p) in probs.iter().enumerate() {
        if !passed[j] {
            continue;
        }
        if best.map_or(true, |b| p > probs[b]) {
            best = Some(j);
        }
    }
    let j = best.ok_or(Error::NoTreatments)?;
    let chosen = treatments[j].name().to_string();
    debug!(
        control = control.name(),
        chosen = %chosen,
        prob_best = probs[j],
        expected_loss = expected_losses[j],
        "multi-treatment expected-loss test"
    );
    Ok(LossDecision {
        winner: Winner::Treatment(j),
        chosen,
        expected_losses,
        passed,
        prob_best: Some(probs),
    })
}
