//! Highest-density intervals over empirical samples.
//!
//! Models hand their cached draws to [`hdi`] and treat the result as opaque.
//! The interval is the narrowest window of the sorted draws that contains
//! `floor(mass * n)` steps, the usual empirical HDI for unimodal posteriors.

use crate::error::{Error, Result};

/// Narrowest interval containing `mass` of the empirical distribution of `samples`.
///
/// - `mass` must lie strictly inside `(0, 1)`.
/// - Non-finite draws are rejected.
/// - Ties between equally narrow windows resolve to the leftmost one.
pub fn hdi(samples: &[f64], mass: f64) -> Result<(f64, f64)> {
    if !(mass.is_finite() && mass > 0.0 && mass < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "hdi mass must be in (0, 1), got {mass}"
        )));
    }
    if samples.is_empty() {
        return Err(Error::EmptySamples);
    }
    if samples.iter().any(|x| !x.is_finite()) {
        return Err(Error::InvalidParameter(
            "hdi samples must be finite".to_string(),
        ));
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let included = ((mass * n as f64).floor() as usize).min(n - 1);
    let n_windows = n - included;

    let mut best = 0usize;
    let mut best_width = f64::INFINITY;
    for i in 0..n_windows {
        let width = sorted[i + included] - sorted[i];
        if width < best_width {
            best_width = width;
            best = i;
        }
    }
    Ok((sorted[best], sorted[best + included]))
}
