//! Conjugate posterior models for rates.
//!
//! Two variants share the [`ConjugatePosterior`] contract:
//! - [`BernoulliRateModel`]: Beta posterior over a rate in `[0, 1]` (conversion, click-through).
//! - [`PoissonRateModel`]: Gamma posterior over a non-negative rate (arrivals per interval),
//!   parameterized by shape `alpha` and rate `beta` (scale `1 / beta`).
//!
//! Each model owns a seedable RNG derived from its configured seed and its name:
//! the same name, seed, prior, and update sequence always produce the same draws,
//! while differently named models draw independent streams even under one seed.
//!
//! Sampling comes in two modes:
//! - [`ConjugatePosterior::draw`]: one transient draw (arm selection).
//! - [`ConjugatePosterior::sample`]: a bulk draw that is cached on the model until the
//!   next update, and is what [`hdi`](ConjugatePosterior::hdi) and the expected-loss
//!   evaluator read.

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Beta, Distribution, Gamma};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::interval;
use crate::stable_hash::stable_hash64;

/// Default number of draws for a bulk refresh.
pub const DEFAULT_BULK_DRAWS: usize = 100_000;

/// Sampling configuration shared by both model variants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PosteriorConfig {
    /// Number of draws taken by [`ConjugatePosterior::refresh`] (must be > 0).
    pub bulk_draws: usize,
    /// Redraw the cached sample set after every update.
    ///
    /// When `false`, an update drops the cache instead; the next
    /// [`samples`](ConjugatePosterior::samples) call fails until the caller
    /// refreshes. Bandit loops that only ever need single draws want `false`.
    pub refresh_on_update: bool,
    /// Seed for the model's RNG. Mixed with the model name, so distinct models
    /// sharing a seed still get independent streams.
    pub seed: u64,
}

impl Default for PosteriorConfig {
    fn default() -> Self {
        Self {
            bulk_draws: DEFAULT_BULK_DRAWS,
            refresh_on_update: true,
            seed: 0,
        }
    }
}

impl PosteriorConfig {
    /// Defaults, with a specific seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Configuration for bandit arms: single draws only, no bulk refresh on update.
    pub fn for_bandit(seed: u64) -> Self {
        Self {
            refresh_on_update: false,
            seed,
            ..Self::default()
        }
    }
}

/// Common contract for conjugate rate posteriors.
///
/// The trait is object safe; the allocator stores arms as
/// `Box<dyn ConjugatePosterior>` so Beta and Gamma arms can share one registry.
pub trait ConjugatePosterior: fmt::Debug {
    /// Unique model name.
    fn name(&self) -> &str;

    /// Current shape parameters `(alpha, beta)`. Both are always finite and > 0.
    fn shape(&self) -> (f64, f64);

    /// Posterior mean.
    fn mean(&self) -> f64;

    /// Count update: `hits` successes/events out of `exposures` trials/intervals.
    ///
    /// A rejected update leaves the model unchanged.
    fn update(&mut self, hits: u64, exposures: u64) -> Result<()>;

    /// Single-outcome update (one trial or one interval).
    fn observe(&mut self, outcome: f64) -> Result<()>;

    /// One transient draw from the current posterior. Does not touch the cache.
    fn draw(&mut self) -> f64;

    /// Draw `count` values from the current posterior, replacing the cached sample set.
    fn sample(&mut self, count: usize) -> Result<&[f64]>;

    /// Redraw the cached sample set with the configured bulk size.
    fn refresh(&mut self) -> Result<&[f64]>;

    /// The cached sample set from the most recent bulk draw.
    fn samples(&self) -> Result<&[f64]>;

    /// Highest-density interval of the cached samples containing `mass` in `(0, 1)`.
    fn hdi(&self, mass: f64) -> Result<(f64, f64)> {
        interval::hdi(self.samples()?, mass)
    }
}

fn check_shape(alpha: f64, beta: f64) -> Result<()> {
    if alpha.is_finite() && beta.is_finite() && alpha > 0.0 && beta > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "shape parameters must be finite and > 0, got alpha={alpha}, beta={beta}"
        )))
    }
}

fn beta_dist(alpha: f64, beta: f64) -> Result<Beta<f64>> {
    check_shape(alpha, beta)?;
    Beta::new(alpha, beta)
        .map_err(|e| Error::InvalidParameter(format!("beta({alpha}, {beta}): {e}")))
}

fn gamma_dist(alpha: f64, beta: f64) -> Result<Gamma<f64>> {
    check_shape(alpha, beta)?;
    Gamma::new(alpha, 1.0 / beta)
        .map_err(|e| Error::InvalidParameter(format!("gamma({alpha}, 1/{beta}): {e}")))
}

/// State shared by both variants: shape, frozen distribution, RNG, cached draws.
#[derive(Debug, Clone)]
struct Core<D> {
    name: String,
    alpha: f64,
    beta: f64,
    dist: D,
    samples: Option<Vec<f64>>,
    cfg: PosteriorConfig,
    rng: StdRng,
}

impl<D: Distribution<f64>> Core<D> {
    fn new(name: String, alpha: f64, beta: f64, dist: D, cfg: PosteriorConfig) -> Result<Self> {
        if cfg.bulk_draws == 0 {
            return Err(Error::InvalidParameter(
                "bulk_draws must be > 0".to_string(),
            ));
        }
        let rng = StdRng::seed_from_u64(stable_hash64(cfg.seed, &name));
        Ok(Self {
            name,
            alpha,
            beta,
            dist,
            samples: None,
            rng,
            cfg,
        })
    }

    /// Commit an already-validated shape and its distribution.
    fn reshape(&mut self, alpha: f64, beta: f64, dist: D) {
        self.alpha = alpha;
        self.beta = beta;
        self.dist = dist;
        debug!(model = %self.name, alpha, beta, "posterior updated");
        if self.cfg.refresh_on_update {
            let n = self.cfg.bulk_draws;
            self.sample(n);
        } else {
            self.samples = None;
        }
    }

    fn draw(&mut self) -> f64 {
        self.dist.sample(&mut self.rng)
    }

    fn sample(&mut self, count: usize) -> &[f64] {
        let xs: Vec<f64> = (0..count).map(|_| self.dist.sample(&mut self.rng)).collect();
        trace!(model = %self.name, count, "drew posterior samples");
        self.samples.insert(xs).as_slice()
    }

    fn samples(&self) -> Result<&[f64]> {
        self.samples
            .as_deref()
            .ok_or_else(|| Error::UnfittedModel {
                name: self.name.clone(),
            })
    }
}

fn checked_sample(count: usize) -> Result<usize> {
    if count == 0 {
        Err(Error::InvalidParameter(
            "sample count must be > 0".to_string(),
        ))
    } else {
        Ok(count)
    }
}

/// Beta-Bernoulli posterior over a rate in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct BernoulliRateModel {
    core: Core<Beta<f64>>,
}

impl BernoulliRateModel {
    /// Create a model with prior `Beta(alpha, beta)` and default sampling configuration.
    pub fn new(name: impl Into<String>, alpha: f64, beta: f64) -> Result<Self> {
        Self::with_config(name, alpha, beta, PosteriorConfig::default())
    }

    /// Create a model with an explicit sampling configuration.
    pub fn with_config(
        name: impl Into<String>,
        alpha: f64,
        beta: f64,
        cfg: PosteriorConfig,
    ) -> Result<Self> {
        let dist = beta_dist(alpha, beta)?;
        Ok(Self {
            core: Core::new(name.into(), alpha, beta, dist, cfg)?,
        })
    }

    /// Posterior variance of the rate.
    pub fn variance(&self) -> f64 {
        let (a, b) = (self.core.alpha, self.core.beta);
        let s = a + b;
        a * b / (s * s * (s + 1.0))
    }

    fn apply(&mut self, alpha: f64, beta: f64) -> Result<()> {
        let dist = beta_dist(alpha, beta)?;
        self.core.reshape(alpha, beta, dist);
        Ok(())
    }
}

impl ConjugatePosterior for BernoulliRateModel {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn shape(&self) -> (f64, f64) {
        (self.core.alpha, self.core.beta)
    }

    fn mean(&self) -> f64 {
        self.core.alpha / (self.core.alpha + self.core.beta)
    }

    /// `alpha += successes; beta += trials - successes`.
    fn update(&mut self, successes: u64, trials: u64) -> Result<()> {
        if successes > trials {
            return Err(Error::InvalidParameter(format!(
                "'{}': successes ({successes}) exceed trials ({trials})",
                self.core.name
            )));
        }
        let alpha = self.core.alpha + successes as f64;
        let beta = self.core.beta + (trials - successes) as f64;
        self.apply(alpha, beta)
    }

    /// One trial with a (possibly fractional) success `outcome` in `[0, 1]`.
    fn observe(&mut self, outcome: f64) -> Result<()> {
        if !(outcome.is_finite() && (0.0..=1.0).contains(&outcome)) {
            return Err(Error::InvalidParameter(format!(
                "'{}': conversion outcome must be in [0, 1], got {outcome}",
                self.core.name
            )));
        }
        let alpha = self.core.alpha + outcome;
        let beta = self.core.beta + (1.0 - outcome);
        self.apply(alpha, beta)
    }

    fn draw(&mut self) -> f64 {
        self.core.draw()
    }

    fn sample(&mut self, count: usize) -> Result<&[f64]> {
        let n = checked_sample(count)?;
        Ok(self.core.sample(n))
    }

    fn refresh(&mut self) -> Result<&[f64]> {
        let n = self.core.cfg.bulk_draws;
        self.sample(n)
    }

    fn samples(&self) -> Result<&[f64]> {
        self.core.samples()
    }
}

impl fmt::Display for BernoulliRateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conversion Rate: '{}' (alpha:{}, beta:{})",
            self.core.name, self.core.alpha, self.core.beta
        )
    }
}

/// Gamma-Poisson posterior over a non-negative event rate.
#[derive(Debug, Clone)]
pub struct PoissonRateModel {
    core: Core<Gamma<f64>>,
}

impl PoissonRateModel {
    /// Create a model with prior `Gamma(shape = alpha, rate = beta)`.
    pub fn new(name: impl Into<String>, alpha: f64, beta: f64) -> Result<Self> {
        Self::with_config(name, alpha, beta, PosteriorConfig::default())
    }

    /// Create a model with an explicit sampling configuration.
    pub fn with_config(
        name: impl Into<String>,
        alpha: f64,
        beta: f64,
        cfg: PosteriorConfig,
    ) -> Result<Self> {
        let dist = gamma_dist(alpha, beta)?;
        Ok(Self {
            core: Core::new(name.into(), alpha, beta, dist, cfg)?,
        })
    }

    /// Posterior variance of the rate (`alpha / beta^2`).
    pub fn variance(&self) -> f64 {
        self.core.alpha / (self.core.beta * self.core.beta)
    }

    fn apply(&mut self, alpha: f64, beta: f64) -> Result<()> {
        let dist = gamma_dist(alpha, beta)?;
        self.core.reshape(alpha, beta, dist);
        Ok(())
    }
}

impl ConjugatePosterior for PoissonRateModel {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn shape(&self) -> (f64, f64) {
        (self.core.alpha, self.core.beta)
    }

    fn mean(&self) -> f64 {
        self.core.alpha / self.core.beta
    }

    /// `alpha += events; beta += intervals`.
    fn update(&mut self, events: u64, intervals: u64) -> Result<()> {
        let alpha = self.core.alpha + events as f64;
        let beta = self.core.beta + intervals as f64;
        self.apply(alpha, beta)
    }

    /// Events seen during one interval.
    fn observe(&mut self, occurrences: f64) -> Result<()> {
        if !(occurrences.is_finite() && occurrences >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "'{}': occurrences must be finite and >= 0, got {occurrences}",
                self.core.name
            )));
        }
        let alpha = self.core.alpha + occurrences;
        let beta = self.core.beta + 1.0;
        self.apply(alpha, beta)
    }

    fn draw(&mut self) -> f64 {
        self.core.draw()
    }

    fn sample(&mut self, count: usize) -> Result<&[f64]> {
        let n = checked_sample(count)?;
        Ok(self.core.sample(n))
    }

    fn refresh(&mut self) -> Result<&[f64]> {
        let n = self.core.cfg.bulk_draws;
        self.sample(n)
    }

    fn samples(&self) -> Result<&[f64]> {
        self.core.samples()
    }
}

impl fmt::Display for PoissonRateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Demand: '{}' (alpha:{}, beta:{})",
            self.core.name, self.core.alpha, self.core.beta
        )
    }
}
