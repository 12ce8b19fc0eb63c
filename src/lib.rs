//! `bayesab`: seedable Bayesian primitives for sequential experiments.
//!
//! Two jobs, one set of models:
//!
//! - **Allocation**: a [`ThompsonAllocator`] decides which arm (variant, backend,
//!   price point, ...) to try next. Every arm is tried once (priming), after which
//!   each call draws once from every arm's posterior and picks the max.
//! - **Decision**: [`pairwise_test`] and [`multi_treatment_test`] compare a control
//!   against treatments using the Monte Carlo expected loss of switching, and only
//!   adopt a treatment when that loss is below the caller's risk tolerance.
//!
//! Both consume conjugate posterior models implementing [`ConjugatePosterior`]:
//! - [`BernoulliRateModel`]: Beta posterior over a conversion-style rate in `[0, 1]`.
//! - [`PoissonRateModel`]: Gamma posterior over a demand-style event rate.
//!
//! **Goals:**
//! - **Deterministic by default**: every model and allocator owns a seeded `StdRng`;
//!   same seed + same updates → same draws and choices.
//! - **Errors are values**: duplicate arms, unknown arms, unsampled models, and
//!   invalid parameters come back as [`Error`]; nothing is silently dropped.
//! - **Small K**: designed for a handful of arms/treatments.
//!
//! **Non-goals:**
//! - No persistence, storage, or dashboards.
//! - No ingestion: callers supply counts and consume choices.
//!
//! # Example
//!
//! ```rust
//! use bayesab::{
//!     pairwise_test, BernoulliRateModel, ConjugatePosterior, ExpectedLossConfig,
//!     PosteriorConfig,
//! };
//!
//! let cfg = PosteriorConfig { bulk_draws: 20_000, ..PosteriorConfig::seeded(1) };
//! let mut ctrl = BernoulliRateModel::with_config("ctrl", 1.0, 1.0, cfg)?;
//! let mut treat = BernoulliRateModel::with_config("treat", 1.0, 1.0, PosteriorConfig { seed: 2, ..cfg })?;
//! ctrl.update(50, 500)?;
//! treat.update(80, 500)?;
//!
//! let d = pairwise_test(&ctrl, &treat, ExpectedLossConfig::new(0.01))?;
//! assert_eq!(d.chosen, "treat");
//! # Ok::<(), bayesab::Error>(())
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::*;

pub mod interval;

mod stable_hash;

mod posterior;
pub use posterior::*;

mod allocator;
pub use allocator::*;

mod loss;
pub use loss::*;
