//! Thompson-sampling allocator over named conjugate-posterior arms.
//!
//! Selection is a two-phase state machine, tracked per arm:
//! - **Priming**: while any arm is unprimed, pick one of the unprimed arms uniformly
//!   at random and mark it primed. Every arm is tried once before exploitation.
//! - **Exploitation**: draw once from every arm's posterior and pick the max
//!   (tie-break: lowest registry index).
//!
//! Adding an arm later only makes that arm unprimed; existing arms keep their flags.
//!
//! The allocator owns its RNG (seedable), used for the priming choice. Posterior
//! draws come from each model's own RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{Error, Result};
use crate::posterior::ConjugatePosterior;

/// Configuration for [`ThompsonAllocator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocatorConfig {
    /// Seed for the priming RNG.
    pub seed: u64,
}

/// One registered arm: a posterior model plus its priming flag.
#[derive(Debug)]
pub struct BanditArm {
    model: Box<dyn ConjugatePosterior>,
    primed: bool,
}

impl BanditArm {
    /// Name of the wrapped model.
    pub fn name(&self) -> &str {
        self.model.name()
    }

    /// The wrapped posterior model.
    pub fn model(&self) -> &dyn ConjugatePosterior {
        self.model.as_ref()
    }

    /// Whether the arm has been handed out by the priming phase.
    pub fn is_primed(&self) -> bool {
        self.primed
    }
}

/// Which phase produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionPhase {
    /// An unprimed arm was chosen uniformly at random.
    Priming,
    /// Every arm was sampled once and the max draw won.
    Exploitation,
}

/// Result of [`ThompsonAllocator::select_arm`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    /// Registry index of the chosen arm.
    pub index: usize,
    /// Name of the chosen arm.
    pub name: String,
    pub phase: SelectionPhase,
    /// Per-arm posterior draws in registry order (exploitation only).
    pub draws: Option<Vec<f64>>,
}

/// A reference to a registered arm: by name, by registry index, or by a prior selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmRef<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for ArmRef<'a> {
    fn from(name: &'a str) -> Self {
        ArmRef::Name(name)
    }
}

impl<'a> From<&'a String> for ArmRef<'a> {
    fn from(name: &'a String) -> Self {
        ArmRef::Name(name.as_str())
    }
}

impl From<usize> for ArmRef<'_> {
    fn from(index: usize) -> Self {
        ArmRef::Index(index)
    }
}

impl<'a> From<&'a Selection> for ArmRef<'a> {
    fn from(sel: &'a Selection) -> Self {
        ArmRef::Name(sel.name.as_str())
    }
}

impl<'a> From<&'a BanditArm> for ArmRef<'a> {
    fn from(arm: &'a BanditArm) -> Self {
        ArmRef::Name(arm.name())
    }
}

impl std::fmt::Display for ArmRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArmRef::Name(n) => write!(f, "{n}"),
            ArmRef::Index(i) => write!(f, "#{i}"),
        }
    }
}

/// Seedable Thompson-sampling allocator.
#[derive(Debug)]
pub struct ThompsonAllocator {
    arms: Vec<BanditArm>,
    rng: StdRng,
}

impl ThompsonAllocator {
    /// Create an empty allocator from a configuration.
    pub fn new(cfg: AllocatorConfig) -> Self {
        Self {
            arms: Vec::new(),
            rng: StdRng::seed_from_u64(cfg.seed),
        }
    }

    /// Create an allocator with a fixed seed (reproducible priming order).
    pub fn with_seed(seed: u64) -> Self {
        Self::new(AllocatorConfig { seed })
    }

    /// Register a new, unprimed arm.
    ///
    /// Fails with [`Error::DuplicateArm`] if an arm with the same name exists;
    /// the registry is left untouched in that case.
    ///
    /// Every [`update`](Self::update) is forwarded to the model, so a model built
    /// with `refresh_on_update = true` (the [`PosteriorConfig`] default) redraws its
    /// full bulk sample set on each outcome. Build arms with
    /// [`PosteriorConfig::for_bandit`] unless the cached draws are needed.
    ///
    /// [`PosteriorConfig`]: crate::PosteriorConfig
    /// [`PosteriorConfig::for_bandit`]: crate::PosteriorConfig::for_bandit
    pub fn add_arm<M>(&mut self, model: M) -> Result<usize>
    where
        M: ConjugatePosterior + 'static,
    {
        self.add_boxed(Box::new(model))
    }

    /// [`add_arm`](Self::add_arm) for an already-boxed model.
    pub fn add_boxed(&mut self, model: Box<dyn ConjugatePosterior>) -> Result<usize> {
        if self.position(model.name()).is_some() {
            return Err(Error::DuplicateArm {
                name: model.name().to_string(),
            });
        }
        let index = self.arms.len();
        debug!(arm = model.name(), index, "registered arm");
        self.arms.push(BanditArm {
            model,
            primed: false,
        });
        Ok(index)
    }

    /// Number of registered arms.
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// True when no arms are registered.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Arms in registry (insertion) order.
    pub fn arms(&self) -> &[BanditArm] {
        &self.arms
    }

    /// Look up a registered arm by name or index.
    pub fn arm<'a>(&self, arm: impl Into<ArmRef<'a>>) -> Option<&BanditArm> {
        self.resolve(arm.into()).map(|i| &self.arms[i])
    }

    /// True once every registered arm has been primed.
    pub fn is_primed(&self) -> bool {
        self.arms.iter().all(|a| a.primed)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.arms.iter().position(|a| a.name() == name)
    }

    fn resolve(&self, arm: ArmRef<'_>) -> Option<usize> {
        match arm {
            ArmRef::Name(n) => self.position(n),
            ArmRef::Index(i) => (i < self.arms.len()).then_some(i),
        }
    }

    /// Choose the next arm to try.
    ///
    /// Returns `None` only when no arms are registered.
    pub fn select_arm(&mut self) -> Option<Selection> {
        if self.arms.is_empty() {
            return None;
        }

        let unprimed: Vec<usize> = self
            .arms
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.primed)
            .map(|(i, _)| i)
            .collect();
        if !unprimed.is_empty() {
            let index = unprimed[self.rng.random_range(0..unprimed.len())];
            let arm = &mut self.arms[index];
            arm.primed = true;
            debug!(arm = arm.name(), index, remaining = unprimed.len() - 1, "priming arm");
            return Some(Selection {
                index,
                name: arm.name().to_string(),
                phase: SelectionPhase::Priming,
                draws: None,
            });
        }

        let draws: Vec<f64> = self.arms.iter_mut().map(|a| a.model.draw()).collect();
        let mut index = 0;
        for (i, &x) in draws.iter().enumerate().skip(1) {
            // Strict `>` keeps the lowest index on ties.
            if x > draws[index] {
                index = i;
            }
        }
        let name = self.arms[index].name().to_string();
        debug!(arm = %name, index, draw = draws[index], "exploiting arm");
        Some(Selection {
            index,
            name,
            phase: SelectionPhase::Exploitation,
            draws: Some(draws),
        })
    }

    /// Feed a single outcome back into the referenced arm's model.
    ///
    /// Conversion arms take a success in `[0, 1]`; demand arms take the event count
    /// for one interval.
    pub fn update<'a>(&mut self, arm: impl Into<ArmRef<'a>>, outcome: f64) -> Result<()> {
        let i = self.require(arm.into())?;
        self.arms[i].model.observe(outcome)
    }

    /// Feed aggregated counts (`hits` out of `exposures`) back into the referenced arm.
    pub fn update_counts<'a>(
        &mut self,
        arm: impl Into<ArmRef<'a>>,
        hits: u64,
        exposures: u64,
    ) -> Result<()> {
        let i = self.require(arm.into())?;
        self.arms[i].model.update(hits, exposures)
    }

    fn require(&self, arm: ArmRef<'_>) -> Result<usize> {
        self.resolve(arm).ok_or_else(|| Error::ArmNotFound {
            arm: arm.to_string(),
        })
    }
}

impl Default for ThompsonAllocator {
    fn default() -> Self {
        Self::new(AllocatorConfig::default())
    }
}
