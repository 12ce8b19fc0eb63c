//! Error type shared by models, the allocator, and the evaluator.

use thiserror::Error;

/// Errors returned by `bayesab` operations.
///
/// Every fallible operation returns these as `Err`; nothing is logged and
/// dropped on the floor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// `add_arm` was called with a name that is already registered.
    #[error("arm with name '{name}' already exists")]
    DuplicateArm { name: String },

    /// An update referenced an arm the allocator does not know.
    #[error("arm '{arm}' not found")]
    ArmNotFound { arm: String },

    /// Cached posterior samples were requested before any were drawn.
    #[error("model '{name}' has no cached samples; update or sample it first")]
    UnfittedModel { name: String },

    /// A prior, observation, or argument is outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Paired sample vectors have different lengths.
    #[error("sample length mismatch: expected {expected}, got {got}")]
    SampleLengthMismatch { expected: usize, got: usize },

    /// A multi-treatment comparison was given no treatments.
    #[error("at least one treatment is required")]
    NoTreatments,

    /// A computation over samples was given zero draws.
    #[error("sample set is empty")]
    EmptySamples,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
