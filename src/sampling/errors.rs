//! Errors for the posterior-sampling layer (configuration validation,
//! target-density failures, per-chain fatalities, and run-level outcomes).
//!
//! The sampling layer keeps its own error family, [`SamplerError`]; the
//! model boundary wraps it into
//! [`crate::development::errors::DevError::SamplerFailed`] with a
//! human-readable status, so development-stack callers see a uniform error
//! surface.
//!
//! ## Conventions
//! - A chain that encounters a NaN or `+inf` target value dies alone; the
//!   run only fails when **every** chain has died.
//! - `-inf` target values are legitimate (zero-probability region) and are
//!   handled by rejection, never via this error type.
use crate::development::errors::{DevError, ParamError};

/// Result alias for sampling-layer operations.
pub type SamplerResult<T> = Result<T, SamplerError>;

/// Unified error type for the posterior-sampling layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerError {
    // ---- Configuration ----
    /// Iteration budget must exceed warmup, and warmup must be nonzero.
    InvalidIterations { iterations: usize, warmup: usize, reason: &'static str },

    /// At least one chain is required.
    InvalidChains { chains: usize },

    /// Proposal/adaptation tuning value out of range.
    InvalidTuning { name: &'static str, value: f64 },

    // ---- Target density ----
    /// The target reported a dimension inconsistent with the supplied state.
    DimensionMismatch { expected: usize, actual: usize },

    /// The target produced NaN or +inf (fatal for the evaluating chain).
    NonFiniteDensity { chain: usize, iteration: usize, value: f64 },

    /// The target rejected an evaluation outright (wraps model-layer errors).
    TargetRejected { status: String },

    // ---- Chain/run outcomes ----
    /// No finitely-supported initial state was found for a chain.
    InitFailed { chain: usize, attempts: usize },

    /// Every requested chain failed; the run produced no draws.
    AllChainsFailed { chains: usize },

    /// Preset draws supplied to a replay sampler were empty or ragged.
    InvalidPresetDraws { reason: &'static str },
}

impl std::error::Error for SamplerError {}

impl std::fmt::Display for SamplerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplerError::InvalidIterations { iterations, warmup, reason } => {
                write!(
                    f,
                    "Invalid iteration budget (iterations: {iterations}, warmup: {warmup}): {reason}"
                )
            }
            SamplerError::InvalidChains { chains } => {
                write!(f, "At least one chain is required; got {chains}")
            }
            SamplerError::InvalidTuning { name, value } => {
                write!(f, "Invalid sampler tuning value {name}: {value}")
            }
            SamplerError::DimensionMismatch { expected, actual } => {
                write!(f, "Target dimension mismatch: expected {expected}, got {actual}")
            }
            SamplerError::NonFiniteDensity { chain, iteration, value } => {
                write!(
                    f,
                    "Chain {chain} hit a non-finite log density at iteration {iteration}: {value}"
                )
            }
            SamplerError::TargetRejected { status } => {
                write!(f, "Target density rejected the evaluation: {status}")
            }
            SamplerError::InitFailed { chain, attempts } => {
                write!(
                    f,
                    "Chain {chain} found no finitely-supported initial state after {attempts} attempts"
                )
            }
            SamplerError::AllChainsFailed { chains } => {
                write!(f, "All {chains} chains failed; the run produced no draws")
            }
            SamplerError::InvalidPresetDraws { reason } => {
                write!(f, "Invalid preset draws: {reason}")
            }
        }
    }
}

impl From<ParamError> for SamplerError {
    fn from(err: ParamError) -> SamplerError {
        SamplerError::TargetRejected { status: err.to_string() }
    }
}

impl From<DevError> for SamplerError {
    fn from(err: DevError) -> SamplerError {
        SamplerError::TargetRejected { status: err.to_string() }
    }
}
