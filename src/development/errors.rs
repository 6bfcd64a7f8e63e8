//! Errors for loss-development modeling (growth-curve domain checks, triangle
//! validation, model evaluation, and sampler failures surfaced at the model
//! boundary).
//!
//! This module defines the development-stack error type, [`DevError`], and a
//! parameter error type, [`ParamError`], used across triangle construction,
//! growth-curve evaluation, density evaluation, and forecasting. Both
//! implement `Display`/`Error`.
//!
//! ## Conventions
//! - **Indices are 0-based**; cohorts are reported by label, cells by
//!   `(cohort, dev_lag)`.
//! - Development lags and premiums must be **strictly positive and finite**;
//!   cumulative losses must be **finite** (monotonicity is a data-quality
//!   expectation, not a hard invariant).
//! - Domain violations in growth-curve or density evaluation are surfaced
//!   immediately and never clamped; they indicate a parameterization bug
//!   upstream.
//! - Sampler/backend failures are normalized to
//!   [`DevError::SamplerFailed`] with a human-readable status.
use statrs::distribution::{LogNormalError, NormalError};

/// Crate-wide result alias for development-stack operations that may produce
/// [`DevError`].
pub type DevResult<T> = Result<T, DevError>;

/// Result alias for parameter-construction/validation paths that may produce
/// [`ParamError`].
pub type ParamResult<T> = Result<T, ParamError>;

/// Unified error type for loss-development modeling.
///
/// Covers growth-curve domain checks, triangle/data validation, model
/// evaluation, forecasting, and sampler failures wrapped at the model
/// boundary. Implements `Display`/`Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum DevError {
    // ---- Growth-curve domain ----
    /// Development time passed to a growth curve was negative.
    NegativeDevTime { value: f64 },

    /// Development time passed to a growth curve was NaN/±inf.
    NonFiniteDevTime { value: f64 },

    /// Growth-curve shape parameter must be finite and > 0.
    NonPositiveShape { value: f64 },

    /// Growth-curve scale parameter must be finite and > 0.
    NonPositiveScale { value: f64 },

    // ---- Triangle/data validation ----
    /// No records were supplied for triangle construction.
    EmptyTriangle,

    /// A cohort's premium is zero, negative, or non-finite.
    NonPositivePremium { cohort: String, value: f64 },

    /// A cohort's records disagree on its premium.
    InconsistentPremium { cohort: String, first: f64, other: f64 },

    /// A development lag is zero, negative, or non-finite.
    NonPositiveLag { cohort: String, value: f64 },

    /// A cumulative loss value is NaN/±inf.
    NonFiniteLoss { cohort: String, dev_lag: f64, value: f64 },

    /// Two records address the same `(cohort, dev_lag)` cell.
    DuplicateCell { cohort: String, dev_lag: f64 },

    /// A cohort is observed at a lag without observations at every earlier
    /// lag on the global grid (the layout is not upper-left triangular).
    NonTriangularCohort { cohort: String, observed_lag: f64, missing_lag: f64 },

    /// A lookup referenced a cohort label the triangle does not contain.
    UnknownCohort { label: String },

    // ---- Model evaluation ----
    /// A parameter set carries a loss-ratio vector sized for a different
    /// number of cohorts than the triangle holds.
    CohortCountMismatch { expected: usize, actual: usize },

    /// A forecast set was built from a different number of draws than the
    /// draw sequence it is being reduced with.
    DrawCountMismatch { expected: usize, actual: usize },

    /// A distribution constructor rejected its parameters.
    InvalidDistribution { status: String },

    /// Invalid diagnostic/option value supplied at configuration time.
    InvalidOption { name: &'static str, value: f64 },

    // ---- Forecasting ----
    /// Every posterior draw was excluded for a cohort, leaving an empty
    /// forecast cone to summarize.
    EmptyForecast { cohort: String },

    /// Quantile probabilities must lie in [0, 1].
    InvalidQuantile { value: f64 },

    /// A realized-outcome comparison is missing the actual final loss for a
    /// cohort present in the triangle.
    MissingActualFinal { cohort: String },

    // ---- Parameters ----
    /// Wrapper carrying a parameter-validation failure.
    InvalidParams { status: String },

    // ---- Sampling ----
    /// The posterior sampler failed; includes a human-readable status.
    SamplerFailed { status: String },
}

impl std::error::Error for DevError {}

impl std::fmt::Display for DevError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Growth-curve domain ----
            DevError::NegativeDevTime { value } => {
                write!(f, "Development time must be >= 0; got: {value}")
            }
            DevError::NonFiniteDevTime { value } => {
                write!(f, "Development time must be finite; got: {value}")
            }
            DevError::NonPositiveShape { value } => {
                write!(f, "Growth-curve shape must be finite and > 0; got: {value}")
            }
            DevError::NonPositiveScale { value } => {
                write!(f, "Growth-curve scale must be finite and > 0; got: {value}")
            }
            // ---- Triangle/data validation ----
            DevError::EmptyTriangle => {
                write!(f, "Triangle construction received no records.")
            }
            DevError::NonPositivePremium { cohort, value } => {
                write!(f, "Cohort {cohort} has non-positive premium: {value}")
            }
            DevError::InconsistentPremium { cohort, first, other } => {
                write!(
                    f,
                    "Cohort {cohort} has inconsistent premiums across records: {first} vs {other}"
                )
            }
            DevError::NonPositiveLag { cohort, value } => {
                write!(f, "Cohort {cohort} has non-positive development lag: {value}")
            }
            DevError::NonFiniteLoss { cohort, dev_lag, value } => {
                write!(f, "Cohort {cohort} at lag {dev_lag} has non-finite cumulative loss: {value}")
            }
            DevError::DuplicateCell { cohort, dev_lag } => {
                write!(f, "Duplicate record for cohort {cohort} at development lag {dev_lag}")
            }
            DevError::NonTriangularCohort { cohort, observed_lag, missing_lag } => {
                write!(
                    f,
                    "Cohort {cohort} is observed at lag {observed_lag} but missing lag {missing_lag}; the layout is not triangular"
                )
            }
            DevError::UnknownCohort { label } => {
                write!(f, "Triangle contains no cohort labeled {label}")
            }
            // ---- Model evaluation ----
            DevError::CohortCountMismatch { expected, actual } => {
                write!(f, "Loss-ratio vector sized for {actual} cohorts; triangle has {expected}")
            }
            DevError::DrawCountMismatch { expected, actual } => {
                write!(f, "Forecast set built from {actual} draws; draw sequence has {expected}")
            }
            DevError::InvalidDistribution { status } => {
                write!(f, "Distribution construction failed: {status}")
            }
            DevError::InvalidOption { name, value } => {
                write!(f, "Invalid option {name}: {value}")
            }
            // ---- Forecasting ----
            DevError::EmptyForecast { cohort } => {
                write!(f, "All posterior draws were excluded for cohort {cohort}")
            }
            DevError::InvalidQuantile { value } => {
                write!(f, "Quantile probability must lie in [0, 1]; got: {value}")
            }
            DevError::MissingActualFinal { cohort } => {
                write!(f, "Realized-outcome input is missing cohort {cohort}")
            }
            // ---- Parameters ----
            DevError::InvalidParams { status } => {
                write!(f, "Invalid parameter set: {status}")
            }
            // ---- Sampling ----
            DevError::SamplerFailed { status } => {
                write!(f, "Posterior sampler failed with status: {status}")
            }
        }
    }
}

impl From<NormalError> for DevError {
    fn from(err: NormalError) -> DevError {
        DevError::InvalidDistribution { status: err.to_string() }
    }
}

impl From<LogNormalError> for DevError {
    fn from(err: LogNormalError) -> DevError {
        DevError::InvalidDistribution { status: err.to_string() }
    }
}

impl From<ParamError> for DevError {
    fn from(err: ParamError) -> DevError {
        DevError::InvalidParams { status: err.to_string() }
    }
}

/// Errors specific to parameter construction and validation.
///
/// Typical causes are positivity violations, loss-ratio length mismatches,
/// and non-finite coordinates in either model space or the unconstrained
/// sampling space.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// Growth-curve shape ω must be finite and > 0.
    InvalidOmega { value: f64 },

    /// Growth-curve scale θ must be finite and > 0.
    InvalidTheta { value: f64 },

    /// Loss-ratio prior location μ_LR must be finite.
    InvalidMuLr { value: f64 },

    /// Loss-ratio prior scale sd_LR must be finite and > 0.
    InvalidSdLr { value: f64 },

    /// Residual noise scale σ must be finite and > 0.
    InvalidSigma { value: f64 },

    /// Per-cohort loss ratios must be finite and > 0.
    InvalidLossRatio { index: usize, value: f64 },

    /// Loss-ratio vector length mismatch against the cohort count.
    LossRatioCountMismatch { expected: usize, actual: usize },

    /// Unconstrained vector length mismatch.
    EtaLengthMismatch { expected: usize, actual: usize },

    /// Unconstrained coordinates must be finite.
    NonFiniteEta { index: usize, value: f64 },
}

impl std::error::Error for ParamError {}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::InvalidOmega { value } => {
                write!(f, "omega must be finite and > 0, got {value}")
            }
            ParamError::InvalidTheta { value } => {
                write!(f, "theta must be finite and > 0, got {value}")
            }
            ParamError::InvalidMuLr { value } => {
                write!(f, "mu_lr must be finite, got {value}")
            }
            ParamError::InvalidSdLr { value } => {
                write!(f, "sd_lr must be finite and > 0, got {value}")
            }
            ParamError::InvalidSigma { value } => {
                write!(f, "sigma must be finite and > 0, got {value}")
            }
            ParamError::InvalidLossRatio { index, value } => {
                write!(f, "Loss ratio at index {index} must be finite and > 0, got {value}")
            }
            ParamError::LossRatioCountMismatch { expected, actual } => {
                write!(f, "Loss-ratio length mismatch: expected {expected}, got {actual}")
            }
            ParamError::EtaLengthMismatch { expected, actual } => {
                write!(f, "Unconstrained vector length mismatch: expected {expected}, got {actual}")
            }
            ParamError::NonFiniteEta { index, value } => {
                write!(f, "Unconstrained coordinate at index {index} must be finite, got {value}")
            }
        }
    }
}
