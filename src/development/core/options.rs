//! Fit options — configuration for sampling and convergence checking.
//!
//! Purpose
//! -------
//! Collect the configuration knobs for a loss-development fit in one place:
//! the sampler invocation parameters (iterations, warmup, chains, seed — a
//! capability-layer concern carried by [`SamplerConfig`]) and the thresholds
//! used when flagging convergence problems ([`DiagnosticOptions`]). Public
//! APIs accept a [`FitOptions`] rather than loose arguments so every fit is
//! explicit and reproducible.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`SamplerConfig`] is validated by its own constructor in the sampling
//!   layer; [`FitOptions`] adds no cross-field checks.
//! - Diagnostic thresholds are advisory: breaching them produces logged,
//!   non-fatal flags, never an error.
use serde::Serialize;

use crate::{
    development::errors::{DevError, DevResult},
    sampling::traits::SamplerConfig,
};

/// Default R-hat threshold above which a coordinate is flagged.
pub const DEFAULT_RHAT_MAX: f64 = 1.1;
/// Default effective-sample floor as a fraction of total retained draws.
pub const DEFAULT_N_EFF_FLOOR_FRAC: f64 = 0.1;

/// Thresholds for convergence flagging.
///
/// Breaches are reported as [`crate::inference::ConvergenceFlag`]s and
/// logged; downstream forecasting proceeds with the caveat attached, it is
/// never blocked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiagnosticOptions {
    /// Flag coordinates with split R-hat at or above this value (> 1).
    pub rhat_max: f64,
    /// Flag coordinates whose effective sample size falls below this
    /// fraction of total retained draws (in (0, 1)).
    pub n_eff_floor_frac: f64,
}

impl DiagnosticOptions {
    /// Construct validated diagnostic thresholds.
    ///
    /// # Errors
    /// Returns [`DevError::InvalidOption`] if `rhat_max <= 1` or
    /// `n_eff_floor_frac` lies outside `(0, 1)` (or either is non-finite).
    pub fn new(rhat_max: f64, n_eff_floor_frac: f64) -> DevResult<DiagnosticOptions> {
        if !rhat_max.is_finite() || rhat_max <= 1.0 {
            return Err(DevError::InvalidOption { name: "rhat_max", value: rhat_max });
        }
        if !n_eff_floor_frac.is_finite() || n_eff_floor_frac <= 0.0 || n_eff_floor_frac >= 1.0 {
            return Err(DevError::InvalidOption {
                name: "n_eff_floor_frac",
                value: n_eff_floor_frac,
            });
        }
        Ok(DiagnosticOptions { rhat_max, n_eff_floor_frac })
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions {
            rhat_max: DEFAULT_RHAT_MAX,
            n_eff_floor_frac: DEFAULT_N_EFF_FLOOR_FRAC,
        }
    }
}

/// Fit-time configuration: sampler invocation plus diagnostic thresholds.
///
/// A thin bundle of already-validated components; construct the parts with
/// their own builders (or take [`FitOptions::default`]) and pass the bundle
/// to [`crate::development::models::LossDevModel::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitOptions {
    /// Sampler invocation parameters (iterations, warmup, chains, seed).
    pub sampler: SamplerConfig,
    /// Convergence-flag thresholds.
    pub diagnostics: DiagnosticOptions,
}

impl FitOptions {
    /// Bundle already-validated components; no cross-field checks.
    pub fn new(sampler: SamplerConfig, diagnostics: DiagnosticOptions) -> FitOptions {
        FitOptions { sampler, diagnostics }
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions { sampler: SamplerConfig::default(), diagnostics: DiagnosticOptions::default() }
    }
}
