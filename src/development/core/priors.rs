//! Prior specification for the hierarchical loss-development model.
//!
//! Purpose
//! -------
//! Collect the prior locations and scales for the model's hyperparameters in
//! one validated, explicit carrier instead of scattering constants through
//! the density code. The hierarchy is:
//!
//! ```text
//! LR[y]  ~ LogNormal(μ_LR, sd_LR)        per cohort
//! μ_LR   ~ Normal(0, 0.5)
//! sd_LR  ~ LogNormal(−1, 1)
//! ω, θ   ~ LogNormal(0, 1), LogNormal(1, 1)
//! σ      ~ LogNormal(−3, 1)
//! ```
//!
//! The log-normal family keeps every scale-like quantity strictly positive
//! by construction. Defaults are weakly informative: wide on the log scale,
//! centered on loss ratios below 1, growth scales of a few development
//! periods, and loss-ratio-scale residual noise.
//!
//! Downstream usage
//! ----------------
//! - [`crate::development::models::LossDevModel`] evaluates these priors in
//!   the joint density; on the unconstrained sampling scale the log-normal
//!   priors become normal priors on the log coordinates.
//! - Callers with portfolio-specific knowledge override the defaults via
//!   [`PriorSpec::new`].
use serde::Serialize;

use crate::development::errors::{DevError, DevResult};

/// Default prior mean for μ_LR.
pub const DEFAULT_MU_LR_MEAN: f64 = 0.0;
/// Default prior sd for μ_LR.
pub const DEFAULT_MU_LR_SD: f64 = 0.5;
/// Default log-normal hyperprior (location, scale) for the growth shape ω.
pub const DEFAULT_OMEGA_PRIOR: (f64, f64) = (0.0, 1.0);
/// Default log-normal hyperprior (location, scale) for the growth scale θ.
pub const DEFAULT_THETA_PRIOR: (f64, f64) = (1.0, 1.0);
/// Default log-normal hyperprior (location, scale) for sd_LR.
pub const DEFAULT_SD_LR_PRIOR: (f64, f64) = (-1.0, 1.0);
/// Default log-normal hyperprior (location, scale) for σ.
pub const DEFAULT_SIGMA_PRIOR: (f64, f64) = (-3.0, 1.0);

/// Location/scale pair of a log-normal hyperprior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogNormalPrior {
    /// Location on the log scale (finite).
    pub location: f64,
    /// Scale on the log scale (finite, > 0).
    pub scale: f64,
}

impl LogNormalPrior {
    /// Construct a validated log-normal hyperprior.
    ///
    /// # Errors
    /// Returns [`DevError::InvalidOption`] if `location` is non-finite or
    /// `scale` is non-finite or non-positive.
    pub fn new(location: f64, scale: f64) -> DevResult<LogNormalPrior> {
        if !location.is_finite() {
            return Err(DevError::InvalidOption { name: "prior location", value: location });
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(DevError::InvalidOption { name: "prior scale", value: scale });
        }
        Ok(LogNormalPrior { location, scale })
    }
}

/// Validated prior specification for one model fit.
///
/// Bundles the Normal prior on μ_LR and the log-normal hyperpriors for
/// `ω, θ, sd_LR, σ`. Immutable after construction; the same specification is
/// shared by every chain of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriorSpec {
    /// Mean of the Normal prior on μ_LR.
    pub mu_lr_mean: f64,
    /// Sd of the Normal prior on μ_LR (> 0).
    pub mu_lr_sd: f64,
    /// Hyperprior for the growth shape ω.
    pub omega: LogNormalPrior,
    /// Hyperprior for the growth scale θ.
    pub theta: LogNormalPrior,
    /// Hyperprior for the loss-ratio prior scale sd_LR.
    pub sd_lr: LogNormalPrior,
    /// Hyperprior for the residual noise scale σ.
    pub sigma: LogNormalPrior,
}

impl PriorSpec {
    /// Construct a validated prior specification.
    ///
    /// # Errors
    /// Returns [`DevError::InvalidOption`] if `mu_lr_mean` is non-finite or
    /// `mu_lr_sd` is non-finite or non-positive. The log-normal components
    /// are validated by their own constructor.
    pub fn new(
        mu_lr_mean: f64, mu_lr_sd: f64, omega: LogNormalPrior, theta: LogNormalPrior,
        sd_lr: LogNormalPrior, sigma: LogNormalPrior,
    ) -> DevResult<PriorSpec> {
        if !mu_lr_mean.is_finite() {
            return Err(DevError::InvalidOption { name: "mu_lr_mean", value: mu_lr_mean });
        }
        if !mu_lr_sd.is_finite() || mu_lr_sd <= 0.0 {
            return Err(DevError::InvalidOption { name: "mu_lr_sd", value: mu_lr_sd });
        }
        Ok(PriorSpec { mu_lr_mean, mu_lr_sd, omega, theta, sd_lr, sigma })
    }
}

impl Default for PriorSpec {
    fn default() -> Self {
        PriorSpec {
            mu_lr_mean: DEFAULT_MU_LR_MEAN,
            mu_lr_sd: DEFAULT_MU_LR_SD,
            omega: LogNormalPrior { location: DEFAULT_OMEGA_PRIOR.0, scale: DEFAULT_OMEGA_PRIOR.1 },
            theta: LogNormalPrior { location: DEFAULT_THETA_PRIOR.0, scale: DEFAULT_THETA_PRIOR.1 },
            sd_lr: LogNormalPrior { location: DEFAULT_SD_LR_PRIOR.0, scale: DEFAULT_SD_LR_PRIOR.1 },
            sigma: LogNormalPrior { location: DEFAULT_SIGMA_PRIOR.0, scale: DEFAULT_SIGMA_PRIOR.1 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify the default specification matches the documented constants and
    // that invalid locations/scales are rejected.
    fn priors_defaults_and_validation() {
        let spec = PriorSpec::default();
        assert_eq!(spec.mu_lr_mean, DEFAULT_MU_LR_MEAN);
        assert_eq!(spec.mu_lr_sd, DEFAULT_MU_LR_SD);
        assert_eq!(spec.sigma.location, DEFAULT_SIGMA_PRIOR.0);

        assert_eq!(
            LogNormalPrior::new(0.0, 0.0).unwrap_err(),
            DevError::InvalidOption { name: "prior scale", value: 0.0 }
        );
        assert_eq!(
            PriorSpec::new(f64::INFINITY, 0.5, spec.omega, spec.theta, spec.sd_lr, spec.sigma)
                .unwrap_err(),
            DevError::InvalidOption { name: "mu_lr_mean", value: f64::INFINITY }
        );
    }
}
