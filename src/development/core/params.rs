//! Loss-development parameterization: model space and sampling space.
//!
//! This module provides the **model-space** parameter container
//! [`LossDevParams`] and the **numerically stable bijection** between model
//! space and the **unconstrained sampling-space vector** η (as
//! `ndarray::Array1<f64>`).
//!
//! ## What this module defines
//! - [`LossDevParams`]: validated model-space parameters
//!   `(ω, θ, μ_LR, sd_LR, σ, LR[0..Y])` for a triangle with `Y` cohorts.
//! - The forward map [`LossDevParams::to_unconstrained`] and inverse
//!   [`LossDevParams::from_unconstrained`], plus [`coordinate_names`] for
//!   labeling diagnostics output.
//!
//! ## Mapping conventions
//! Layout: `η = [ln ω, ln θ, μ_LR, ln sd_LR, ln σ, ln LR[0], …, ln LR[Y−1]]`.
//! Strictly positive quantities are sampled on the log scale, so every η ∈ ℝᵈ
//! maps to a valid parameter set and the positivity invariants cannot be
//! violated by a sampler move. `μ_LR` is unconstrained and passes through.
//!
//! ## Invariants validated by constructors
//! - `ω, θ, sd_LR, σ > 0` and finite.
//! - `μ_LR` finite.
//! - `LR[y] > 0` and finite for every cohort, with `LR.len()` equal to the
//!   triangle's cohort count.
use ndarray::{Array1, ArrayView1};

use crate::development::errors::{ParamError, ParamResult};

/// Number of scalar coordinates preceding the per-cohort loss-ratio block in
/// the unconstrained layout (`ln ω, ln θ, μ_LR, ln sd_LR, ln σ`).
pub const N_SHARED_COORDS: usize = 5;

/// Constrained **model-space** parameters for a loss-development fit.
///
/// Invariants are validated at construction; use this type to evaluate the
/// joint density, extrapolate development, and compute PPC statistics.
///
/// See [`LossDevParams::to_unconstrained`] for the sampling-space mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct LossDevParams {
    /// Growth-curve shape ω > 0, shared across cohorts.
    pub omega: f64,
    /// Growth-curve scale θ > 0, shared across cohorts.
    pub theta: f64,
    /// Location of the log-normal loss-ratio prior (unconstrained).
    pub mu_lr: f64,
    /// Scale of the log-normal loss-ratio prior, sd_LR > 0.
    pub sd_lr: f64,
    /// Residual noise scale σ > 0; loss sd is `premium(y) · σ`.
    pub sigma: f64,
    /// Per-cohort ultimate loss ratios, LR[y] > 0, in dense cohort order.
    pub lr: Array1<f64>,
}

impl LossDevParams {
    /// Create validated model-space parameters.
    ///
    /// Validates positivity/finiteness of every coordinate and that `lr`
    /// carries one loss ratio per cohort (`n_cohorts`). Returns a
    /// [`ParamError`] naming the first offending coordinate otherwise.
    pub fn new(
        omega: f64, theta: f64, mu_lr: f64, sd_lr: f64, sigma: f64, lr: Array1<f64>,
        n_cohorts: usize,
    ) -> ParamResult<Self> {
        if !omega.is_finite() || omega <= 0.0 {
            return Err(ParamError::InvalidOmega { value: omega });
        }
        if !theta.is_finite() || theta <= 0.0 {
            return Err(ParamError::InvalidTheta { value: theta });
        }
        if !mu_lr.is_finite() {
            return Err(ParamError::InvalidMuLr { value: mu_lr });
        }
        if !sd_lr.is_finite() || sd_lr <= 0.0 {
            return Err(ParamError::InvalidSdLr { value: sd_lr });
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ParamError::InvalidSigma { value: sigma });
        }
        if lr.len() != n_cohorts {
            return Err(ParamError::LossRatioCountMismatch {
                expected: n_cohorts,
                actual: lr.len(),
            });
        }
        for (index, &value) in lr.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParamError::InvalidLossRatio { index, value });
            }
        }
        Ok(LossDevParams { omega, theta, mu_lr, sd_lr, sigma, lr })
    }

    /// Dimension of the unconstrained vector for a triangle with
    /// `n_cohorts` cohorts.
    pub fn dim(n_cohorts: usize) -> usize {
        N_SHARED_COORDS + n_cohorts
    }

    /// Forward map to the unconstrained sampling space.
    ///
    /// Layout: `[ln ω, ln θ, μ_LR, ln sd_LR, ln σ, ln LR[0], …]`. Always
    /// succeeds for a validated parameter set (logs of strictly positive,
    /// finite values are finite).
    pub fn to_unconstrained(&self) -> Array1<f64> {
        let mut eta = Array1::zeros(Self::dim(self.lr.len()));
        eta[0] = self.omega.ln();
        eta[1] = self.theta.ln();
        eta[2] = self.mu_lr;
        eta[3] = self.sd_lr.ln();
        eta[4] = self.sigma.ln();
        for (idx, &lr) in self.lr.iter().enumerate() {
            eta[N_SHARED_COORDS + idx] = lr.ln();
        }
        eta
    }

    /// Inverse map from the unconstrained sampling space.
    ///
    /// ### Inputs
    /// - `eta`: unconstrained vector with the documented layout; must have
    ///   length `dim(n_cohorts)` and finite entries.
    /// - `n_cohorts`: cohort count of the owning triangle.
    ///
    /// ### Behavior
    /// Exponentiates the log-scale coordinates and revalidates the result,
    /// so a coordinate extreme enough to overflow `exp` is reported as the
    /// corresponding model-space error rather than producing `inf`.
    ///
    /// ### Errors
    /// - [`ParamError::EtaLengthMismatch`] / [`ParamError::NonFiniteEta`] on
    ///   malformed input.
    /// - Model-space positivity errors if exponentiation over/underflows.
    pub fn from_unconstrained(eta: ArrayView1<f64>, n_cohorts: usize) -> ParamResult<Self> {
        let expected = Self::dim(n_cohorts);
        if eta.len() != expected {
            return Err(ParamError::EtaLengthMismatch { expected, actual: eta.len() });
        }
        for (index, &value) in eta.iter().enumerate() {
            if !value.is_finite() {
                return Err(ParamError::NonFiniteEta { index, value });
            }
        }
        let lr = Array1::from_iter(
            eta.iter().skip(N_SHARED_COORDS).map(|&log_lr| log_lr.exp()),
        );
        LossDevParams::new(eta[0].exp(), eta[1].exp(), eta[2], eta[3].exp(), eta[4].exp(), lr,
            n_cohorts)
    }

    /// Sum of the log-scale coordinates of the unconstrained layout
    /// (`ln ω + ln θ + ln sd_LR + ln σ + Σ ln LR[y]`).
    ///
    /// This is the log-Jacobian of the constrained → unconstrained change of
    /// variables; the sampling target adds it to the constrained-space log
    /// density.
    pub fn log_jacobian(&self) -> f64 {
        self.omega.ln()
            + self.theta.ln()
            + self.sd_lr.ln()
            + self.sigma.ln()
            + self.lr.iter().map(|lr| lr.ln()).sum::<f64>()
    }
}

/// Stable per-coordinate labels for the unconstrained layout, used by
/// convergence diagnostics and external reporting.
///
/// `labels` are the triangle's cohort labels in dense index order; the
/// returned names are `["omega", "theta", "mu_lr", "sd_lr", "sigma",
/// "lr[<label>]", …]`.
pub fn coordinate_names(labels: &[String]) -> Vec<String> {
    let mut names = Vec::with_capacity(N_SHARED_COORDS + labels.len());
    names.push("omega".to_string());
    names.push("theta".to_string());
    names.push("mu_lr".to_string());
    names.push("sd_lr".to_string());
    names.push("sigma".to_string());
    for label in labels {
        names.push(format!("lr[{label}]"));
    }
    names
}
