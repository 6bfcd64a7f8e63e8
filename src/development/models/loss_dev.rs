//! Hierarchical loss-development model: joint density and posterior fit.
//!
//! This module wires a triangle, a growth-curve family, and a prior
//! specification into the joint probability model and exposes it two ways:
//! as a constrained-space density over [`LossDevParams`], and as an
//! unconstrained [`LogDensity`] target for any [`PosteriorSampler`].
//!
//! Key ideas:
//! - Mean function `μ(y, t) = premium(y) · LR[y] · g(t; ω, θ)` with
//!   observation noise `Normal(μ, premium(y) · σ)` — the premium-
//!   proportional noise scale makes residual variance comparable in
//!   loss-ratio terms across cohorts of different size.
//! - Hierarchy: `LR[y] ~ LogNormal(μ_LR, sd_LR)` with hyperpriors from
//!   [`PriorSpec`]; every scale-like parameter is strictly positive by
//!   construction of the log-normal family.
//! - Sampling happens on the unconstrained scale
//!   `η = [ln ω, ln θ, μ_LR, ln sd_LR, ln σ, ln LR…]`; the trait target is
//!   the constrained density plus the log-Jacobian of that change of
//!   variables.
//! - `fit` returns an immutable [`FitResult`] (draws + diagnostics + chain
//!   accounting); there is no process-wide fit state anywhere.
use ndarray::{Array2, ArrayView1};
use serde::Serialize;
use statrs::distribution::{Continuous, LogNormal, Normal};

use crate::{
    development::{
        core::{
            data::Triangle,
            growth::GrowthCurve,
            options::FitOptions,
            params::{coordinate_names, LossDevParams},
            priors::PriorSpec,
        },
        errors::{DevError, DevResult},
    },
    inference::ConvergenceReport,
    sampling::{
        errors::{SamplerError, SamplerResult},
        traits::{LogDensity, PosteriorSampler},
    },
};

/// Bound on unconstrained coordinates. States with any |η_i| beyond this
/// are treated as zero-probability (the density returns −∞) so that `exp`
/// stays well-conditioned; `e^50 ≈ 5·10²¹` is far outside any plausible
/// parameter range.
pub const ETA_BOUND: f64 = 50.0;

/// Hierarchical Bayesian loss-development model for one triangle.
///
/// Immutable after construction; evaluation never mutates state, so a model
/// is shared freely across sampler chains (`Sync` by construction). Each
/// call to [`LossDevModel::fit`] returns a self-contained [`FitResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct LossDevModel {
    triangle: Triangle,
    growth: GrowthCurve,
    priors: PriorSpec,
    options: FitOptions,
}

impl LossDevModel {
    /// Assemble a model from its validated components.
    pub fn new(
        triangle: Triangle, growth: GrowthCurve, priors: PriorSpec, options: FitOptions,
    ) -> LossDevModel {
        LossDevModel { triangle, growth, priors, options }
    }

    /// The fitted triangle.
    pub fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    /// The growth-curve family selected at build time.
    pub fn growth(&self) -> GrowthCurve {
        self.growth
    }

    /// The prior specification.
    pub fn priors(&self) -> &PriorSpec {
        &self.priors
    }

    /// The fit options.
    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Joint log density over constrained parameters given the triangle.
    ///
    /// `log p(params) = log prior + Σ_y Σ_t log Normal(loss(y, t) | μ(y, t),
    /// premium(y) · σ)` with `μ(y, t) = premium(y) · LR[y] · g(t; ω, θ)`.
    ///
    /// # Errors
    /// - [`DevError::CohortCountMismatch`] when `params.lr` disagrees with
    ///   the triangle.
    /// - Growth-curve domain errors propagate (validated parameters cannot
    ///   produce them; seeing one indicates a parameterization bug).
    ///
    /// # Notes
    /// - The returned value may be `-inf` (zero-probability region, e.g.
    ///   overflowing means); it is never NaN for validated parameters.
    pub fn log_density(&self, params: &LossDevParams) -> DevResult<f64> {
        Ok(self.log_prior(params)? + self.log_likelihood(params)?)
    }

    /// Log prior over constrained parameters.
    fn log_prior(&self, params: &LossDevParams) -> DevResult<f64> {
        let priors = &self.priors;
        let mut total = Normal::new(priors.mu_lr_mean, priors.mu_lr_sd)?.ln_pdf(params.mu_lr);
        total += LogNormal::new(priors.omega.location, priors.omega.scale)?.ln_pdf(params.omega);
        total += LogNormal::new(priors.theta.location, priors.theta.scale)?.ln_pdf(params.theta);
        total += LogNormal::new(priors.sd_lr.location, priors.sd_lr.scale)?.ln_pdf(params.sd_lr);
        total += LogNormal::new(priors.sigma.location, priors.sigma.scale)?.ln_pdf(params.sigma);

        let lr_prior = LogNormal::new(params.mu_lr, params.sd_lr)?;
        for &lr in params.lr.iter() {
            total += lr_prior.ln_pdf(lr);
        }
        Ok(total)
    }

    /// Log likelihood of the observed cells.
    fn log_likelihood(&self, params: &LossDevParams) -> DevResult<f64> {
        if params.lr.len() != self.triangle.n_cohorts() {
            return Err(DevError::CohortCountMismatch {
                expected: self.triangle.n_cohorts(),
                actual: params.lr.len(),
            });
        }
        let mut total = 0.0;
        for (cohort_idx, cohort) in self.triangle.cohorts().iter().enumerate() {
            let premium = cohort.premium();
            let scale = premium * params.lr[cohort_idx];
            let noise = Normal::new(0.0, premium * params.sigma)?;
            for (obs_idx, &lag) in cohort.dev_lags().iter().enumerate() {
                let g = self.growth.value(lag, params.omega, params.theta)?;
                let mu = scale * g;
                total += noise.ln_pdf(cohort.cum_losses()[obs_idx] - mu);
            }
        }
        Ok(total)
    }

    /// Coordinate labels of the unconstrained layout for this triangle.
    pub fn coordinate_names(&self) -> Vec<String> {
        coordinate_names(self.triangle.index().labels())
    }

    /// Draw from the posterior with the injected sampler and assemble an
    /// immutable fit result.
    ///
    /// ## Steps
    /// 1. Run the sampler against this model's unconstrained target with
    ///    the configured iteration/warmup/chain/seed budget.
    /// 2. After **all** chains finish, compute split R-hat and effective
    ///    sample size per coordinate (the diagnostics barrier).
    /// 3. Log every convergence flag via `log::warn!`; flags never block
    ///    the result.
    ///
    /// ## Errors
    /// - [`DevError::SamplerFailed`] wrapping the sampler-layer status
    ///   (invalid configuration, every chain failed, broken target).
    pub fn fit(&self, sampler: &dyn PosteriorSampler) -> DevResult<FitResult> {
        let names = self.coordinate_names();
        let run = sampler
            .run(self, &self.options.sampler)
            .map_err(|err| DevError::SamplerFailed { status: err.to_string() })?;

        let diagnostics =
            ConvergenceReport::compute(&run.chains, &names, &self.options.diagnostics);
        for flag in &diagnostics.flags {
            log::warn!("convergence flag: {flag}");
        }
        if run.failed_chains > 0 {
            log::warn!(
                "{} of {} chains failed; proceeding with {} surviving chains",
                run.failed_chains,
                run.requested_chains,
                run.surviving_chains()
            );
        }

        let draws = run.flattened();
        Ok(FitResult {
            names,
            chains: run.chains,
            draws,
            accept_rates: run.accept_rates,
            failed_chains: run.failed_chains,
            requested_chains: run.requested_chains,
            diagnostics,
            n_cohorts: self.triangle.n_cohorts(),
        })
    }
}

impl LogDensity for LossDevModel {
    fn dim(&self) -> usize {
        LossDevParams::dim(self.triangle.n_cohorts())
    }

    /// Validate an unconstrained state: correct length, finite entries.
    fn check(&self, eta: &ArrayView1<f64>) -> SamplerResult<()> {
        if eta.len() != self.dim() {
            return Err(SamplerError::DimensionMismatch {
                expected: self.dim(),
                actual: eta.len(),
            });
        }
        for &value in eta.iter() {
            if !value.is_finite() {
                return Err(SamplerError::TargetRejected {
                    status: format!("non-finite unconstrained coordinate: {value}"),
                });
            }
        }
        Ok(())
    }

    /// Unconstrained log density: the constrained density at the mapped
    /// parameters plus the log-Jacobian of the log-scale coordinates.
    /// States beyond [`ETA_BOUND`] are zero-probability (`-inf`).
    fn value(&self, eta: &ArrayView1<f64>) -> SamplerResult<f64> {
        self.check(eta)?;
        if eta.iter().any(|v| v.abs() > ETA_BOUND) {
            return Ok(f64::NEG_INFINITY);
        }
        let params = LossDevParams::from_unconstrained(*eta, self.triangle.n_cohorts())?;
        let constrained = self.log_density(&params)?;
        Ok(constrained + params.log_jacobian())
    }
}

/// Immutable result of one posterior fit.
///
/// Everything downstream engines need travels in this value: the retained
/// draws (unconstrained scale, per chain and flattened), per-coordinate
/// convergence diagnostics, acceptance rates, and chain-survival
/// accounting. Nothing here is ever mutated; pass it explicitly to the
/// forecast and PPC engines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    /// Coordinate labels in unconstrained-layout order.
    pub names: Vec<String>,
    /// Retained draws per surviving chain, `(post_warmup, dim)`.
    pub chains: Vec<Array2<f64>>,
    /// All retained draws stacked chain-major, `(total_draws, dim)`.
    pub draws: Array2<f64>,
    /// Post-warmup acceptance rate per surviving chain.
    pub accept_rates: Vec<f64>,
    /// Chains that died (zero draws contributed, never padded).
    pub failed_chains: usize,
    /// Chains requested by the configuration.
    pub requested_chains: usize,
    /// Split R-hat / effective-sample-size report with advisory flags.
    pub diagnostics: ConvergenceReport,
    /// Cohort count of the fitted triangle (loss-ratio block width).
    pub n_cohorts: usize,
}

impl FitResult {
    /// Number of chains that completed their budget.
    pub fn surviving_chains(&self) -> usize {
        self.chains.len()
    }

    /// Total retained draws across surviving chains.
    pub fn total_draws(&self) -> usize {
        self.draws.nrows()
    }

    /// Map every retained draw back to constrained model space, in draw
    /// order. The result feeds the forecast and PPC engines.
    pub fn parameter_draws(&self) -> DevResult<Vec<LossDevParams>> {
        self.draws
            .rows()
            .into_iter()
            .map(|row| {
                LossDevParams::from_unconstrained(row, self.n_cohorts).map_err(DevError::from)
            })
            .collect()
    }
}
