//! Posterior forecasting — anchored proportional-growth extrapolation of
//! cohort development.
//!
//! Purpose
//! -------
//! Project each cohort's development beyond its last observed point, per
//! posterior draw, and package the results as per-cohort forecast cones from
//! which consumers take empirical quantiles.
//!
//! Key behaviors
//! -------------
//! - For lags up to a cohort's last observation the forecast **is** the
//!   observed value; known history is never overwritten by a fitted mean.
//! - Beyond the last observation, the draw's sampled growth shape scales the
//!   observed anchor:
//!   `predicted(y, t, d) = L_obs · g(t; ω_d, θ_d) / g(t_obs; ω_d, θ_d)`.
//!   Anchoring to the observed position keeps forecasts consistent with
//!   ground truth at the cutoff and uses only the sampled curve shape for
//!   the future-to-current ratio, so the fit residual at the anchor is not
//!   double-counted.
//! - Draws whose growth value at the anchor lag underflows to ~0 make the
//!   ratio undefined; they are **excluded** from that cohort's cone and
//!   counted, never clamped and never propagated as `NaN`/`inf`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Draw parameters come from validated [`LossDevParams`]; growth-curve
//!   domain errors therefore indicate a logic bug upstream and are
//!   propagated, not swallowed.
//! - The grid is the one owned by the cohort's triangle; every grid lag up
//!   to `max_observed_lag` has an observed value (triangular invariant).
//!
//! Conventions
//! -----------
//! - Cone rows are draws (in `draw_indices` order), columns are grid lags.
//! - Forecasting is deterministic given `(draws, triangle)`: rerunning
//!   produces identical cones, and cohort fan-out merges in triangle order.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the anchoring boundary (`t == t_obs` equals the
//!   observed value), the fixed-ratio law against hand-computed values,
//!   determinism, exclusion accounting, and quantile behavior.
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use serde::Serialize;

use crate::development::{
    core::{
        data::{Cohort, Triangle},
        grid::LagGrid,
        growth::GrowthCurve,
        params::LossDevParams,
    },
    errors::{DevError, DevResult},
};

/// Smallest usable growth value at the anchor lag. A draw whose
/// `g(t_obs; ω, θ)` falls below this has effectively underflowed to zero
/// and is excluded from that cohort's cone.
pub const DENOM_FLOOR: f64 = 1e-300;

/// `ForecastCone` — one cohort's predicted development paths across draws.
///
/// Purpose
/// -------
/// Hold the full-length predicted cumulative-loss path at every grid lag for
/// every usable posterior draw of one cohort, with observed values held
/// fixed and only development beyond the last observation extrapolated.
///
/// Fields
/// ------
/// - `label`: cohort identity.
/// - `lags`: the global grid, ascending (columns of `paths`).
/// - `draw_indices`: positions (into the fit's draw sequence) of the draws
///   that survived the degenerate-denominator exclusion, ascending; row `i`
///   of `paths` belongs to draw `draw_indices[i]`.
/// - `paths`: `(usable_draws, n_lags)` predicted cumulative losses.
/// - `excluded_draws`: draws dropped by the exclusion policy.
///
/// Invariants
/// ----------
/// - `paths.nrows() == draw_indices.len()`;
///   `paths.ncols() == lags.len()`.
/// - For columns at or before the cohort's last observed lag, every row
///   holds the observed value exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastCone {
    label: String,
    lags: Vec<f64>,
    draw_indices: Vec<usize>,
    paths: Array2<f64>,
    excluded_draws: usize,
}

impl ForecastCone {
    /// Cohort label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Grid lags (columns), ascending.
    pub fn lags(&self) -> &[f64] {
        &self.lags
    }

    /// Draw positions owning each row of [`ForecastCone::paths`].
    pub fn draw_indices(&self) -> &[usize] {
        &self.draw_indices
    }

    /// Predicted paths, `(usable_draws, n_lags)`.
    pub fn paths(&self) -> &Array2<f64> {
        &self.paths
    }

    /// Draws excluded by the degenerate-denominator policy.
    pub fn excluded_draws(&self) -> usize {
        self.excluded_draws
    }

    /// Predicted values at the terminal grid lag, one per usable draw.
    pub fn terminal_column(&self) -> ArrayView1<f64> {
        self.paths.column(self.paths.ncols() - 1)
    }

    /// Empirical quantile of the predicted value at grid position
    /// `lag_idx` across usable draws (linear interpolation between order
    /// statistics).
    ///
    /// # Errors
    /// - [`DevError::InvalidQuantile`] for `prob` outside `[0, 1]`.
    /// - [`DevError::EmptyForecast`] when every draw was excluded.
    ///
    /// # Panics
    /// Panics if `lag_idx` is out of range; grid positions are a logic
    /// concern of the caller.
    pub fn quantile(&self, lag_idx: usize, prob: f64) -> DevResult<f64> {
        if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
            return Err(DevError::InvalidQuantile { value: prob });
        }
        if self.paths.nrows() == 0 {
            return Err(DevError::EmptyForecast { cohort: self.label.clone() });
        }
        let mut column: Vec<f64> = self.paths.column(lag_idx).to_vec();
        column.sort_by(f64::total_cmp);
        Ok(interpolated_quantile(&column, prob))
    }
}

/// Empirical quantile of a sorted sample with linear interpolation.
pub(crate) fn interpolated_quantile(sorted: &[f64], prob: f64) -> f64 {
    let position = prob * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let frac = position - lo as f64;
    if lo + 1 < sorted.len() {
        sorted[lo] * (1.0 - frac) + sorted[lo + 1] * frac
    } else {
        sorted[lo]
    }
}

/// `ForecastSet` — cones for every cohort of a triangle, in triangle order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSet {
    cones: Vec<ForecastCone>,
    n_draws: usize,
}

impl ForecastSet {
    /// Cones in dense cohort order.
    pub fn cones(&self) -> &[ForecastCone] {
        &self.cones
    }

    /// Cone for cohort index `idx`.
    ///
    /// # Panics
    /// Panics if `idx` is out of range.
    pub fn cone(&self, idx: usize) -> &ForecastCone {
        &self.cones[idx]
    }

    /// Number of posterior draws the set was built from (before exclusion).
    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    /// Total `(draw, cohort)` pairs excluded across all cones.
    pub fn excluded_total(&self) -> usize {
        self.cones.iter().map(ForecastCone::excluded_draws).sum()
    }
}

/// Forecast one cohort's development across posterior draws.
///
/// Parameters
/// ----------
/// - `cohort`: the cohort to extrapolate; its observed lags must be a
///   prefix of `grid` (guaranteed when both come from the same triangle).
/// - `grid`: the triangle's global lag grid.
/// - `draws`: posterior parameter draws; only `(ω, θ)` are read here.
/// - `growth`: growth-curve family selected at model-build time.
///
/// Returns
/// -------
/// `DevResult<ForecastCone>` with one row per usable draw.
///
/// Errors
/// ------
/// - Growth-curve domain errors propagate (they indicate invalid draw
///   parameters, which validated draws cannot produce).
///
/// Panics
/// ------
/// Panics if `cohort` and `grid` come from different triangles (an
/// observed grid lag missing from the cohort is a logic error).
pub fn forecast_cohort(
    cohort: &Cohort, grid: &LagGrid, draws: &[LossDevParams], growth: GrowthCurve,
) -> DevResult<ForecastCone> {
    let (t_obs, l_obs) = cohort.latest_observed();
    let n_lags = grid.len();

    let mut draw_indices = Vec::with_capacity(draws.len());
    let mut rows: Vec<f64> = Vec::with_capacity(draws.len() * n_lags);
    let mut excluded_draws = 0usize;

    for (draw_idx, params) in draws.iter().enumerate() {
        let g_obs = growth.value(t_obs, params.omega, params.theta)?;
        if g_obs < DENOM_FLOOR {
            excluded_draws += 1;
            continue;
        }
        for lag_idx in 0..n_lags {
            let lag = grid.lag(lag_idx);
            let value = if lag <= t_obs {
                cohort
                    .loss_at(lag)
                    .expect("grid lags up to the anchor are observed for a triangular cohort")
            } else {
                l_obs * growth.value(lag, params.omega, params.theta)? / g_obs
            };
            rows.push(value);
        }
        draw_indices.push(draw_idx);
    }

    let paths = Array2::from_shape_vec((draw_indices.len(), n_lags), rows)
        .expect("row construction matches (usable_draws, n_lags)");
    Ok(ForecastCone {
        label: cohort.label().to_string(),
        lags: grid.as_slice().to_vec(),
        draw_indices,
        paths,
        excluded_draws,
    })
}

/// Forecast every cohort of a triangle across posterior draws.
///
/// Cohorts are independent and fan out over rayon; results merge in dense
/// cohort order, so the output is deterministic given `(triangle, draws)`.
pub fn forecast_triangle(
    triangle: &Triangle, draws: &[LossDevParams], growth: GrowthCurve,
) -> DevResult<ForecastSet> {
    let cones: DevResult<Vec<ForecastCone>> = triangle
        .cohorts()
        .par_iter()
        .map(|cohort| forecast_cohort(cohort, triangle.grid(), draws, growth))
        .collect();
    Ok(ForecastSet { cones: cones?, n_draws: draws.len() })
}
