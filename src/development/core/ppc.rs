//! Posterior-predictive-check statistics over draws and realized outcomes.
//!
//! Purpose
//! -------
//! Reduce a posterior draw set and its forecasts to the scalar
//! model-checking statistics compared against observed data:
//!
//! - `min_lr(d)` / `max_lr(d)`: per-draw extremes of the ultimate loss
//!   ratios across cohorts, compared against the extreme observed loss
//!   ratio among fully developed cohorts.
//! - `efc(d)`: per-draw expected future claims — the sum over cohorts of
//!   the terminal-lag forecast minus the claims known at the snapshot. A
//!   fully observed cohort contributes exactly zero (its terminal forecast
//!   *is* the known value).
//! - Realized comparators: `tckc` (total claims known at cutoff), `afc`
//!   (actual final claims observed later), and
//!   `future_claims_actual = afc − tckc`, located within the `efc`
//!   distribution as a calibration measure.
//!
//! All statistics are pure reductions over draws and observed data; no
//! shared mutable state. Draw/cohort pairs excluded by the forecast
//! engine's degenerate-denominator policy are skipped and surfaced through
//! the exclusion count.
use serde::Serialize;

use crate::development::{
    core::{data::Triangle, forecasts::{interpolated_quantile, ForecastSet}, params::LossDevParams},
    errors::{DevError, DevResult},
};

/// Per-draw PPC scalar distributions plus their observed comparators.
///
/// Produced by [`PpcSummary::from_forecasts`]; consumers compare the draw
/// distributions against the observed/realized scalars (histograms,
/// percentile locations).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PpcSummary {
    /// Per-draw minimum ultimate loss ratio across cohorts.
    pub min_lr: Vec<f64>,
    /// Per-draw maximum ultimate loss ratio across cohorts.
    pub max_lr: Vec<f64>,
    /// Per-draw expected future claims across cohorts.
    pub efc: Vec<f64>,
    /// `(draw, cohort)` pairs excluded by the forecast engine.
    pub excluded_pairs: usize,
    /// Observed minimum loss ratio among fully developed cohorts, if any.
    pub observed_min_lr: Option<f64>,
    /// Observed maximum loss ratio among fully developed cohorts, if any.
    pub observed_max_lr: Option<f64>,
}

impl PpcSummary {
    /// Reduce draws and forecasts to the PPC scalar distributions.
    ///
    /// Parameters
    /// ----------
    /// - `triangle`: the fitted triangle (known claims, full-development
    ///   status).
    /// - `draws`: posterior parameter draws, aligned with the forecast
    ///   set's draw indexing.
    /// - `forecasts`: cones produced from the same `draws` and `triangle`.
    ///
    /// Errors
    /// ------
    /// - [`DevError::CohortCountMismatch`] when a draw's loss-ratio vector
    ///   disagrees with the triangle.
    /// - [`DevError::DrawCountMismatch`] when the forecast set was built
    ///   from a different number of draws.
    pub fn from_forecasts(
        triangle: &Triangle, draws: &[LossDevParams], forecasts: &ForecastSet,
    ) -> DevResult<PpcSummary> {
        let n_cohorts = triangle.n_cohorts();
        for params in draws {
            if params.lr.len() != n_cohorts {
                return Err(DevError::CohortCountMismatch {
                    expected: n_cohorts,
                    actual: params.lr.len(),
                });
            }
        }
        if forecasts.n_draws() != draws.len() {
            return Err(DevError::DrawCountMismatch {
                expected: draws.len(),
                actual: forecasts.n_draws(),
            });
        }

        let min_lr = draws
            .iter()
            .map(|p| p.lr.iter().copied().fold(f64::INFINITY, f64::min))
            .collect();
        let max_lr = draws
            .iter()
            .map(|p| p.lr.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect();

        let mut efc = vec![0.0; draws.len()];
        for (cohort_idx, cone) in forecasts.cones().iter().enumerate() {
            let known = triangle.cohort(cohort_idx).latest_observed().1;
            let terminal = cone.terminal_column();
            for (row, &draw_idx) in cone.draw_indices().iter().enumerate() {
                efc[draw_idx] += terminal[row] - known;
            }
        }

        let mut observed_min_lr: Option<f64> = None;
        let mut observed_max_lr: Option<f64> = None;
        for idx in 0..n_cohorts {
            if triangle.fully_developed(idx) {
                let lr = triangle.cohort(idx).latest_loss_ratio();
                observed_min_lr = Some(observed_min_lr.map_or(lr, |m| m.min(lr)));
                observed_max_lr = Some(observed_max_lr.map_or(lr, |m| m.max(lr)));
            }
        }

        Ok(PpcSummary {
            min_lr,
            max_lr,
            efc,
            excluded_pairs: forecasts.excluded_total(),
            observed_min_lr,
            observed_max_lr,
        })
    }

    /// Number of draws the distributions cover.
    pub fn n_draws(&self) -> usize {
        self.efc.len()
    }

    /// Empirical quantile of the expected-future-claims distribution.
    pub fn efc_quantile(&self, prob: f64) -> DevResult<f64> {
        if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
            return Err(DevError::InvalidQuantile { value: prob });
        }
        let mut sorted = self.efc.clone();
        sorted.sort_by(f64::total_cmp);
        Ok(interpolated_quantile(&sorted, prob))
    }

    /// Fraction of draws with expected future claims at or below `value`
    /// (the realized value's location in the `efc` distribution; a
    /// calibrated model places realized outcomes away from both tails).
    pub fn efc_percentile(&self, value: f64) -> f64 {
        let below = self.efc.iter().filter(|&&e| e <= value).count();
        below as f64 / self.efc.len() as f64
    }
}

/// Realized outcome comparators for a triangle whose cohorts were later
/// observed to full development.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealizedOutcome {
    /// Total claims known at the snapshot cutoff.
    pub tckc: f64,
    /// Actual final claims summed over cohorts.
    pub afc: f64,
    /// `afc − tckc`: the realized counterpart of the `efc` distribution.
    pub future_claims_actual: f64,
}

impl RealizedOutcome {
    /// Build from later-observed actual final losses, one per cohort label.
    ///
    /// Parameters
    /// ----------
    /// - `triangle`: the triangle the model was fit on (supplies `tckc`).
    /// - `actual_finals`: `(label, final cumulative loss)` pairs covering
    ///   every cohort in the triangle; extra labels are rejected as
    ///   unknown.
    ///
    /// Errors
    /// ------
    /// - [`DevError::UnknownCohort`] for labels absent from the triangle.
    /// - [`DevError::MissingActualFinal`] when a triangle cohort has no
    ///   actual final value.
    pub fn from_actual_finals(
        triangle: &Triangle, actual_finals: &[(String, f64)],
    ) -> DevResult<RealizedOutcome> {
        let mut finals = vec![None; triangle.n_cohorts()];
        for (label, value) in actual_finals {
            let idx = triangle
                .index()
                .index_of(label)
                .ok_or_else(|| DevError::UnknownCohort { label: label.clone() })?;
            finals[idx] = Some(*value);
        }
        let mut afc = 0.0;
        for (idx, value) in finals.iter().enumerate() {
            match value {
                Some(v) => afc += v,
                None => {
                    return Err(DevError::MissingActualFinal {
                        cohort: triangle.index().label(idx).to_string(),
                    });
                }
            }
        }
        let tckc = triangle.total_known_claims();
        Ok(RealizedOutcome { tckc, afc, future_claims_actual: afc - tckc })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::development::core::{
        data::TriangleRecord, forecasts::forecast_triangle, growth::GrowthCurve,
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Per-draw loss-ratio extremes and observed comparators.
    // - EFC accounting, including the zero contribution of fully observed
    //   cohorts and skipped excluded pairs.
    // - Realized-outcome arithmetic and its error paths.
    // -------------------------------------------------------------------------

    fn make_triangle() -> Triangle {
        let mut records = Vec::new();
        for (lag, loss) in [(1.0, 10.0), (2.0, 20.0), (3.0, 27.0), (4.0, 31.0), (5.0, 33.0)] {
            records.push(TriangleRecord::new("A", lag, 100.0, loss));
        }
        for (lag, loss) in [(1.0, 8.0), (2.0, 15.0)] {
            records.push(TriangleRecord::new("B", lag, 100.0, loss));
        }
        Triangle::from_records(&records).unwrap()
    }

    fn make_draw(omega: f64, theta: f64, lr_a: f64, lr_b: f64) -> LossDevParams {
        LossDevParams::new(omega, theta, -0.9, 0.2, 0.05, array![lr_a, lr_b], 2).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify the per-draw extremes and the observed comparators: only "A"
    // is fully developed, so both observed extremes equal 33/100.
    fn ppc_extremes_and_observed_comparators() {
        let triangle = make_triangle();
        let draws = vec![make_draw(1.5, 2.2, 0.4, 0.6), make_draw(1.5, 2.2, 0.7, 0.3)];
        let forecasts = forecast_triangle(&triangle, &draws, GrowthCurve::Weibull).unwrap();

        let summary = PpcSummary::from_forecasts(&triangle, &draws, &forecasts).unwrap();

        assert_eq!(summary.min_lr, vec![0.4, 0.3]);
        assert_eq!(summary.max_lr, vec![0.6, 0.7]);
        assert_eq!(summary.observed_min_lr, Some(0.33));
        assert_eq!(summary.observed_max_lr, Some(0.33));
    }

    #[test]
    // Purpose
    // -------
    // Verify EFC accounting: the fully observed cohort "A" contributes
    // exactly zero, so EFC equals cohort B's terminal forecast minus its
    // known claims.
    fn ppc_efc_is_future_development_only() {
        let triangle = make_triangle();
        let draws = vec![make_draw(1.5, 2.2, 0.4, 0.4)];
        let forecasts = forecast_triangle(&triangle, &draws, GrowthCurve::Weibull).unwrap();

        let summary = PpcSummary::from_forecasts(&triangle, &draws, &forecasts).unwrap();

        let g5 = GrowthCurve::Weibull.value(5.0, 1.5, 2.2).unwrap();
        let g2 = GrowthCurve::Weibull.value(2.0, 1.5, 2.2).unwrap();
        let expected = 15.0 * g5 / g2 - 15.0;
        assert_eq!(summary.efc.len(), 1);
        assert_relative_eq!(summary.efc[0], expected, max_relative = 1e-12);
        assert_eq!(summary.excluded_pairs, 0);
    }

    #[test]
    // Purpose
    // -------
    // Verify excluded pairs are skipped, not propagated: a degenerate draw
    // contributes no cohort-B development to its EFC entry and shows up in
    // the exclusion count.
    fn ppc_skips_excluded_pairs() {
        let triangle = make_triangle();
        let degenerate = make_draw(600.0, 1.0e6, 0.4, 0.4);
        let draws = vec![degenerate, make_draw(1.5, 2.2, 0.4, 0.4)];
        let forecasts = forecast_triangle(&triangle, &draws, GrowthCurve::Weibull).unwrap();

        let summary = PpcSummary::from_forecasts(&triangle, &draws, &forecasts).unwrap();

        assert!(summary.excluded_pairs >= 1);
        assert_eq!(summary.efc[0], 0.0);
        assert!(summary.efc[1] > 0.0);
        assert!(summary.efc.iter().all(|v| v.is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // Verify realized-outcome arithmetic and error paths: TCKC from the
    // triangle, AFC from the supplied finals, and typed errors for unknown
    // or missing cohorts.
    fn realized_outcome_arithmetic_and_errors() {
        let triangle = make_triangle();

        let outcome = RealizedOutcome::from_actual_finals(
            &triangle,
            &[("A".to_string(), 33.0), ("B".to_string(), 36.0)],
        )
        .unwrap();
        assert_eq!(outcome.tckc, 48.0);
        assert_eq!(outcome.afc, 69.0);
        assert_eq!(outcome.future_claims_actual, 21.0);

        assert_eq!(
            RealizedOutcome::from_actual_finals(&triangle, &[("C".to_string(), 1.0)])
                .unwrap_err(),
            DevError::UnknownCohort { label: "C".to_string() }
        );
        assert_eq!(
            RealizedOutcome::from_actual_finals(&triangle, &[("A".to_string(), 33.0)])
                .unwrap_err(),
            DevError::MissingActualFinal { cohort: "B".to_string() }
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify the percentile locator against a hand-built EFC distribution.
    fn ppc_percentile_locates_values() {
        let summary = PpcSummary {
            min_lr: vec![],
            max_lr: vec![],
            efc: vec![1.0, 2.0, 3.0, 4.0],
            excluded_pairs: 0,
            observed_min_lr: None,
            observed_max_lr: None,
        };
        assert_eq!(summary.efc_percentile(0.5), 0.0);
        assert_eq!(summary.efc_percentile(2.0), 0.5);
        assert_eq!(summary.efc_percentile(10.0), 1.0);
        assert_eq!(summary.efc_quantile(0.5).unwrap(), 2.5);
    }
}
