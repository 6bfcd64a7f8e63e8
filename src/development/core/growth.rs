//! Growth-curve families for loss-development models.
//!
//! This module defines [`GrowthCurve`], which enumerates the supported
//! parametric growth functions mapping development time to the fraction of
//! ultimate loss realized. Both families share one signature and are
//! interchangeable behind the same call; the variant is chosen once at
//! model-build time.
//!
//! ## Supported families
//! - [`GrowthCurve::Weibull`]: `g(t) = t^ω / (t^ω + θ^ω)`.
//! - [`GrowthCurve::LogLogistic`]: `g(t) = 1 − exp(−(t/θ)^ω)`.
//!
//! ## Contract
//! For `t >= 0`, `ω > 0`, `θ > 0`: `g(t) ∈ [0, 1)`, strictly increasing in
//! `t`, `g(0) = 0`, and `g(t) → 1` as `t → ∞`. Out-of-domain inputs are
//! rejected with typed errors, never clamped.
//!
//! ## Numerics
//! - Power terms are evaluated through logs (`exp(ω · (ln a − ln b))`) so
//!   large `t/θ` ratios cannot overflow before the final ratio is formed.
//! - The log-logistic tail uses `exp_m1` to keep precision where
//!   `(t/θ)^ω` is small.
//! - Results are capped at [`GROWTH_CEIL`] so the `[0, 1)` contract holds in
//!   floating point even where the true value rounds to 1.
use serde::Serialize;

use crate::development::errors::{DevError, DevResult};

/// Largest representable growth value; keeps `g(t) < 1` in floating point
/// for extreme `t/θ` where the exact value would round to 1.0.
pub const GROWTH_CEIL: f64 = 1.0 - f64::EPSILON;

/// Parametric growth-curve families.
///
/// A pure strategy tag: `ω` and `θ` are call-time inputs (they are sampled
/// model parameters), not stored state. Immutable and `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrowthCurve {
    /// `g(t) = t^ω / (t^ω + θ^ω)`.
    Weibull,
    /// `g(t) = 1 − exp(−(t/θ)^ω)`.
    LogLogistic,
}

impl GrowthCurve {
    /// Resolve the upstream discrete model identifier (`0` = log-logistic,
    /// `1` = Weibull). This is the single translation point for callers
    /// holding the integer convention; everything else uses the enum.
    pub fn from_model_id(id: u8) -> Option<GrowthCurve> {
        match id {
            0 => Some(GrowthCurve::LogLogistic),
            1 => Some(GrowthCurve::Weibull),
            _ => None,
        }
    }

    /// Evaluate the cumulative-development fraction `g(t; ω, θ)`.
    ///
    /// # Arguments
    /// - `t`: development time, `t >= 0` and finite.
    /// - `omega`: shape, finite and `> 0`.
    /// - `theta`: scale, finite and `> 0`.
    ///
    /// # Returns
    /// A value in `[0, 1)`: exactly `0.0` at `t = 0`, strictly increasing in
    /// `t`, approaching 1 for `t ≫ θ` (capped at [`GROWTH_CEIL`]).
    ///
    /// # Errors
    /// - [`DevError::NegativeDevTime`] / [`DevError::NonFiniteDevTime`] for
    ///   invalid `t`.
    /// - [`DevError::NonPositiveShape`] / [`DevError::NonPositiveScale`] for
    ///   invalid `ω` / `θ`.
    ///
    /// # Notes
    /// - The Weibull ratio is computed as `1 / (1 + exp(ω · (ln θ − ln t)))`
    ///   so neither `t^ω` nor `θ^ω` is ever formed directly; an overflowing
    ///   exponent degrades gracefully to `0` or the cap instead of `inf/inf`.
    pub fn value(&self, t: f64, omega: f64, theta: f64) -> DevResult<f64> {
        validate_growth_inputs(t, omega, theta)?;
        if t == 0.0 {
            return Ok(0.0);
        }
        let g = match self {
            GrowthCurve::Weibull => {
                // 1 / (1 + (θ/t)^ω), with the power taken through logs.
                let log_ratio = omega * (theta.ln() - t.ln());
                1.0 / (1.0 + log_ratio.exp())
            }
            GrowthCurve::LogLogistic => {
                // 1 − exp(−(t/θ)^ω), with the power taken through logs.
                let power = (omega * (t.ln() - theta.ln())).exp();
                -(-power).exp_m1()
            }
        };
        Ok(g.min(GROWTH_CEIL))
    }
}

/// Validate growth-curve inputs; shared by both families.
fn validate_growth_inputs(t: f64, omega: f64, theta: f64) -> DevResult<()> {
    if !t.is_finite() {
        return Err(DevError::NonFiniteDevTime { value: t });
    }
    if t < 0.0 {
        return Err(DevError::NegativeDevTime { value: t });
    }
    if !omega.is_finite() || omega <= 0.0 {
        return Err(DevError::NonPositiveShape { value: omega });
    }
    if !theta.is_finite() || theta <= 0.0 {
        return Err(DevError::NonPositiveScale { value: theta });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FAMILIES: [GrowthCurve; 2] = [GrowthCurve::Weibull, GrowthCurve::LogLogistic];

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the growth-function laws for both families:
    // - g(0) = 0, strict monotonicity, convergence to 1 for large t.
    // - Closed-form agreement at interior points.
    // - Domain rejection for negative time and non-positive shape/scale.
    // - The model-id translation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify `g(0) = 0` exactly for both families across parameter values.
    fn growth_is_zero_at_time_zero() {
        for family in FAMILIES {
            for &(omega, theta) in &[(0.5, 1.0), (1.5, 2.2), (3.0, 10.0)] {
                assert_eq!(family.value(0.0, omega, theta).unwrap(), 0.0);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify strict monotonicity over an increasing time sequence for both
    // families (the monotonicity law g(t1) < g(t2) for t1 < t2).
    fn growth_is_strictly_increasing() {
        for family in FAMILIES {
            let mut prev = family.value(0.0, 1.5, 2.2).unwrap();
            for step in 1..=60 {
                let t = step as f64 * 0.25;
                let g = family.value(t, 1.5, 2.2).unwrap();
                assert!(g > prev, "{family:?} not increasing at t = {t}: {g} <= {prev}");
                prev = g;
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify convergence to 1 within tolerance for large t, and that the
    // [0, 1) cap holds even at extreme t/θ ratios.
    fn growth_approaches_one_for_large_t() {
        for family in FAMILIES {
            let far = family.value(1.0e4, 1.5, 2.2).unwrap();
            assert!(far > 0.999, "{family:?} far value {far}");
            assert!(far < 1.0);

            let extreme = family.value(1.0e300, 5.0, 1.0).unwrap();
            assert!(extreme < 1.0);
            assert!(extreme >= GROWTH_CEIL - f64::EPSILON);
        }
    }

    #[test]
    // Purpose
    // -------
    // Pin both families to their closed forms at an interior point.
    //
    // Given
    // -----
    // - t = 2.0, ω = 1.5, θ = 2.2.
    //
    // Expect
    // ------
    // - Weibull matches t^ω / (t^ω + θ^ω).
    // - Log-logistic matches 1 − exp(−(t/θ)^ω).
    fn growth_matches_closed_forms() {
        let (t, omega, theta) = (2.0_f64, 1.5_f64, 2.2_f64);

        let weibull = GrowthCurve::Weibull.value(t, omega, theta).unwrap();
        let expected_weibull = t.powf(omega) / (t.powf(omega) + theta.powf(omega));
        assert_relative_eq!(weibull, expected_weibull, max_relative = 1e-12);

        let loglogistic = GrowthCurve::LogLogistic.value(t, omega, theta).unwrap();
        let expected_loglogistic = 1.0 - (-(t / theta).powf(omega)).exp();
        assert_relative_eq!(loglogistic, expected_loglogistic, max_relative = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Ensure out-of-domain inputs are rejected with the matching typed
    // error and never clamped.
    fn growth_rejects_out_of_domain_inputs() {
        for family in FAMILIES {
            assert_eq!(
                family.value(-1.0, 1.5, 2.2).unwrap_err(),
                DevError::NegativeDevTime { value: -1.0 }
            );
            // NaN payloads never compare equal; match on the variant.
            assert!(matches!(
                family.value(f64::NAN, 1.5, 2.2).unwrap_err(),
                DevError::NonFiniteDevTime { .. }
            ));
            assert_eq!(
                family.value(1.0, 0.0, 2.2).unwrap_err(),
                DevError::NonPositiveShape { value: 0.0 }
            );
            assert_eq!(
                family.value(1.0, 1.5, -2.2).unwrap_err(),
                DevError::NonPositiveScale { value: -2.2 }
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Pin the upstream integer convention: 0 = log-logistic, 1 = Weibull,
    // anything else unknown.
    fn growth_model_id_translation() {
        assert_eq!(GrowthCurve::from_model_id(0), Some(GrowthCurve::LogLogistic));
        assert_eq!(GrowthCurve::from_model_id(1), Some(GrowthCurve::Weibull));
        assert_eq!(GrowthCurve::from_model_id(2), None);
    }
}
