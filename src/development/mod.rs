//! development — the loss-development modeling stack.
//!
//! Purpose
//! -------
//! Provide a cohesive hierarchical loss-development layer: validated
//! triangle data, growth-curve families, the joint probability model with
//! its unconstrained sampling target, posterior forecasting, and PPC
//! reductions, under a single namespace. This is the surface most consumers
//! should depend on.
//!
//! Key behaviors
//! -------------
//! - Collect core numerical and structural building blocks in [`core`]:
//!   triangles and index maps, growth curves, parameter containers and
//!   their unconstrained mapping, priors, fit options, forecast cones, and
//!   PPC summaries.
//! - Expose the user-facing model API in [`models`] via [`LossDevModel`]:
//!   constrained-space density, the sampler target, and `fit` returning an
//!   immutable [`FitResult`].
//! - Centralize development-stack error types in [`errors`] ([`DevError`],
//!   [`ParamError`], and the `DevResult` / `ParamResult` aliases) so
//!   callers see a uniform error surface.
//!
//! Invariants & assumptions
//! ------------------------
//! - Triangles are validated at construction (positive consistent
//!   premiums, finite values, triangular prefix layout) and immutable
//!   afterwards; every downstream computation shares them read-only.
//! - Parameter positivity is enforced by construction: samplers move on an
//!   unconstrained space that maps bijectively onto valid parameter sets.
//! - Forecast and PPC reductions are deterministic given `(draws,
//!   triangle)` and parallel-safe across `(draw, cohort)` pairs.
//!
//! Downstream usage
//! ----------------
//! - Typical end-to-end flow:
//!   1. Build a [`Triangle`] from filtered records.
//!   2. Pick a [`GrowthCurve`] and assemble a [`LossDevModel`] with
//!      [`PriorSpec`] and [`FitOptions`].
//!   3. Fit with any `PosteriorSampler` (the bundled random-walk reference
//!      or an external engine) to obtain a [`FitResult`].
//!   4. Map draws to model space (`FitResult::parameter_draws`), run
//!      [`core::forecast_triangle`], and reduce with
//!      [`core::PpcSummary::from_forecasts`].
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each submodule; the full pipeline (triangle →
//!   fit → forecast → PPC) is exercised by the integration tests under
//!   `tests/`.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------
//
// These are the “everyday” types most users need. More specialized items
// (index maps, quantile helpers, constants) remain under their submodules.

pub use self::core::{
    forecast_triangle, FitOptions, ForecastCone, ForecastSet, GrowthCurve, LossDevParams,
    PpcSummary, PriorSpec, RealizedOutcome, Triangle, TriangleRecord,
};

pub use self::errors::{DevError, DevResult, ParamError, ParamResult};

pub use self::models::{FitResult, LossDevModel};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use loss_reserving::development::prelude::*;
//
// to import the main loss-development surface in a single line.

pub mod prelude {
    pub use super::{
        forecast_triangle, DevError, DevResult, FitOptions, FitResult, ForecastCone, ForecastSet,
        GrowthCurve, LossDevModel, LossDevParams, ParamError, ParamResult, PpcSummary, PriorSpec,
        RealizedOutcome, Triangle, TriangleRecord,
    };
}
