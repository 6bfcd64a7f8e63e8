//! core — shared loss-development data, parameters, and engines.
//!
//! Purpose
//! -------
//! Collect the core building blocks for hierarchical loss-development
//! modeling: the triangle data model and its index structures, growth-curve
//! families, parameter containers with their unconstrained mapping, prior
//! and fit configuration, posterior forecasting, and PPC reductions. The
//! user-facing model in [`crate::development::models`] composes these
//! primitives.
//!
//! Key behaviors
//! -------------
//! - Data model: [`TriangleRecord`], [`Cohort`], [`Triangle`] with the
//!   triangular-prefix invariant, plus [`LagGrid`] / [`CohortIndex`] for
//!   contiguous, stable indexing ([`data`], [`grid`]).
//! - Growth curves: the [`GrowthCurve`] strategy enum with domain-checked,
//!   numerically guarded evaluation ([`growth`]).
//! - Parameters: [`LossDevParams`] and the bijection to the unconstrained
//!   sampling space ([`params`]).
//! - Configuration: [`PriorSpec`] hyperpriors and [`FitOptions`] /
//!   [`DiagnosticOptions`] ([`priors`], [`options`]).
//! - Engines: anchored proportional-growth forecasting
//!   ([`forecasts`]) and PPC scalar reductions ([`ppc`]).
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; cohorts are ordered lexicographically by label
//!   and loss-ratio vectors follow that order.
//! - Everything here is immutable after construction and free of I/O;
//!   errors are surfaced as `DevResult` / `ParamResult`, while panics are
//!   reserved for logic bugs such as cross-triangle index mixing.

pub mod data;
pub mod forecasts;
pub mod grid;
pub mod growth;
pub mod options;
pub mod params;
pub mod ppc;
pub mod priors;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{Cohort, Triangle, TriangleRecord};
pub use self::forecasts::{forecast_cohort, forecast_triangle, ForecastCone, ForecastSet,
    DENOM_FLOOR};
pub use self::grid::{CohortIndex, LagGrid};
pub use self::growth::{GrowthCurve, GROWTH_CEIL};
pub use self::options::{DiagnosticOptions, FitOptions};
pub use self::params::{coordinate_names, LossDevParams};
pub use self::ppc::{PpcSummary, RealizedOutcome};
pub use self::priors::{LogNormalPrior, PriorSpec};
