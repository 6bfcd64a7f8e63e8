//! loss_reserving — hierarchical Bayesian loss-development modeling.
//!
//! Purpose
//! -------
//! Estimate, from partially observed loss development triangles, the
//! eventual total claims an insurer must reserve for: fit a hierarchical
//! growth-curve model to historical claim development by full-MCMC
//! posterior sampling, extrapolate each cohort's unobserved future
//! development, and reduce the draws to reserve estimates with
//! posterior-predictive-check statistics.
//!
//! Key behaviors
//! -------------
//! - [`development`] holds the domain stack: validated triangles, growth
//!   curves, the joint probability model, forecast cones, and PPC
//!   summaries.
//! - [`sampling`] formalizes posterior sampling as an injected capability
//!   (trait + reference random-walk Metropolis + deterministic replay), so
//!   the core never assumes a particular inference algorithm.
//! - [`inference`] computes cross-chain convergence diagnostics (split
//!   R-hat, effective sample size) after every chain finishes.
//!
//! Invariants & assumptions
//! ------------------------
//! - One triangle, one organization, full-MCMC sampling: joint multi-line
//!   modeling and alternative inference methods are out of scope.
//! - Every fit returns an immutable `FitResult`; the crate holds no
//!   process-wide state.
//! - File parsing and plotting are external collaborators: the crate
//!   consumes pre-filtered records and produces serializable outputs.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use loss_reserving::development::prelude::*;
//! use loss_reserving::sampling::RandomWalkMetropolis;
//!
//! # fn main() -> Result<(), DevError> {
//! let records = vec![
//!     TriangleRecord::new("1988", 1.0, 100.0, 12.0),
//!     TriangleRecord::new("1988", 2.0, 100.0, 24.0),
//!     TriangleRecord::new("1989", 1.0, 120.0, 15.0),
//! ];
//! let triangle = Triangle::from_records(&records)?;
//! let model = LossDevModel::new(
//!     triangle,
//!     GrowthCurve::Weibull,
//!     PriorSpec::default(),
//!     FitOptions::default(),
//! );
//! let fit = model.fit(&RandomWalkMetropolis::default())?;
//! let draws = fit.parameter_draws()?;
//! let forecasts = forecast_triangle(model.triangle(), &draws, model.growth())?;
//! let ppc = PpcSummary::from_forecasts(model.triangle(), &draws, &forecasts)?;
//! # let _ = ppc;
//! # Ok(())
//! # }
//! ```

pub mod development;
pub mod inference;
pub mod sampling;
