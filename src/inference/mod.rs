//! inference — post-sampling convergence diagnostics.
//!
//! Purpose
//! -------
//! Provide the cross-chain statistics computed after a sampling run
//! completes: split R-hat and effective sample size per parameter
//! coordinate, packaged as a [`ConvergenceReport`] with non-fatal
//! [`ConvergenceFlag`]s. The barrier is structural: these statistics need
//! every chain's complete draw sequence, so they are computed exactly once,
//! after all chains finish, by the model's `fit`.
//!
//! Downstream usage
//! ----------------
//! - `LossDevModel::fit` calls [`ConvergenceReport::compute`] and logs the
//!   flags; callers read the report off the returned `FitResult`.
//! - The functions are pure over draw matrices and usable directly against
//!   draws produced by any `PosteriorSampler` implementation.

pub mod diagnostics;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::diagnostics::{
    ConvergenceFlag, ConvergenceReport, ParamDiagnostics, effective_sample_size, split_rhat,
};
