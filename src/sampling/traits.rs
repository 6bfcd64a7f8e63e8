//! Public API surface for posterior sampling.
//!
//! - [`LogDensity`]: trait the model implements for its unconstrained joint
//!   log density.
//! - [`PosteriorSampler`]: the injected sampling capability.
//! - [`SamplerConfig`]: invocation parameters (iterations, warmup, chains,
//!   seed).
//! - [`SamplerRun`]: normalized result returned by every sampler.
//!
//! Convention: targets are **unnormalized log densities on an unconstrained
//! space** — any η ∈ ℝᵈ must map to a valid (possibly zero-probability)
//! state. `-inf` marks a zero-probability region; NaN and `+inf` indicate a
//! broken target and are fatal for the evaluating chain. The core treats
//! sampler output as opaque draws and never assumes a particular inference
//! algorithm; anything satisfying [`PosteriorSampler`] — including the
//! deterministic replay sampler used in tests — plugs in unchanged.
use ndarray::{Array2, ArrayView1};
use serde::Serialize;

use crate::sampling::errors::{SamplerError, SamplerResult};

/// Unnormalized log density on an unconstrained parameter space.
///
/// Implementors must be cheap to evaluate repeatedly and safe to share
/// across chains (`Sync`); evaluation never mutates state.
///
/// Required:
/// - `dim()`: dimension of the parameter space.
/// - `check(&eta)`: validation hook rejecting malformed states (wrong
///   length, non-finite coordinates). Called by samplers before their first
///   evaluation.
/// - `value(&eta) -> SamplerResult<f64>`: evaluate the log density. Return
///   `-inf` for zero-probability states; reserve `Err` for genuinely broken
///   evaluations.
pub trait LogDensity: Sync {
    fn dim(&self) -> usize;
    fn check(&self, eta: &ArrayView1<f64>) -> SamplerResult<()>;
    fn value(&self, eta: &ArrayView1<f64>) -> SamplerResult<f64>;
}

/// Injected posterior-sampling capability.
///
/// Given a target and a configuration, produce independent-chain draws plus
/// per-chain bookkeeping. Implementations own their RNG/seeding policy but
/// must derive per-chain streams from `config.seed` so runs reproduce.
pub trait PosteriorSampler {
    fn run(&self, target: &dyn LogDensity, config: &SamplerConfig) -> SamplerResult<SamplerRun>;
}

/// Sampler invocation parameters.
///
/// - `iterations`: total draws per chain **including** warmup.
/// - `warmup`: leading draws discarded per chain (adaptation window).
/// - `chains`: independent chains.
/// - `seed`: base seed; chain `c` derives its own stream from `seed + c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SamplerConfig {
    pub iterations: usize,
    pub warmup: usize,
    pub chains: usize,
    pub seed: u64,
}

impl SamplerConfig {
    /// Construct validated invocation parameters.
    ///
    /// # Rules
    /// - `chains >= 1`.
    /// - `iterations > warmup` (at least one retained draw per chain).
    ///
    /// # Errors
    /// - [`SamplerError::InvalidChains`] / [`SamplerError::InvalidIterations`].
    pub fn new(
        iterations: usize, warmup: usize, chains: usize, seed: u64,
    ) -> SamplerResult<SamplerConfig> {
        if chains == 0 {
            return Err(SamplerError::InvalidChains { chains });
        }
        if iterations <= warmup {
            return Err(SamplerError::InvalidIterations {
                iterations,
                warmup,
                reason: "iterations must exceed warmup so at least one draw is retained",
            });
        }
        Ok(SamplerConfig { iterations, warmup, chains, seed })
    }

    /// Retained draws per surviving chain.
    pub fn post_warmup(&self) -> usize {
        self.iterations - self.warmup
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig { iterations: 2000, warmup: 1000, chains: 4, seed: 42 }
    }
}

/// Normalized result of a sampling run.
///
/// - `chains`: one `(post_warmup, dim)` draw matrix per **surviving** chain
///   (row = draw); draws are never mutated after creation.
/// - `accept_rates`: post-warmup acceptance rate per surviving chain
///   (`1.0` for deterministic replay samplers).
/// - `failed_chains` / `requested_chains`: failure accounting — a failed
///   chain contributes zero draws and is never padded.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerRun {
    pub chains: Vec<Array2<f64>>,
    pub accept_rates: Vec<f64>,
    pub failed_chains: usize,
    pub requested_chains: usize,
}

impl SamplerRun {
    /// Build a validated [`SamplerRun`] from surviving-chain output.
    ///
    /// # Errors
    /// - [`SamplerError::AllChainsFailed`] when no chain survived.
    /// - [`SamplerError::DimensionMismatch`] when surviving chains disagree
    ///   on dimension or `accept_rates` is not parallel to `chains`.
    pub fn new(
        chains: Vec<Array2<f64>>, accept_rates: Vec<f64>, failed_chains: usize,
        requested_chains: usize,
    ) -> SamplerResult<SamplerRun> {
        if chains.is_empty() {
            return Err(SamplerError::AllChainsFailed { chains: requested_chains });
        }
        if accept_rates.len() != chains.len() {
            return Err(SamplerError::DimensionMismatch {
                expected: chains.len(),
                actual: accept_rates.len(),
            });
        }
        let dim = chains[0].ncols();
        for chain in &chains[1..] {
            if chain.ncols() != dim {
                return Err(SamplerError::DimensionMismatch {
                    expected: dim,
                    actual: chain.ncols(),
                });
            }
        }
        Ok(SamplerRun { chains, accept_rates, failed_chains, requested_chains })
    }

    /// Number of chains that completed their iteration budget.
    pub fn surviving_chains(&self) -> usize {
        self.chains.len()
    }

    /// Total retained draws across surviving chains.
    pub fn total_draws(&self) -> usize {
        self.chains.iter().map(Array2::nrows).sum()
    }

    /// Parameter dimension of the draws.
    pub fn dim(&self) -> usize {
        self.chains[0].ncols()
    }

    /// All retained draws stacked into one `(total_draws, dim)` matrix,
    /// chain-major (chain 0's draws first).
    pub fn flattened(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.total_draws(), self.dim()));
        let mut row = 0;
        for chain in &self.chains {
            out.slice_mut(ndarray::s![row..row + chain.nrows(), ..]).assign(chain);
            row += chain.nrows();
        }
        out
    }
}
