//! sampling — the posterior-sampling capability layer.
//!
//! Purpose
//! -------
//! Formalize posterior sampling as an injected capability so the modeling
//! core never depends on a particular inference algorithm. The model exposes
//! an unconstrained log density through [`LogDensity`]; anything satisfying
//! [`PosteriorSampler`] can produce draws from it — the bundled random-walk
//! Metropolis reference implementation, a deterministic replay sampler, or
//! an external engine adapted behind the trait.
//!
//! Key behaviors
//! -------------
//! - [`traits`]: the two capability traits plus [`SamplerConfig`]
//!   (iterations/warmup/chains/seed) and the normalized [`SamplerRun`]
//!   result (per-chain draw matrices, acceptance rates, chain-survival
//!   accounting).
//! - [`random_walk`]: seeded, rayon-parallel independent chains with warmup
//!   scale adaptation and per-chain failure isolation.
//! - [`fixed`]: verbatim replay of preset draws for tests and
//!   external-draw workflows.
//! - [`errors`]: the sampling-layer error family, wrapped at the model
//!   boundary as a `SamplerFailed` status.
//!
//! Conventions
//! -----------
//! - Targets are unnormalized log densities on an unconstrained space;
//!   `-inf` marks zero-probability states, while NaN/`+inf` indicate a
//!   broken target and are fatal for the evaluating chain.
//! - Chain `c` derives its RNG stream from `seed + c`, so runs reproduce
//!   regardless of thread scheduling.
//! - A failed chain contributes zero draws and is never padded; runs error
//!   only when every chain failed.

pub mod errors;
pub mod fixed;
pub mod random_walk;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{SamplerError, SamplerResult};
pub use self::fixed::FixedDrawSampler;
pub use self::random_walk::RandomWalkMetropolis;
pub use self::traits::{LogDensity, PosteriorSampler, SamplerConfig, SamplerRun};
