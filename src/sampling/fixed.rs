//! Deterministic replay sampler for tests and external-draw workflows.
//!
//! [`FixedDrawSampler`] satisfies [`PosteriorSampler`] by returning
//! caller-supplied draw matrices verbatim. It exists for two reasons:
//! exercising the forecasting/PPC stack without MCMC machinery, and
//! replaying draws produced by an external inference engine (the core only
//! ever sees opaque draws, so a replayed run is indistinguishable from a
//! live one downstream).
use ndarray::Array2;

use crate::sampling::{
    errors::{SamplerError, SamplerResult},
    traits::{LogDensity, PosteriorSampler, SamplerConfig, SamplerRun},
};

/// Sampler that returns preset draws verbatim.
///
/// The configured iteration/warmup/seed values are ignored; the preset
/// chains *are* the run. Dimension consistency against the target is still
/// enforced so a mismatched replay fails loudly.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedDrawSampler {
    chains: Vec<Array2<f64>>,
}

impl FixedDrawSampler {
    /// Construct from one draw matrix per chain (row = draw).
    ///
    /// # Errors
    /// Returns [`SamplerError::InvalidPresetDraws`] when no chains are
    /// supplied, a chain is empty, or chains disagree on dimension.
    pub fn new(chains: Vec<Array2<f64>>) -> SamplerResult<FixedDrawSampler> {
        if chains.is_empty() {
            return Err(SamplerError::InvalidPresetDraws { reason: "no chains supplied" });
        }
        let dim = chains[0].ncols();
        for chain in &chains {
            if chain.nrows() == 0 {
                return Err(SamplerError::InvalidPresetDraws { reason: "empty chain" });
            }
            if chain.ncols() != dim {
                return Err(SamplerError::InvalidPresetDraws {
                    reason: "chains disagree on dimension",
                });
            }
        }
        Ok(FixedDrawSampler { chains })
    }

    /// Convenience: a single chain holding the given draws.
    pub fn single_chain(draws: Array2<f64>) -> SamplerResult<FixedDrawSampler> {
        FixedDrawSampler::new(vec![draws])
    }
}

impl PosteriorSampler for FixedDrawSampler {
    fn run(&self, target: &dyn LogDensity, _config: &SamplerConfig) -> SamplerResult<SamplerRun> {
        let dim = self.chains[0].ncols();
        if dim != target.dim() {
            return Err(SamplerError::DimensionMismatch { expected: target.dim(), actual: dim });
        }
        let accept_rates = vec![1.0; self.chains.len()];
        SamplerRun::new(self.chains.clone(), accept_rates, 0, self.chains.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, ArrayView1};

    struct FlatTarget {
        dim: usize,
    }

    impl LogDensity for FlatTarget {
        fn dim(&self) -> usize {
            self.dim
        }

        fn check(&self, _eta: &ArrayView1<f64>) -> SamplerResult<()> {
            Ok(())
        }

        fn value(&self, _eta: &ArrayView1<f64>) -> SamplerResult<f64> {
            Ok(0.0)
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify preset draws are returned verbatim with full survival, and
    // that dimension mismatches against the target are rejected.
    fn fixed_sampler_replays_draws_verbatim() {
        let chains = vec![array![[0.1, 0.2], [0.3, 0.4]], array![[0.5, 0.6]]];
        let sampler = FixedDrawSampler::new(chains.clone()).unwrap();
        let config = SamplerConfig::default();

        let run = sampler.run(&FlatTarget { dim: 2 }, &config).unwrap();
        assert_eq!(run.chains, chains);
        assert_eq!(run.failed_chains, 0);
        assert_eq!(run.accept_rates, vec![1.0, 1.0]);

        assert_eq!(
            sampler.run(&FlatTarget { dim: 3 }, &config).unwrap_err(),
            SamplerError::DimensionMismatch { expected: 3, actual: 2 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify malformed presets (none, empty, ragged) are rejected.
    fn fixed_sampler_rejects_malformed_presets() {
        assert!(matches!(
            FixedDrawSampler::new(vec![]).unwrap_err(),
            SamplerError::InvalidPresetDraws { .. }
        ));
        assert!(matches!(
            FixedDrawSampler::new(vec![Array2::zeros((0, 2))]).unwrap_err(),
            SamplerError::InvalidPresetDraws { .. }
        ));
        assert!(matches!(
            FixedDrawSampler::new(vec![array![[1.0]], array![[1.0, 2.0]]]).unwrap_err(),
            SamplerError::InvalidPresetDraws { .. }
        ));
    }
}
