//! Cross-chain convergence diagnostics: split R-hat and effective sample
//! size.
//!
//! Purpose
//! -------
//! Quantify, per parameter coordinate, whether independent chains have mixed
//! into the same distribution (potential scale reduction, R-hat) and how
//! much independent information the retained draws carry (effective sample
//! size, n_eff). Both statistics need visibility across *all* chains'
//! complete draw sequences, so they run only after every chain finishes.
//!
//! Key behaviors
//! -------------
//! - Each chain is split in half (split R-hat), which also catches
//!   within-chain drift that whole-chain R-hat misses.
//! - n_eff combines per-sequence autocovariances via Geyer's
//!   initial-monotone positive-pair truncation.
//! - [`ConvergenceReport::compute`] packages per-coordinate statistics and
//!   non-fatal [`ConvergenceFlag`]s for thresholds breaches; flagging never
//!   blocks downstream forecasting.
//!
//! Conventions
//! -----------
//! - `chains` carries one `(draws, dim)` matrix per surviving chain; all
//!   chains agree on `dim` and draw count (the samplers guarantee both).
//! - Degenerate inputs are mapped to conservative values rather than NaN
//!   propagation: constant identical sequences give R-hat 1 and n_eff equal
//!   to the total draw count; constant but disagreeing sequences give
//!   R-hat ∞.
use ndarray::Array2;
use serde::Serialize;

use crate::development::core::options::DiagnosticOptions;

/// Split a coordinate's per-chain sequences into half-chains of equal
/// length. Odd draws drop the middle observation.
fn split_sequences(chains: &[Array2<f64>], coord: usize) -> Vec<Vec<f64>> {
    let mut sequences = Vec::with_capacity(chains.len() * 2);
    for chain in chains {
        let column: Vec<f64> = chain.column(coord).to_vec();
        let half = column.len() / 2;
        sequences.push(column[..half].to_vec());
        sequences.push(column[column.len() - half..].to_vec());
    }
    sequences
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample variance (ddof 1).
fn variance(xs: &[f64], center: f64) -> f64 {
    xs.iter().map(|x| (x - center).powi(2)).sum::<f64>() / (xs.len() - 1) as f64
}

/// Within/between decomposition shared by R-hat and n_eff:
/// `(w, var_plus, n)` where `w` is the mean within-sequence variance,
/// `var_plus = (n − 1)/n · w + b/n` the pooled variance estimate, and `n`
/// the half-chain length.
fn pooled_variance(sequences: &[Vec<f64>]) -> (f64, f64, usize) {
    let n = sequences[0].len();
    let means: Vec<f64> = sequences.iter().map(|s| mean(s)).collect();
    let w = sequences
        .iter()
        .zip(&means)
        .map(|(s, &m)| variance(s, m))
        .sum::<f64>()
        / sequences.len() as f64;
    let grand = mean(&means);
    let b = n as f64 * variance(&means, grand);
    let var_plus = (n as f64 - 1.0) / n as f64 * w + b / n as f64;
    (w, var_plus, n)
}

/// Split potential scale reduction for one coordinate.
///
/// Target: values near 1; `>= 1.1` conventionally flags non-convergence.
/// Requires at least 4 retained draws per chain (two non-trivial halves).
pub fn split_rhat(chains: &[Array2<f64>], coord: usize) -> f64 {
    let sequences = split_sequences(chains, coord);
    if sequences[0].len() < 2 {
        return f64::NAN;
    }
    let (w, var_plus, _) = pooled_variance(&sequences);
    if w <= 0.0 {
        // Constant sequences: agreeing chains are perfectly converged,
        // disagreeing ones irrecoverably split.
        return if var_plus <= 0.0 { 1.0 } else { f64::INFINITY };
    }
    (var_plus / w).sqrt()
}

/// Effective sample size for one coordinate, combined across chains.
///
/// Uses per-sequence autocovariances and Geyer's initial-monotone criterion:
/// paired autocorrelations `P_k = ρ̂_{2k} + ρ̂_{2k+1}` are summed while
/// positive and non-increasing. The result is clamped to the total retained
/// draw count.
pub fn effective_sample_size(chains: &[Array2<f64>], coord: usize) -> f64 {
    let sequences = split_sequences(chains, coord);
    let n = sequences[0].len();
    if n < 2 {
        return f64::NAN;
    }
    let total = (sequences.len() * n) as f64;
    let (_, var_plus, _) = pooled_variance(&sequences);
    if !(var_plus > 0.0) || !var_plus.is_finite() {
        return total;
    }

    let means: Vec<f64> = sequences.iter().map(|s| mean(s)).collect();
    // Biased (1/n) autocovariance, averaged across sequences, at lag `t`.
    let avg_autocov = |t: usize| -> f64 {
        sequences
            .iter()
            .zip(&means)
            .map(|(s, &m)| {
                s.iter()
                    .zip(&s[t..])
                    .map(|(&a, &b)| (a - m) * (b - m))
                    .sum::<f64>()
                    / n as f64
            })
            .sum::<f64>()
            / sequences.len() as f64
    };

    let rho = |t: usize| 1.0 - (avg_autocov(0) * n as f64 / (n as f64 - 1.0) - avg_autocov(t))
        / var_plus;

    let mut tau = 0.0;
    let mut prev_pair = f64::INFINITY;
    let mut t = 0usize;
    while t + 1 < n {
        let pair = rho(t) + rho(t + 1);
        if pair <= 0.0 {
            break;
        }
        let pair = pair.min(prev_pair);
        tau += pair;
        prev_pair = pair;
        t += 2;
    }
    // τ = −1 + 2 Σ P_k counts ρ̂_0 = 1 once.
    let tau = (2.0 * tau - 1.0).max(1.0);
    (total / tau).min(total)
}

/// Per-coordinate convergence statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDiagnostics {
    /// Coordinate label (from the unconstrained layout).
    pub name: String,
    /// Split potential scale reduction.
    pub rhat: f64,
    /// Effective sample size across chains.
    pub n_eff: f64,
}

/// Non-fatal convergence warning for one coordinate.
///
/// Flags are advisory: sampling results are still returned and downstream
/// forecasting proceeds with the caveat attached, never blocked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConvergenceFlag {
    /// Split R-hat at or above the configured threshold.
    RhatExceeded { name: String, rhat: f64, threshold: f64 },
    /// Effective sample size below the configured floor.
    LowEffectiveSamples { name: String, n_eff: f64, floor: f64 },
}

impl std::fmt::Display for ConvergenceFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvergenceFlag::RhatExceeded { name, rhat, threshold } => {
                write!(f, "{name}: split R-hat {rhat:.3} >= {threshold}")
            }
            ConvergenceFlag::LowEffectiveSamples { name, n_eff, floor } => {
                write!(f, "{name}: effective sample size {n_eff:.1} < floor {floor:.1}")
            }
        }
    }
}

/// Convergence report for a completed sampling run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceReport {
    /// One entry per unconstrained coordinate, in layout order.
    pub per_param: Vec<ParamDiagnostics>,
    /// Threshold breaches, empty when the run looks converged.
    pub flags: Vec<ConvergenceFlag>,
}

impl ConvergenceReport {
    /// Compute per-coordinate diagnostics and threshold flags.
    ///
    /// # Arguments
    /// - `chains`: one `(draws, dim)` matrix per surviving chain.
    /// - `names`: coordinate labels in layout order (`names.len() == dim`).
    /// - `opts`: flagging thresholds.
    ///
    /// # Panics
    /// Panics when `chains` is empty or `names` disagrees with the draw
    /// dimension; both are logic errors upstream (samplers never return
    /// empty runs).
    pub fn compute(
        chains: &[Array2<f64>], names: &[String], opts: &DiagnosticOptions,
    ) -> ConvergenceReport {
        assert!(!chains.is_empty(), "diagnostics require at least one surviving chain");
        let dim = chains[0].ncols();
        assert_eq!(names.len(), dim, "coordinate names must match draw dimension");

        let total_draws: usize = chains.iter().map(Array2::nrows).sum();
        let floor = opts.n_eff_floor_frac * total_draws as f64;

        let mut per_param = Vec::with_capacity(dim);
        let mut flags = Vec::new();
        for coord in 0..dim {
            let rhat = split_rhat(chains, coord);
            let n_eff = effective_sample_size(chains, coord);
            let name = names[coord].clone();
            if !(rhat < opts.rhat_max) {
                flags.push(ConvergenceFlag::RhatExceeded {
                    name: name.clone(),
                    rhat,
                    threshold: opts.rhat_max,
                });
            }
            if n_eff < floor {
                flags.push(ConvergenceFlag::LowEffectiveSamples {
                    name: name.clone(),
                    n_eff,
                    floor,
                });
            }
            per_param.push(ParamDiagnostics { name, rhat, n_eff });
        }
        ConvergenceReport { per_param, flags }
    }

    /// Whether no threshold was breached.
    pub fn is_converged(&self) -> bool {
        self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - R-hat near 1 for well-mixed synthetic chains and far above 1 for
    //   location-shifted chains.
    // - n_eff bounds: positive, at most the total draw count, and sharply
    //   reduced for strongly autocorrelated chains.
    // - Report assembly and threshold flagging.
    // -------------------------------------------------------------------------

    /// One column of iid uniform noise, optionally shifted, as a chain.
    fn noise_chain(seed: u64, n: usize, shift: f64) -> Array2<f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        Array2::from_shape_fn((n, 1), |_| shift + rng.gen::<f64>() - 0.5)
    }

    #[test]
    // Purpose
    // -------
    // Verify R-hat is near 1 for chains drawn from the same distribution
    // and far above 1.1 for chains shifted apart by many sds.
    fn rhat_separates_mixed_from_shifted_chains() {
        let mixed = vec![noise_chain(1, 500, 0.0), noise_chain(2, 500, 0.0)];
        let rhat_mixed = split_rhat(&mixed, 0);
        assert!(rhat_mixed < 1.05, "mixed R-hat {rhat_mixed}");

        let shifted = vec![noise_chain(1, 500, 0.0), noise_chain(2, 500, 10.0)];
        let rhat_shifted = split_rhat(&shifted, 0);
        assert!(rhat_shifted > 2.0, "shifted R-hat {rhat_shifted}");
    }

    #[test]
    // Purpose
    // -------
    // Verify degenerate handling: constant agreeing chains give R-hat 1 and
    // full n_eff; constant disagreeing chains give R-hat ∞.
    fn rhat_handles_constant_chains() {
        let agreeing = vec![Array2::from_elem((50, 1), 2.0), Array2::from_elem((50, 1), 2.0)];
        assert_eq!(split_rhat(&agreeing, 0), 1.0);
        assert_eq!(effective_sample_size(&agreeing, 0), 100.0);

        let disagreeing = vec![Array2::from_elem((50, 1), 2.0), Array2::from_elem((50, 1), 5.0)];
        assert_eq!(split_rhat(&disagreeing, 0), f64::INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Verify n_eff bounds: positive and at most the total retained draws
    // for iid chains, and far below total for a slowly drifting chain.
    fn n_eff_reflects_autocorrelation() {
        let iid = vec![noise_chain(3, 400, 0.0), noise_chain(4, 400, 0.0)];
        let n_eff_iid = effective_sample_size(&iid, 0);
        assert!(n_eff_iid > 0.0 && n_eff_iid <= 800.0);
        assert!(n_eff_iid > 200.0, "iid n_eff {n_eff_iid}");

        // A deterministic ramp is maximally autocorrelated.
        let ramp = Array2::from_shape_fn((400, 1), |(i, _)| i as f64);
        let n_eff_ramp = effective_sample_size(&[ramp.clone(), ramp], 0);
        assert!(n_eff_ramp < 50.0, "ramp n_eff {n_eff_ramp}");
    }

    #[test]
    // Purpose
    // -------
    // Verify report assembly: per-coordinate entries in layout order, and
    // flags raised exactly for breached thresholds.
    fn report_flags_threshold_breaches() {
        let opts = DiagnosticOptions::default();
        let names = vec!["a".to_string(), "b".to_string()];

        // Coordinate 0 mixes; coordinate 1 is shifted across chains.
        let chain = |seed: u64, shift: f64| {
            let noise = noise_chain(seed, 300, 0.0);
            Array2::from_shape_fn((300, 2), |(i, j)| {
                if j == 0 { noise[(i, 0)] } else { shift + noise[(i, 0)] }
            })
        };
        let chains = vec![chain(5, 0.0), chain(6, 8.0)];

        let report = ConvergenceReport::compute(&chains, &names, &opts);

        assert_eq!(report.per_param.len(), 2);
        assert_eq!(report.per_param[0].name, "a");
        assert!(!report.is_converged());
        assert!(report
            .flags
            .iter()
            .any(|f| matches!(f, ConvergenceFlag::RhatExceeded { name, .. } if name == "b")));
        assert!(!report
            .flags
            .iter()
            .any(|f| matches!(f, ConvergenceFlag::RhatExceeded { name, .. } if name == "a")));
    }
}
