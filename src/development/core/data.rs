//! Triangle data containers for loss-development models.
//!
//! Purpose
//! -------
//! Provide validated containers for loss development triangles: raw input
//! records, per-cohort observation sequences, and the assembled [`Triangle`]
//! with its global lag grid and cohort index. This module centralizes input
//! validation so downstream code (density evaluation, forecasting, PPC) can
//! assume clean, triangular data.
//!
//! Key behaviors
//! -------------
//! - [`TriangleRecord`] is the raw input/output unit: one
//!   `(cohort, dev_lag, premium, cum_loss)` observation.
//! - [`Cohort`] holds one accounting period's premium and its ordered
//!   `(dev_lag, cum_loss)` observations.
//! - [`Triangle::from_records`] groups, validates, and indexes records;
//!   [`Triangle::flatten`] reproduces them (round-trip law, up to ordering).
//!
//! Invariants & assumptions
//! ------------------------
//! - Records are pre-filtered to a single insurer/line-of-business selection;
//!   grouping by anything else is a caller-side precondition violation this
//!   module cannot detect.
//! - Premiums and development lags are strictly positive and finite; each
//!   cohort's records agree on its premium.
//! - Cumulative losses are finite. Non-decreasing development is the usual
//!   pattern but **not** enforced — real data violates it.
//! - Each cohort's observed lags form a prefix of the global lag grid (the
//!   upper-left-filled triangular layout); gaps fail construction.
//!
//! Conventions
//! -----------
//! - Cohorts are ordered lexicographically by label (chronological for the
//!   usual origin-year labels); the dense cohort index is the layout of the
//!   model's loss-ratio vector.
//! - The triangle is constructed once and read-only afterwards; all
//!   accessors take `&self` and no mutation API exists.
//!
//! Downstream usage
//! ----------------
//! - Construct a [`Triangle`] at the boundary where raw records enter the
//!   modeling stack, then share it immutably with the model, the forecast
//!   engine, and the PPC reductions.
//! - Consumers may rely on the triangular-prefix invariant: every grid lag
//!   `<= max_observed_lag` of a cohort has an observed value.
//!
//! Testing notes
//! -------------
//! - Unit tests cover happy-path construction, the flatten round-trip, and
//!   each rejection path (empty input, bad premium/lag/loss, duplicates,
//!   non-triangular layouts).
use std::collections::BTreeMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::development::{
    core::grid::{CohortIndex, LagGrid},
    errors::{DevError, DevResult},
};

/// One raw triangle observation: `(cohort, dev_lag, premium, cum_loss)`.
///
/// The input unit for [`Triangle::from_records`] and the output unit of
/// [`Triangle::flatten`]. Upstream loaders produce these after filtering to
/// one insurer/line-of-business; the triangle never sees file formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleRecord {
    /// Accounting-period label (e.g. an origin year).
    pub cohort: String,
    /// Development lag of the observation (strictly positive).
    pub dev_lag: f64,
    /// Cohort premium; identical across a cohort's records.
    pub premium: f64,
    /// Cumulative loss observed at `dev_lag`.
    pub cum_loss: f64,
}

impl TriangleRecord {
    /// Convenience constructor for tests and adapters.
    pub fn new(cohort: impl Into<String>, dev_lag: f64, premium: f64, cum_loss: f64) -> Self {
        TriangleRecord { cohort: cohort.into(), dev_lag, premium, cum_loss }
    }
}

/// `Cohort` — one accounting period's premium and observed development.
///
/// Purpose
/// -------
/// Hold a single cohort's fixed premium and its ordered sequence of
/// `(dev_lag, cum_loss)` observations, validated at triangle construction.
///
/// Fields
/// ------
/// - `label`: accounting-period identity (stable, never revised).
/// - `premium`: fixed positive scalar, known at creation.
/// - `dev_lags`: strictly increasing observed lags (a prefix of the global
///   grid).
/// - `cum_losses`: cumulative losses aligned with `dev_lags`; finite, and in
///   practice non-decreasing (not enforced).
///
/// Invariants
/// ----------
/// - `premium > 0` and finite.
/// - `dev_lags.len() == cum_losses.len() >= 1`.
/// - `dev_lags` strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cohort {
    label: String,
    premium: f64,
    dev_lags: Vec<f64>,
    cum_losses: Array1<f64>,
}

impl Cohort {
    /// Accounting-period label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fixed cohort premium.
    pub fn premium(&self) -> f64 {
        self.premium
    }

    /// Observed development lags, strictly increasing.
    pub fn dev_lags(&self) -> &[f64] {
        &self.dev_lags
    }

    /// Cumulative losses aligned with [`Cohort::dev_lags`].
    pub fn cum_losses(&self) -> &Array1<f64> {
        &self.cum_losses
    }

    /// Number of observed cells.
    pub fn n_observed(&self) -> usize {
        self.dev_lags.len()
    }

    /// Largest development lag with an observed value.
    pub fn max_observed_lag(&self) -> f64 {
        *self.dev_lags.last().expect("cohorts always hold at least one observation")
    }

    /// The forecast anchor `(t_obs, L_obs)`: the latest observed lag and the
    /// cumulative loss recorded there.
    pub fn latest_observed(&self) -> (f64, f64) {
        let last = self.dev_lags.len() - 1;
        (self.dev_lags[last], self.cum_losses[last])
    }

    /// Cumulative loss observed at exactly `lag`, if that cell exists.
    pub fn loss_at(&self, lag: f64) -> Option<f64> {
        self.dev_lags
            .binary_search_by(|probe| probe.total_cmp(&lag))
            .ok()
            .map(|idx| self.cum_losses[idx])
    }

    /// Observed loss ratio at the latest observed lag.
    pub fn latest_loss_ratio(&self) -> f64 {
        self.latest_observed().1 / self.premium
    }
}

/// `Triangle` — validated loss development triangle for one selection.
///
/// Purpose
/// -------
/// Represent the full set of cohorts sharing one (insurer, line-of-business)
/// selection, together with the global [`LagGrid`] and the bijective
/// [`CohortIndex`]. Constructed once from filtered records at model-build
/// time; read-only afterwards and shared immutably by all chains and all
/// downstream computations.
///
/// Key behaviors
/// -------------
/// - Validates premiums, lags, losses, duplicate cells, and the triangular
///   prefix layout in [`Triangle::from_records`].
/// - Exposes cohorts in dense index order plus aggregate views used by the
///   model and the PPC reductions (`total_known_claims`, `fully_developed`).
/// - Flattens back to records for round-tripping to external consumers.
///
/// Invariants
/// ----------
/// - `cohorts.len() == index.len() >= 1`; cohort `i` carries label
///   `index.label(i)`.
/// - Every cohort's observed lags are a prefix of `grid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triangle {
    cohorts: Vec<Cohort>,
    grid: LagGrid,
    index: CohortIndex,
}

impl Triangle {
    /// Build a validated [`Triangle`] from raw records.
    ///
    /// Parameters
    /// ----------
    /// - `records`: observations for one insurer/line-of-business selection.
    ///   Ordering is irrelevant; records are grouped by cohort label.
    ///
    /// Returns
    /// -------
    /// `DevResult<Triangle>`
    ///   - `Ok(Triangle)` when all invariants hold.
    ///   - `Err(DevError)` naming the first offending cohort/cell otherwise.
    ///
    /// Errors
    /// ------
    /// - `DevError::EmptyTriangle` when `records` is empty.
    /// - `DevError::NonPositiveLag` / `DevError::NonPositivePremium` /
    ///   `DevError::NonFiniteLoss` for invalid numeric fields.
    /// - `DevError::InconsistentPremium` when a cohort's records disagree.
    /// - `DevError::DuplicateCell` for repeated `(cohort, dev_lag)` cells.
    /// - `DevError::NonTriangularCohort` when a cohort's observed lags are
    ///   not a prefix of the global grid.
    ///
    /// Notes
    /// -----
    /// - Construction fails before any sampling can happen; a triangle that
    ///   exists is safe to fit.
    pub fn from_records(records: &[TriangleRecord]) -> DevResult<Triangle> {
        if records.is_empty() {
            return Err(DevError::EmptyTriangle);
        }

        for record in records {
            if !record.dev_lag.is_finite() || record.dev_lag <= 0.0 {
                return Err(DevError::NonPositiveLag {
                    cohort: record.cohort.clone(),
                    value: record.dev_lag,
                });
            }
            if !record.premium.is_finite() || record.premium <= 0.0 {
                return Err(DevError::NonPositivePremium {
                    cohort: record.cohort.clone(),
                    value: record.premium,
                });
            }
            if !record.cum_loss.is_finite() {
                return Err(DevError::NonFiniteLoss {
                    cohort: record.cohort.clone(),
                    dev_lag: record.dev_lag,
                    value: record.cum_loss,
                });
            }
        }

        let grid = LagGrid::new(records.iter().map(|r| r.dev_lag).collect());

        let mut grouped: BTreeMap<&str, Vec<&TriangleRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.cohort.as_str()).or_default().push(record);
        }

        let mut cohorts = Vec::with_capacity(grouped.len());
        for (label, mut cohort_records) in grouped {
            let premium = cohort_records[0].premium;
            for record in &cohort_records {
                if record.premium != premium {
                    return Err(DevError::InconsistentPremium {
                        cohort: label.to_string(),
                        first: premium,
                        other: record.premium,
                    });
                }
            }

            cohort_records.sort_by(|a, b| a.dev_lag.total_cmp(&b.dev_lag));
            for pair in cohort_records.windows(2) {
                if pair[0].dev_lag == pair[1].dev_lag {
                    return Err(DevError::DuplicateCell {
                        cohort: label.to_string(),
                        dev_lag: pair[0].dev_lag,
                    });
                }
            }

            // Prefix-of-grid check: the i-th observed lag must be the i-th
            // grid lag, otherwise some earlier lag is missing.
            for (idx, record) in cohort_records.iter().enumerate() {
                let expected = grid.lag(idx);
                if record.dev_lag != expected {
                    return Err(DevError::NonTriangularCohort {
                        cohort: label.to_string(),
                        observed_lag: record.dev_lag,
                        missing_lag: expected,
                    });
                }
            }

            let dev_lags: Vec<f64> = cohort_records.iter().map(|r| r.dev_lag).collect();
            let cum_losses = Array1::from_iter(cohort_records.iter().map(|r| r.cum_loss));
            cohorts.push(Cohort { label: label.to_string(), premium, dev_lags, cum_losses });
        }

        let index = CohortIndex::new(cohorts.iter().map(|c| c.label.clone()).collect());
        Ok(Triangle { cohorts, grid, index })
    }

    /// Cohorts in dense index order.
    pub fn cohorts(&self) -> &[Cohort] {
        &self.cohorts
    }

    /// Cohort at dense index `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= n_cohorts()`; out-of-range indices are logic errors.
    pub fn cohort(&self, idx: usize) -> &Cohort {
        &self.cohorts[idx]
    }

    /// Cohort looked up by label.
    pub fn cohort_by_label(&self, label: &str) -> DevResult<&Cohort> {
        let idx = self
            .index
            .index_of(label)
            .ok_or_else(|| DevError::UnknownCohort { label: label.to_string() })?;
        Ok(&self.cohorts[idx])
    }

    /// Global development-lag grid.
    pub fn grid(&self) -> &LagGrid {
        &self.grid
    }

    /// Bijective cohort label ↔ index map.
    pub fn index(&self) -> &CohortIndex {
        &self.index
    }

    /// Number of cohorts.
    pub fn n_cohorts(&self) -> usize {
        self.cohorts.len()
    }

    /// Total number of observed cells across all cohorts.
    pub fn n_observations(&self) -> usize {
        self.cohorts.iter().map(Cohort::n_observed).sum()
    }

    /// Whether cohort `idx` is observed through the terminal grid lag.
    pub fn fully_developed(&self, idx: usize) -> bool {
        self.cohorts[idx].max_observed_lag() == self.grid.terminal()
    }

    /// Sum over cohorts of the cumulative loss known at the snapshot cutoff
    /// (each cohort's latest observed value).
    pub fn total_known_claims(&self) -> f64 {
        self.cohorts.iter().map(|c| c.latest_observed().1).sum()
    }

    /// Flatten back to the record form used at construction.
    ///
    /// The returned records reproduce the construction input exactly up to
    /// ordering (cohorts in index order, lags ascending within a cohort).
    pub fn flatten(&self) -> Vec<TriangleRecord> {
        let mut records = Vec::with_capacity(self.n_observations());
        for cohort in &self.cohorts {
            for (idx, &lag) in cohort.dev_lags.iter().enumerate() {
                records.push(TriangleRecord {
                    cohort: cohort.label.clone(),
                    dev_lag: lag,
                    premium: cohort.premium,
                    cum_loss: cohort.cum_losses[idx],
                });
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction behavior of `Triangle::from_records`.
    // - Enforcement of invariants: positive premium/lag, finite losses,
    //   consistent premiums, no duplicate cells, triangular prefix layout.
    // - The flatten round-trip law.
    //
    // They intentionally DO NOT cover:
    // - Model density evaluation or forecasting over triangles (covered by
    //   the model and forecast modules).
    // -------------------------------------------------------------------------

    // Two-cohort toy triangle: "1988" observed through lag 3, "1989" through
    // lag 2, shared premium 100. Reused across tests as a known-good input.
    fn make_records() -> Vec<TriangleRecord> {
        vec![
            TriangleRecord::new("1988", 1.0, 100.0, 10.0),
            TriangleRecord::new("1988", 2.0, 100.0, 20.0),
            TriangleRecord::new("1988", 3.0, 100.0, 27.0),
            TriangleRecord::new("1989", 1.0, 100.0, 8.0),
            TriangleRecord::new("1989", 2.0, 100.0, 15.0),
        ]
    }

    #[test]
    // Purpose
    // -------
    // Verify that `Triangle::from_records` accepts a valid triangular layout
    // and exposes grid, index, and per-cohort views consistently.
    //
    // Given
    // -----
    // - The two-cohort toy records from `make_records()` in shuffled order.
    //
    // Expect
    // ------
    // - Two cohorts in sorted-label order with the right observation counts.
    // - Grid [1.0, 2.0, 3.0] with terminal 3.0.
    // - `fully_developed` true only for "1988".
    // - `total_known_claims` equals 27 + 15.
    fn triangle_from_records_builds_valid_layout() {
        let mut records = make_records();
        records.swap(0, 4);
        records.swap(1, 3);

        let triangle = Triangle::from_records(&records).unwrap();

        assert_eq!(triangle.n_cohorts(), 2);
        assert_eq!(triangle.index().labels(), &["1988", "1989"]);
        assert_eq!(triangle.grid().as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(triangle.cohort(0).n_observed(), 3);
        assert_eq!(triangle.cohort(1).n_observed(), 2);
        assert_eq!(triangle.cohort(1).latest_observed(), (2.0, 15.0));
        assert!(triangle.fully_developed(0));
        assert!(!triangle.fully_developed(1));
        assert_eq!(triangle.total_known_claims(), 42.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify the round-trip law: flattening a constructed triangle
    // reproduces the construction records exactly, ignoring ordering.
    //
    // Given
    // -----
    // - The toy records from `make_records()`.
    //
    // Expect
    // ------
    // - `flatten()` returns the same multiset of records.
    fn triangle_flatten_round_trips_records() {
        let records = make_records();
        let triangle = Triangle::from_records(&records).unwrap();

        let mut flattened = triangle.flatten();
        let mut expected = records;
        let key = |r: &TriangleRecord| (r.cohort.clone(), r.dev_lag.to_bits());
        flattened.sort_by_key(key);
        expected.sort_by_key(key);

        assert_eq!(flattened, expected);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a zero premium is rejected before any modeling can happen.
    //
    // Given
    // -----
    // - One record with `premium = 0.0`.
    //
    // Expect
    // ------
    // - `Err(DevError::NonPositivePremium { cohort: "1988", value: 0.0 })`.
    fn triangle_rejects_zero_premium() {
        let records = vec![TriangleRecord::new("1988", 1.0, 0.0, 10.0)];

        let result = Triangle::from_records(&records);

        assert_eq!(
            result.unwrap_err(),
            DevError::NonPositivePremium { cohort: "1988".to_string(), value: 0.0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure empty input is rejected.
    //
    // Expect
    // ------
    // - `Err(DevError::EmptyTriangle)`.
    fn triangle_rejects_empty_input() {
        assert_eq!(Triangle::from_records(&[]).unwrap_err(), DevError::EmptyTriangle);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a cohort observed at a later lag with an earlier grid lag
    // missing fails the triangular-layout check.
    //
    // Given
    // -----
    // - "1988" observed at lags 1 and 2 (defines the grid).
    // - "1989" observed at lag 2 only (lag 1 missing).
    //
    // Expect
    // ------
    // - `Err(DevError::NonTriangularCohort)` naming cohort "1989", the
    //   observed lag 2.0 and the missing lag 1.0.
    fn triangle_rejects_gapped_cohort() {
        let records = vec![
            TriangleRecord::new("1988", 1.0, 100.0, 10.0),
            TriangleRecord::new("1988", 2.0, 100.0, 20.0),
            TriangleRecord::new("1989", 2.0, 100.0, 15.0),
        ];

        let result = Triangle::from_records(&records);

        assert_eq!(
            result.unwrap_err(),
            DevError::NonTriangularCohort {
                cohort: "1989".to_string(),
                observed_lag: 2.0,
                missing_lag: 1.0,
            }
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure duplicate `(cohort, dev_lag)` cells and inconsistent premiums
    // are both rejected with their typed errors.
    fn triangle_rejects_duplicates_and_inconsistent_premium() {
        let duplicated = vec![
            TriangleRecord::new("1988", 1.0, 100.0, 10.0),
            TriangleRecord::new("1988", 1.0, 100.0, 11.0),
        ];
        assert_eq!(
            Triangle::from_records(&duplicated).unwrap_err(),
            DevError::DuplicateCell { cohort: "1988".to_string(), dev_lag: 1.0 }
        );

        let inconsistent = vec![
            TriangleRecord::new("1988", 1.0, 100.0, 10.0),
            TriangleRecord::new("1988", 2.0, 120.0, 20.0),
        ];
        assert_eq!(
            Triangle::from_records(&inconsistent).unwrap_err(),
            DevError::InconsistentPremium { cohort: "1988".to_string(), first: 100.0, other: 120.0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure non-finite losses and non-positive lags are rejected.
    fn triangle_rejects_bad_numeric_fields() {
        let bad_loss = vec![TriangleRecord::new("1988", 1.0, 100.0, f64::NAN)];
        assert!(matches!(
            Triangle::from_records(&bad_loss).unwrap_err(),
            DevError::NonFiniteLoss { .. }
        ));

        let bad_lag = vec![TriangleRecord::new("1988", 0.0, 100.0, 10.0)];
        assert_eq!(
            Triangle::from_records(&bad_lag).unwrap_err(),
            DevError::NonPositiveLag { cohort: "1988".to_string(), value: 0.0 }
        );
    }
}
