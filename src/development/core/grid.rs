//! Global development-lag grid and cohort label/index maps.
//!
//! Purpose
//! -------
//! Provide the two small structural types that anchor a triangle's indexing:
//! [`LagGrid`], the sorted set of distinct development lags observed anywhere
//! in the triangle, and [`CohortIndex`], a bijective mapping between cohort
//! labels and dense array positions. Both are built once at triangle
//! construction and are read-only afterwards, so downstream code (density
//! evaluation, forecasting, diagnostics labeling) can rely on contiguous,
//! stable indices instead of ad-hoc label arithmetic.
//!
//! Key behaviors
//! -------------
//! - [`LagGrid`] sorts and deduplicates lags, exposes positional lookup, and
//!   identifies the terminal (largest) development lag.
//! - [`CohortIndex`] assigns each label a dense index in sorted-label order
//!   and answers lookups in both directions.
//!
//! Invariants & assumptions
//! ------------------------
//! - Grid lags are finite and strictly positive (validated by the triangle
//!   builder before construction).
//! - Indices are contiguous `0..len` and stable for the lifetime of the
//!   owning triangle.
//!
//! Conventions
//! -----------
//! - Lags are `f64` in the triangle's native time unit (typically years of
//!   development); positional lookup uses exact value equality, which is
//!   sound because lookups always use values taken from the same records
//!   the grid was built from.
//! - Cohort ordering is lexicographic by label, which for the usual
//!   origin-year labels coincides with chronological order.
use std::collections::HashMap;

use serde::Serialize;

/// Sorted, deduplicated set of development lags shared by all cohorts.
///
/// Built once from the union of lags across every record; read-only after
/// construction. Position lookups back the triangular-layout validation and
/// the forecast engine's full-length path construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagGrid {
    lags: Vec<f64>,
}

impl LagGrid {
    /// Build a grid from raw lag values (sorted ascending, exact duplicates
    /// removed). The caller is responsible for having validated positivity
    /// and finiteness.
    pub fn new(mut lags: Vec<f64>) -> LagGrid {
        lags.sort_by(f64::total_cmp);
        lags.dedup();
        LagGrid { lags }
    }

    /// Position of `lag` on the grid, if present (exact value match).
    pub fn position(&self, lag: f64) -> Option<usize> {
        self.lags.binary_search_by(|probe| probe.total_cmp(&lag)).ok()
    }

    /// Lag value at grid position `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= len()`; out-of-range positions are logic errors.
    pub fn lag(&self, idx: usize) -> f64 {
        self.lags[idx]
    }

    /// Largest development lag on the grid.
    ///
    /// # Panics
    /// Panics on an empty grid; triangles are never built without lags.
    pub fn terminal(&self) -> f64 {
        *self.lags.last().expect("LagGrid is never empty for a constructed triangle")
    }

    /// Number of distinct lags.
    pub fn len(&self) -> usize {
        self.lags.len()
    }

    /// Whether the grid holds no lags.
    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }

    /// All lags, ascending.
    pub fn as_slice(&self) -> &[f64] {
        &self.lags
    }
}

/// Bijective cohort label ↔ dense index mapping.
///
/// Indices are contiguous `0..len` in sorted-label order and stable for the
/// lifetime of the owning triangle; both the model (loss-ratio vector
/// layout) and the diagnostics (coordinate naming) rely on this ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortIndex {
    labels: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl CohortIndex {
    /// Build an index from distinct labels. Labels are sorted; duplicates are
    /// expected to have been merged by the triangle builder beforehand.
    pub fn new(mut labels: Vec<String>) -> CohortIndex {
        labels.sort();
        labels.dedup();
        let positions =
            labels.iter().enumerate().map(|(idx, label)| (label.clone(), idx)).collect();
        CohortIndex { labels, positions }
    }

    /// Dense index of `label`, if present.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Label at dense index `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= len()`; out-of-range positions are logic errors.
    pub fn label(&self, idx: usize) -> &str {
        &self.labels[idx]
    }

    /// All labels in index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of cohorts.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the index holds no cohorts.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
