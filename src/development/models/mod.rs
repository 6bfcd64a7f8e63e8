//! models — user-facing loss-development model API.
//!
//! Exposes [`LossDevModel`] (joint density over a triangle, unconstrained
//! sampling target, posterior fit) and the immutable [`FitResult`] every
//! fit returns. Lower-level building blocks live in
//! [`crate::development::core`].

pub mod loss_dev;

pub use self::loss_dev::{FitResult, LossDevModel, ETA_BOUND};
