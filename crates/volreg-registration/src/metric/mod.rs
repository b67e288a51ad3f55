//! Metric implementations.
//!
//! This module contains the similarity measure registration minimizes.

pub mod trait_;
pub mod overlap;

pub use trait_::{Metric, MetricValue};
pub use overlap::{similarity_cost, OverlapMetric, DEFAULT_CROP_MARGIN};
