//! Metric trait for volume similarity measurement.
//!
//! This module defines the core Metric trait that similarity measures
//! implement for volume registration.

use burn::tensor::backend::Backend;
use volreg_core::Volume;

use crate::error::Result;

/// Metric trait for measuring similarity between two volumes.
///
/// Metrics compute a cost that represents the dissimilarity between a fixed
/// (reference) volume and a candidate (resampled moving) volume. Lower values
/// indicate better alignment.
///
/// # Type Parameters
/// * `B` - The tensor backend
pub trait Metric<B: Backend> {
    /// Score `candidate` against `reference`.
    ///
    /// # Arguments
    /// * `reference` - The fixed volume
    /// * `candidate` - The moving volume after resampling
    ///
    /// # Returns
    /// The cost together with the raw similarity count behind it
    fn evaluate(&self, reference: &Volume<B>, candidate: &Volume<B>) -> Result<MetricValue>;

    /// Check that volumes of `shape` can be scored at all, before any trial
    /// is spent.
    fn validate_shape(&self, _shape: [usize; 3]) -> Result<()> {
        Ok(())
    }

    /// Get the name of this metric.
    fn name(&self) -> &'static str;
}

/// One metric evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricValue {
    /// Value handed to the minimizer; lower is better.
    pub cost: f64,
    /// Number of voxels set in both volumes, before the cost transform.
    pub overlap: usize,
}

impl MetricValue {
    /// Cost `-sqrt(overlap)`.
    pub fn from_overlap(overlap: usize) -> Self {
        Self {
            cost: -(overlap as f64).sqrt(),
            overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_from_overlap() {
        assert_eq!(MetricValue::from_overlap(0).cost, 0.0);
        assert_eq!(MetricValue::from_overlap(49).cost, -7.0);
        assert!(MetricValue::from_overlap(50).cost < MetricValue::from_overlap(49).cost);
    }
}
