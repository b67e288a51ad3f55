//! Cropped overlap metric for boolean volumes.

use burn::tensor::backend::Backend;
use burn::tensor::ElementConversion;
use volreg_core::volume::MASK_THRESHOLD;
use volreg_core::Volume;

use super::trait_::{Metric, MetricValue};
use crate::error::Result;
use crate::validation::{validate_crop_margin, validate_volume_shapes};

/// Voxels dropped from every face before counting overlap.
pub const DEFAULT_CROP_MARGIN: usize = 5;

/// Overlap Metric.
///
/// Crops `margin` voxels from every face of both volumes, counts the voxels
/// set in both, and reports
///
/// ```text
/// cost = -sqrt(count(reference AND candidate))
/// ```
///
/// The count is not normalised, so costs are only comparable between runs on
/// volumes of the same shape and content. Disjoint volumes score 0; identical
/// volumes score the lowest value reachable for that reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapMetric {
    margin: usize,
}

impl OverlapMetric {
    /// Create a metric cropping `margin` voxels from every face.
    pub fn new(margin: usize) -> Self {
        Self { margin }
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Number of voxels set in both cropped volumes.
    pub fn overlap<B: Backend>(&self, reference: &Volume<B>, candidate: &Volume<B>) -> Result<usize> {
        validate_volume_shapes(reference, candidate)?;
        let [rows, cols, depth] = reference.shape();
        validate_crop_margin(reference.shape(), self.margin)?;

        let m = self.margin;
        let ranges = [m..rows - m, m..cols - m, m..depth - m];

        let a = reference.data().clone().slice(ranges.clone()).greater_elem(MASK_THRESHOLD).int();
        let b = candidate.data().clone().slice(ranges).greater_elem(MASK_THRESHOLD).int();

        let count = (a * b).sum().into_scalar().elem::<i64>();
        Ok(count.max(0) as usize)
    }
}

impl Default for OverlapMetric {
    fn default() -> Self {
        Self::new(DEFAULT_CROP_MARGIN)
    }
}

impl<B: Backend> Metric<B> for OverlapMetric {
    fn evaluate(&self, reference: &Volume<B>, candidate: &Volume<B>) -> Result<MetricValue> {
        let overlap = self.overlap(reference, candidate)?;
        Ok(MetricValue::from_overlap(overlap))
    }

    fn validate_shape(&self, shape: [usize; 3]) -> Result<()> {
        validate_crop_margin(shape, self.margin)
    }

    fn name(&self) -> &'static str {
        "OverlapMetric"
    }
}

/// Score two boolean volumes with the default five-voxel crop.
pub fn similarity_cost<B: Backend>(reference: &Volume<B>, candidate: &Volume<B>) -> Result<f64> {
    Ok(OverlapMetric::default().evaluate(reference, candidate)?.cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistrationError;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn block(shape: [usize; 3], lo: usize, hi: usize) -> Volume<TestBackend> {
        let device = Default::default();
        Volume::from_fn(shape, &device, |r, c, k| {
            let inside = |i: usize| (lo..hi).contains(&i);
            if inside(r) && inside(c) && inside(k) {
                1.0
            } else {
                0.0
            }
        })
        .unwrap()
    }

    #[test]
    fn test_crop_hides_border_voxels() {
        // 2x2x2 block in the corner of a 4^3 volume; a 1-voxel crop keeps
        // only its innermost voxel
        let a = block([4, 4, 4], 0, 2);
        assert_eq!(OverlapMetric::new(0).overlap(&a, &a).unwrap(), 8);
        assert_eq!(OverlapMetric::new(1).overlap(&a, &a).unwrap(), 1);
    }

    #[test]
    fn test_identical_blocks() {
        let a = block([14, 14, 14], 5, 9);
        let value = OverlapMetric::default().evaluate(&a, &a).unwrap();
        assert_eq!(value.overlap, 64);
        assert_eq!(value.cost, -8.0);
    }

    #[test]
    fn test_margin_too_large() {
        let a = block([10, 12, 12], 0, 1);
        let err = OverlapMetric::new(5).overlap(&a, &a).unwrap_err();
        assert!(matches!(err, RegistrationError::DimensionMismatch(_)));
    }

    #[test]
    fn test_validate_shape_checks_margin() {
        let metric = OverlapMetric::default();
        assert!(Metric::<TestBackend>::validate_shape(&metric, [11, 11, 11]).is_ok());
        let err = Metric::<TestBackend>::validate_shape(&metric, [11, 10, 11]).unwrap_err();
        assert!(matches!(err, RegistrationError::DimensionMismatch(_)));
    }

    #[test]
    fn test_similarity_cost_rejects_mismatched_shapes() {
        let a = block([12, 12, 12], 5, 7);
        let b = block([12, 12, 13], 5, 7);
        let err = similarity_cost(&a, &b).unwrap_err();
        assert!(matches!(err, RegistrationError::ShapeMismatch { .. }));
    }
}
