//! Nearest neighbor interpolation implementation.
//!
//! This module provides order-0 interpolation for 3D volumes with an explicit
//! policy for samples that fall outside the source volume.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use serde::{Deserialize, Serialize};

use super::trait_::Interpolator;

/// What a sample outside the source volume evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Outside samples take a constant value.
    Constant(f32),
    /// Outside samples take the value of the nearest edge voxel.
    Clamp,
}

impl Default for BoundaryMode {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

/// Nearest Neighbor Interpolator.
///
/// Performs nearest neighbor interpolation (rounds to nearest integer coordinate).
/// A coordinate is inside the volume when it rounds to a valid index.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NearestNeighborInterpolator {
    boundary: BoundaryMode,
}

impl NearestNeighborInterpolator {
    /// Create a new nearest neighbor interpolator with zero fill.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the out-of-bounds policy.
    pub fn with_boundary(mut self, boundary: BoundaryMode) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn boundary(&self) -> BoundaryMode {
        self.boundary
    }
}

impl<B: Backend> Interpolator<B> for NearestNeighborInterpolator {
    fn interpolate(&self, data: &Tensor<B, 3>, points: Tensor<B, 2>) -> Tensor<B, 1> {
        let [d0, d1, d2] = data.dims(); // rows, cols, depth
        let n = points.dims()[0];

        // points: (x, y, z) = (col, row, depth)
        let x = points.clone().slice([0..n, 0..1]).squeeze::<1>(1).round();
        let y = points.clone().slice([0..n, 1..2]).squeeze::<1>(1).round();
        let z = points.slice([0..n, 2..3]).squeeze::<1>(1).round();

        // Clamped indices are always safe to gather
        let x_i = x.clone().clamp(0.0, (d1 - 1) as f64).int();
        let y_i = y.clone().clamp(0.0, (d0 - 1) as f64).int();
        let z_i = z.clone().clamp(0.0, (d2 - 1) as f64).int();

        // Strides for [rows, cols, depth]
        let stride_row = (d1 * d2) as i32;
        let stride_col = d2 as i32;

        let idx: Tensor<B, 1, Int> = y_i * stride_row + x_i * stride_col + z_i;
        let flat_data = data.clone().reshape([d0 * d1 * d2]);
        let values = flat_data.gather(0, idx);

        match self.boundary {
            BoundaryMode::Clamp => values,
            BoundaryMode::Constant(fill) => {
                let x_valid = x.clone().greater_equal_elem(0.0).int()
                    * x.lower_equal_elem((d1 - 1) as f32).int();
                let y_valid = y.clone().greater_equal_elem(0.0).int()
                    * y.lower_equal_elem((d0 - 1) as f32).int();
                let z_valid = z.clone().greater_equal_elem(0.0).int()
                    * z.lower_equal_elem((d2 - 1) as f32).int();
                let outside = (x_valid * y_valid * z_valid).equal_elem(0);
                values.mask_fill(outside, fill)
            }
        }
    }
}
