//! Interpolator trait for sampling values at continuous coordinates.
//!
//! This module defines the core Interpolator trait that all interpolation methods must implement.

use burn::tensor::Tensor;
use burn::tensor::backend::Backend;

/// Interpolator trait for sampling values at continuous coordinates.
///
/// Interpolators are used to sample volume values at non-integer coordinates,
/// which is essential for registration and resampling.
///
/// # Type Parameters
/// * `B` - The Burn backend
pub trait Interpolator<B: Backend> {
    /// Interpolate values from a volume at given continuous coordinates.
    ///
    /// # Arguments
    /// * `data` - The source volume `[rows, cols, depth]`
    /// * `points` - Sample positions `[Batch, 3]` as `(x, y, z) = (col, row, depth)`
    ///
    /// # Returns
    /// Tensor of sampled values `[Batch]`
    fn interpolate(&self, data: &Tensor<B, 3>, points: Tensor<B, 2>) -> Tensor<B, 1>;
}
