//! Transform trait for spatial coordinate transformations.
//!
//! This module defines the core Transform trait used by the resampling filter.

use burn::tensor::Tensor;
use burn::tensor::backend::Backend;

use crate::error::Result;

/// Transform trait for voxel-space coordinate transformations.
///
/// Maps points from one voxel coordinate frame to another. Points are stored
/// as rows `(x, y, z)` where x follows columns, y rows and z depth.
///
/// # Type Parameters
/// * `B` - The Burn backend
pub trait Transform<B: Backend> {
    /// Apply transform to a batch of points.
    ///
    /// # Arguments
    /// * `points` - Tensor of shape `[Batch, 3]` containing the input points
    ///
    /// # Returns
    /// Tensor of shape `[Batch, 3]` containing the transformed points
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Get the inverse transform.
    ///
    /// Fails with `SingularTransform` when the mapping cannot be inverted.
    fn inverse(&self) -> Result<Self>
    where
        Self: Sized;
}
