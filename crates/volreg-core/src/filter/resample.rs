//! Resample volume filter.
//!
//! This module provides VolumeResampler which resamples a volume under the
//! inverse of a centred parameter transform ("pull" resampling).

use std::marker::PhantomData;

use burn::tensor::backend::Backend;

use crate::error::{CoreError, Result};
use crate::interpolation::{Interpolator, NearestNeighborInterpolator};
use crate::transform::{HomogeneousTransform, ParameterVector, TransformBuilder};
use crate::volume::{SamplingGrid, Volume};

/// Resample volume filter.
///
/// For every output voxel the filter finds the source position it came from by
/// applying the inverse of the forward transform, then samples the source with
/// the interpolator. The output always has the source's shape and the source
/// is never modified.
///
/// # Type Parameters
/// * `B` - The Burn backend
/// * `I` - The interpolator type
pub struct VolumeResampler<B, I = NearestNeighborInterpolator>
where
    B: Backend,
    I: Interpolator<B>,
{
    interpolator: I,
    _phantom: PhantomData<B>,
}

impl<B: Backend> VolumeResampler<B, NearestNeighborInterpolator> {
    /// Nearest-neighbour resampler with zero fill outside the source.
    pub fn nearest() -> Self {
        Self::new(NearestNeighborInterpolator::new())
    }
}

impl<B: Backend> Default for VolumeResampler<B, NearestNeighborInterpolator> {
    fn default() -> Self {
        Self::nearest()
    }
}

impl<B, I> VolumeResampler<B, I>
where
    B: Backend,
    I: Interpolator<B>,
{
    /// Create a new resample filter.
    pub fn new(interpolator: I) -> Self {
        Self {
            interpolator,
            _phantom: PhantomData,
        }
    }

    pub fn interpolator(&self) -> &I {
        &self.interpolator
    }

    /// Forward transform for `params`, centred on `shape`.
    pub fn transform_for(&self, shape: [usize; 3], params: &ParameterVector) -> HomogeneousTransform {
        TransformBuilder::new(shape).build(params)
    }

    /// Source coordinates for every voxel of an output volume of `shape`.
    pub fn sampling_grid(
        &self,
        shape: [usize; 3],
        params: &ParameterVector,
        device: &B::Device,
    ) -> Result<SamplingGrid<B>> {
        params.ensure_finite()?;
        let inverse = self.transform_for(shape, params).try_inverse()?;
        Ok(SamplingGrid::<B>::new(shape, &inverse, device))
    }

    /// Resample `volume` under the transform described by `params`.
    pub fn apply(&self, volume: &Volume<B>, params: &ParameterVector) -> Result<Volume<B>> {
        params.ensure_finite()?;
        let forward = self.transform_for(volume.shape(), params);
        self.apply_transform(volume, &forward)
    }

    /// Resample `volume` under an already built forward transform.
    ///
    /// Transforms built for a different shape are rejected: their pivot would
    /// sit somewhere other than this volume's centre.
    pub fn apply_transform(
        &self,
        volume: &Volume<B>,
        forward: &HomogeneousTransform,
    ) -> Result<Volume<B>> {
        volume.ensure_non_empty()?;
        let shape = volume.shape();
        if let Some(reference) = forward.reference_shape() {
            if reference != shape {
                return Err(CoreError::shape_mismatch(reference, shape));
            }
        }

        let inverse = forward.try_inverse()?;
        let grid = SamplingGrid::<B>::new(shape, &inverse, &volume.device());

        let values = self.interpolator.interpolate(volume.data(), grid.into_points());
        Ok(Volume::new(values.reshape(shape)))
    }
}

/// Resample `volume` under `params` with nearest-neighbour sampling and zero fill.
pub fn resample<B: Backend>(volume: &Volume<B>, params: &ParameterVector) -> Result<Volume<B>> {
    VolumeResampler::<B>::nearest().apply(volume, params)
}
