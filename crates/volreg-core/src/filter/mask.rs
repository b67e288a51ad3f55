//! Boolean model volumes for registration.
//!
//! Registration only needs two same-shaped boolean volumes. How they are
//! produced (flood fill, morphology, edge detection) is up to the caller; this
//! module defines the seam plus threshold and surface-voxel builders.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::Result;
use crate::volume::Volume;

/// Produces the boolean volume that registration aligns.
pub trait MaskBuilder<B: Backend> {
    /// Build a `0.0` / `1.0` volume with the same shape as `volume`.
    fn build_mask(&self, volume: &Volume<B>) -> Result<Volume<B>>;
}

/// Solid foreground: every voxel above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdMaskBuilder {
    threshold: f32,
}

impl ThresholdMaskBuilder {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for ThresholdMaskBuilder {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl<B: Backend> MaskBuilder<B> for ThresholdMaskBuilder {
    fn build_mask(&self, volume: &Volume<B>) -> Result<Volume<B>> {
        Ok(volume.to_mask(self.threshold))
    }
}

/// Surface voxels of a thresholded foreground.
///
/// A voxel is on the surface when it is foreground (above `threshold`) and at
/// least one of its six face neighbours is background. Voxels on the volume
/// border count their outside neighbours as background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryMaskBuilder {
    threshold: f32,
}

impl BoundaryMaskBuilder {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for BoundaryMaskBuilder {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl<B: Backend> MaskBuilder<B> for BoundaryMaskBuilder {
    fn build_mask(&self, volume: &Volume<B>) -> Result<Volume<B>> {
        let foreground = volume.to_mask(self.threshold).into_tensor();

        let mut interior = foreground.clone();
        for axis in 0..3 {
            interior = interior
                * shifted(&foreground, axis, true)
                * shifted(&foreground, axis, false);
        }

        Ok(Volume::new(foreground - interior))
    }
}

/// Build a mask with `builder`, for callers that only hold the trait.
pub fn build_volume_mask<B, M>(builder: &M, volume: &Volume<B>) -> Result<Volume<B>>
where
    B: Backend,
    M: MaskBuilder<B>,
{
    builder.build_mask(volume)
}

/// Neighbour values along `axis`, zero-padded at the border.
///
/// With `forward` the voxel at `i` receives the value at `i + 1`, otherwise the
/// value at `i - 1`.
fn shifted<B: Backend>(data: &Tensor<B, 3>, axis: usize, forward: bool) -> Tensor<B, 3> {
    let dims = data.dims();
    let len = dims[axis];
    let device = data.device();

    if len < 2 {
        return Tensor::zeros(dims, &device);
    }

    let mut pad_dims = dims;
    pad_dims[axis] = 1;
    let pad = Tensor::<B, 3>::zeros(pad_dims, &device);

    let mut ranges = [0..dims[0], 0..dims[1], 0..dims[2]];
    if forward {
        ranges[axis] = 1..len;
        Tensor::cat(vec![data.clone().slice(ranges), pad], axis)
    } else {
        ranges[axis] = 0..len - 1;
        Tensor::cat(vec![pad, data.clone().slice(ranges)], axis)
    }
}
