//! Volumes, centred rigid transforms and nearest-neighbour resampling.
//!
//! Volumes are `burn` tensors indexed `[row, column, depth]`. Coordinates use
//! x along columns, y along rows and z along depth.

pub mod error;
pub mod volume;
pub mod transform;
pub mod interpolation;
pub mod filter;

pub use error::{CoreError, Result};
pub use volume::{SamplingGrid, Volume};
pub use transform::{HomogeneousTransform, ParameterVector, TransformBuilder};
pub use interpolation::{BoundaryMode, NearestNeighborInterpolator};
pub use filter::{
    build_volume_mask, resample, BoundaryMaskBuilder, MaskBuilder, ThresholdMaskBuilder, VolumeResampler,
};
