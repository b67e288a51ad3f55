//! Volume filters.
//!
//! Pull resampling under a parameter transform, and the seam for producing
//! the boolean volumes registration works on.

pub mod resample;
pub mod mask;

pub use resample::{resample, VolumeResampler};
pub use mask::{build_volume_mask, BoundaryMaskBuilder, MaskBuilder, ThresholdMaskBuilder};
