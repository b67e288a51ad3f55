//! Volume types and operations.
//!
//! This module provides the Volume type and the sampling grid used to pull
//! voxel values through a transform.

pub mod volume;
pub mod grid;

pub use volume::{Volume, MASK_THRESHOLD};
pub use grid::{voxel_coordinates, SamplingGrid};
