//! Transform types and operations.
//!
//! This module provides the nine-parameter description of a centred rigid
//! transform with anisotropic scaling, the homogeneous matrix it expands to,
//! and the builder that performs the expansion.

pub mod trait_;
pub mod params;
pub mod homogeneous;
pub mod builder;

pub use trait_::Transform;
pub use params::ParameterVector;
pub use homogeneous::HomogeneousTransform;
pub use builder::TransformBuilder;
