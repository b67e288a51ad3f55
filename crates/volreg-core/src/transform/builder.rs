//! Builds centred homogeneous transforms from parameter vectors.
//!
//! Composition order is part of the contract:
//!
//! ```text
//! T = Rx(θx) · Ry(θy) · Rz(θz) · S(t, s)
//! M = C · T · C⁻¹
//! ```
//!
//! where `S` combines translation and per-axis scaling in one affine step and
//! `C` translates the origin to the volume midpoint. Reordering any of these
//! products changes the result.

use nalgebra::Matrix4;

use super::homogeneous::HomogeneousTransform;
use super::params::ParameterVector;

/// Builds [`HomogeneousTransform`]s centred on a volume of fixed shape.
///
/// Shapes are `[rows, cols, depth]`; the x axis follows columns, y rows and
/// z depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformBuilder {
    shape: [usize; 3],
}

impl TransformBuilder {
    /// Create a builder for volumes of the given `[rows, cols, depth]` shape.
    pub fn new(shape: [usize; 3]) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Pivot point `(x, y, z)` of rotation and scaling.
    ///
    /// Each coordinate is `(len - 1) / 2` truncated to a whole voxel, so the
    /// pivot always sits on a voxel centre. Axes of length 1 give 0.
    pub fn midpoint(&self) -> [f64; 3] {
        let [rows, cols, depth] = self.shape;
        let mid = |len: usize| (len.saturating_sub(1) / 2) as f64;
        [mid(cols), mid(rows), mid(depth)]
    }

    /// Build the centred transform for `params`.
    pub fn build(&self, params: &ParameterVector) -> HomogeneousTransform {
        let [ax, ay, az] = params.rotation();
        let [tx, ty, tz] = params.translation();
        let [sx, sy, sz] = params.scale();

        let transform =
            rotation_x(ax) * rotation_y(ay) * rotation_z(az) * scale_translate([tx, ty, tz], [sx, sy, sz]);

        let [mx, my, mz] = self.midpoint();
        let to_center = translation([mx, my, mz]);
        let from_center = translation([-mx, -my, -mz]);

        HomogeneousTransform::new(to_center * transform * from_center)
            .with_reference_shape(self.shape)
    }
}

/// Rotation about the x axis.
pub fn rotation_x(theta: f64) -> Matrix4<f64> {
    let (s, c) = theta.sin_cos();
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, c, s, 0.0,
        0.0, -s, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about the y axis.
pub fn rotation_y(theta: f64) -> Matrix4<f64> {
    let (s, c) = theta.sin_cos();
    Matrix4::new(
        c, 0.0, -s, 0.0,
        0.0, 1.0, 0.0, 0.0,
        s, 0.0, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about the z axis.
pub fn rotation_z(theta: f64) -> Matrix4<f64> {
    let (s, c) = theta.sin_cos();
    Matrix4::new(
        c, -s, 0.0, 0.0,
        s, c, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Scaling by `scale` followed by translation by `offset`.
pub fn scale_translate(offset: [f64; 3], scale: [f64; 3]) -> Matrix4<f64> {
    Matrix4::new(
        scale[0], 0.0, 0.0, offset[0],
        0.0, scale[1], 0.0, offset[1],
        0.0, 0.0, scale[2], offset[2],
        0.0, 0.0, 0.0, 1.0,
    )
}

fn translation(offset: [f64; 3]) -> Matrix4<f64> {
    scale_translate(offset, [1.0, 1.0, 1.0])
}
