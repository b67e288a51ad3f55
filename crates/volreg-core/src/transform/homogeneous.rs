//! 4×4 homogeneous transform.
//!
//! The matrix lives on the CPU as `nalgebra::Matrix4<f64>`; it is only
//! converted to a backend tensor when a batch of points is mapped.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use nalgebra::{Matrix4, Vector4};

use super::trait_::Transform;
use crate::error::{CoreError, Result};

/// Affine transform in homogeneous coordinates.
///
/// Column-vector convention: a point `p = (x, y, z, 1)` maps to `M · p`.
/// A transform produced by [`TransformBuilder`](super::TransformBuilder)
/// remembers the volume shape it was centred on, so it cannot be silently
/// applied to a differently shaped volume.
#[derive(Debug, Clone, PartialEq)]
pub struct HomogeneousTransform {
    matrix: Matrix4<f64>,
    reference_shape: Option<[usize; 3]>,
}

impl HomogeneousTransform {
    /// Wrap an arbitrary homogeneous matrix.
    pub fn new(matrix: Matrix4<f64>) -> Self {
        Self {
            matrix,
            reference_shape: None,
        }
    }

    /// Identity transform.
    pub fn identity() -> Self {
        Self::new(Matrix4::identity())
    }

    /// Tie this transform to the volume shape it was built for.
    pub fn with_reference_shape(mut self, shape: [usize; 3]) -> Self {
        self.reference_shape = Some(shape);
        self
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Shape of the volume this transform was centred on, if any.
    pub fn reference_shape(&self) -> Option<[usize; 3]> {
        self.reference_shape
    }

    /// Invert the matrix.
    ///
    /// A zero scale factor (or any other rank deficiency) makes the matrix
    /// singular; near-singular matrices whose inverse overflows are rejected
    /// as well.
    pub fn try_inverse(&self) -> Result<Self> {
        let inverse = self.matrix.try_inverse().ok_or_else(|| {
            let determinant = self.matrix.determinant();
            tracing::debug!(determinant, "rejecting singular transform");
            CoreError::singular_transform(format!(
                "matrix is not invertible (determinant {:e})",
                determinant
            ))
        })?;

        if inverse.iter().any(|v| !v.is_finite()) {
            tracing::debug!("rejecting transform with non-finite inverse");
            return Err(CoreError::singular_transform(
                "inverse contains non-finite entries",
            ));
        }

        Ok(Self {
            matrix: inverse,
            reference_shape: self.reference_shape,
        })
    }

    /// Map a single point `(x, y, z)`.
    pub fn apply_point(&self, point: [f64; 3]) -> [f64; 3] {
        let p = self.matrix * Vector4::new(point[0], point[1], point[2], 1.0);
        [p[0], p[1], p[2]]
    }

    /// `self · other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
            reference_shape: self.reference_shape.or(other.reference_shape),
        }
    }

    /// Transposed matrix as a `[4, 4]` tensor, ready for row-vector matmul.
    fn transposed_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let mut data = Vec::with_capacity(16);
        for r in 0..4 {
            for c in 0..4 {
                data.push(self.matrix[(c, r)] as f32);
            }
        }
        Tensor::<B, 2>::from_data(TensorData::new(data, Shape::new([4, 4])), device)
    }
}

impl Default for HomogeneousTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl<B: Backend> Transform<B> for HomogeneousTransform {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        // Row-vector form: [x y z 1] @ M^T
        let [n, _] = points.dims();
        let device = points.device();

        let ones = Tensor::<B, 2>::ones([n, 1], &device);
        let homogeneous = Tensor::cat(vec![points, ones], 1);
        let mapped = homogeneous.matmul(self.transposed_tensor::<B>(&device));

        mapped.slice([0..n, 0..3])
    }

    fn inverse(&self) -> Result<Self> {
        self.try_inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn translation(t: [f64; 3]) -> HomogeneousTransform {
        let mut m = Matrix4::identity();
        m[(0, 3)] = t[0];
        m[(1, 3)] = t[1];
        m[(2, 3)] = t[2];
        HomogeneousTransform::new(m)
    }

    #[test]
    fn test_apply_point_translation() {
        let t = translation([1.0, -2.0, 3.0]);
        assert_eq!(t.apply_point([0.0, 0.0, 0.0]), [1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_inverse_of_translation() {
        let t = translation([1.0, -2.0, 3.0]);
        let inv = t.try_inverse().unwrap();
        assert_eq!(inv.apply_point([1.0, -2.0, 3.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_singular_matrix_is_rejected() {
        let mut m = Matrix4::identity();
        m[(1, 1)] = 0.0;
        let err = HomogeneousTransform::new(m).try_inverse().unwrap_err();
        assert!(matches!(err, CoreError::SingularTransform(_)));
    }

    #[test]
    fn test_compose_order() {
        let mut scale = Matrix4::identity();
        scale[(0, 0)] = 2.0;
        let scale = HomogeneousTransform::new(scale);
        let shift = translation([1.0, 0.0, 0.0]);

        // shift first, then scale: (0 + 1) * 2
        assert_eq!(scale.compose(&shift).apply_point([0.0, 0.0, 0.0])[0], 2.0);
        // scale first, then shift: 0 * 2 + 1
        assert_eq!(shift.compose(&scale).apply_point([0.0, 0.0, 0.0])[0], 1.0);
    }

    #[test]
    fn test_transform_points_matches_apply_point() {
        let device = Default::default();
        let t = translation([1.0, 2.0, 3.0]);

        let points = Tensor::<TestBackend, 2>::from_floats(
            [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
            &device,
        );
        let mapped = Transform::<TestBackend>::transform_points(&t, points);
        assert_eq!(mapped.dims(), [2, 3]);

        let data = mapped.into_data();
        let slice = data.as_slice::<f32>().unwrap();
        assert_eq!(slice, &[1.0, 2.0, 3.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_reference_shape_survives_inverse() {
        let t = translation([1.0, 0.0, 0.0]).with_reference_shape([4, 5, 6]);
        assert_eq!(t.try_inverse().unwrap().reference_shape(), Some([4, 5, 6]));
    }
}
