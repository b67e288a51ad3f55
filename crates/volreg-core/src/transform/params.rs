//! Nine-parameter description of a centred rigid transform with scaling.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Ordered parameter vector `(θx, θy, θz, tx, ty, tz, sx, sy, sz)`.
///
/// * `θx, θy, θz` - rotation angles in radians about the x, y and z axes
/// * `tx, ty, tz` - translation in voxel units
/// * `sx, sy, sz` - per-axis scale factors
///
/// The x axis runs along volume columns, y along rows and z along depth.
/// A `ParameterVector` is a plain value: every optimizer iterate and every
/// registration result is a fresh, immutable copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterVector([f64; 9]);

impl ParameterVector {
    /// Number of scalar parameters.
    pub const LEN: usize = 9;

    /// No rotation, no translation, unit scale.
    pub const IDENTITY: Self = Self([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);

    /// Tuned T2-to-T1 alignment for the head MRI dataset.
    ///
    /// Found by a previous automatic fit; mostly a ~6% in-plane shrink of the
    /// T2 sequence. Useful as a starting point for volumes from the same
    /// scanner protocol.
    pub const T2_TO_T1_HEAD: Self = Self([
        2.01109052e-04,
        1.57808256e-06,
        3.65095064e-05,
        3.50697591e-04,
        2.56535195e-04,
        -2.36831914e-04,
        9.40511337e-01,
        1.00130253e+00,
        9.38207923e-01,
    ]);

    /// Create a parameter vector from its three groups.
    pub fn new(rotation: [f64; 3], translation: [f64; 3], scale: [f64; 3]) -> Self {
        Self([
            rotation[0],
            rotation[1],
            rotation[2],
            translation[0],
            translation[1],
            translation[2],
            scale[0],
            scale[1],
            scale[2],
        ])
    }

    /// Pure translation with unit scale.
    pub fn from_translation(translation: [f64; 3]) -> Self {
        Self::new([0.0; 3], translation, [1.0; 3])
    }

    /// Pure rotation with unit scale.
    pub fn from_rotation(rotation: [f64; 3]) -> Self {
        Self::new(rotation, [0.0; 3], [1.0; 3])
    }

    /// Build from a slice of exactly nine values.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; 9] = values.try_into().map_err(|_| {
            CoreError::invalid_parameters(format!(
                "expected {} parameters, got {}",
                Self::LEN,
                values.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Rotation angles `(θx, θy, θz)` in radians.
    pub fn rotation(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Translation `(tx, ty, tz)` in voxels.
    pub fn translation(&self) -> [f64; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// Scale factors `(sx, sy, sz)`.
    pub fn scale(&self) -> [f64; 3] {
        [self.0[6], self.0[7], self.0[8]]
    }

    pub fn as_array(&self) -> &[f64; 9] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    /// True when no component is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Fail with `NumericalInstability` if any component is not finite.
    pub fn ensure_finite(&self) -> Result<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(CoreError::numerical_instability(format!(
                "non-finite parameter vector {}",
                self
            )))
        }
    }
}

impl Default for ParameterVector {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; 9]> for ParameterVector {
    fn from(values: [f64; 9]) -> Self {
        Self(values)
    }
}

impl From<ParameterVector> for [f64; 9] {
    fn from(params: ParameterVector) -> Self {
        params.0
    }
}

impl TryFrom<&[f64]> for ParameterVector {
    type Error = CoreError;

    fn try_from(values: &[f64]) -> Result<Self> {
        Self::from_slice(values)
    }
}

impl fmt::Display for ParameterVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [rx, ry, rz] = self.rotation();
        let [tx, ty, tz] = self.translation();
        let [sx, sy, sz] = self.scale();
        write!(
            f,
            "rot=[{:.6}, {:.6}, {:.6}] trans=[{:.4}, {:.4}, {:.4}] scale=[{:.6}, {:.6}, {:.6}]",
            rx, ry, rz, tx, ty, tz, sx, sy, sz
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_groups() {
        let p = ParameterVector::IDENTITY;
        assert_eq!(p.rotation(), [0.0; 3]);
        assert_eq!(p.translation(), [0.0; 3]);
        assert_eq!(p.scale(), [1.0; 3]);
        assert_eq!(ParameterVector::default(), p);
    }

    #[test]
    fn test_new_orders_components() {
        let p = ParameterVector::new([0.1, 0.2, 0.3], [1.0, 2.0, 3.0], [0.9, 1.1, 1.2]);
        assert_eq!(
            p.as_array(),
            &[0.1, 0.2, 0.3, 1.0, 2.0, 3.0, 0.9, 1.1, 1.2]
        );
    }

    #[test]
    fn test_from_slice_length() {
        assert!(ParameterVector::from_slice(&[0.0; 9]).is_ok());
        let err = ParameterVector::from_slice(&[0.0; 8]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameters(_)));
    }

    #[test]
    fn test_ensure_finite() {
        let mut values = [0.0; 9];
        values[4] = f64::NAN;
        let p = ParameterVector::from(values);
        assert!(!p.is_finite());
        assert!(p.ensure_finite().is_err());
        assert!(ParameterVector::IDENTITY.ensure_finite().is_ok());
    }

    #[test]
    fn test_head_preset_is_near_identity() {
        let p = ParameterVector::T2_TO_T1_HEAD;
        assert!(p.rotation().iter().all(|r| r.abs() < 1e-3));
        assert!(p.translation().iter().all(|t| t.abs() < 1e-3));
        assert!(p.scale().iter().all(|s| (s - 1.0).abs() < 0.1));
    }
}
