//! Error types for volume and transform operations.
//!
//! Shape and singularity problems are reported here rather than panicking,
//! so the registration loop can decide how to treat an invalid trial.

use thiserror::Error;

/// Main error type for core volume operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Two volumes that must share a shape do not.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The homogeneous transform cannot be inverted.
    #[error("Singular transform: {0}")]
    SingularTransform(String),

    /// Volume data is malformed (wrong buffer length, empty axis, ...).
    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    /// A parameter is NaN or infinite.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// A parameter slice has the wrong length.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a shape mismatch error from two shapes.
    pub fn shape_mismatch(expected: [usize; 3], actual: [usize; 3]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create a singular transform error.
    pub fn singular_transform(msg: impl Into<String>) -> Self {
        Self::SingularTransform(msg.into())
    }

    /// Create an invalid volume error.
    pub fn invalid_volume(msg: impl Into<String>) -> Self {
        Self::InvalidVolume(msg.into())
    }

    /// Create a numerical instability error.
    pub fn numerical_instability(msg: impl Into<String>) -> Self {
        Self::NumericalInstability(msg.into())
    }

    /// Create an invalid parameters error.
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}
