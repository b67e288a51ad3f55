//! Error types for registration operations.
//!
//! Errors raised by `volreg-core` are folded into the variant of the same
//! meaning, so callers match on one enum regardless of which layer failed.

use thiserror::Error;
use volreg_core::CoreError;

/// Main error type for registration operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    /// Volumes that must share a shape do not.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A volume is too small for the requested operation.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A trial transform could not be inverted.
    #[error("Singular transform: {0}")]
    SingularTransform(String),

    /// Input volume is malformed.
    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    /// Error in optimizer operation.
    #[error("Optimizer error: {0}")]
    OptimizerError(String),

    /// Numerical instability detected.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for registration operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

impl RegistrationError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: [usize; 3], actual: [usize; 3]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Create a singular transform error.
    pub fn singular_transform(msg: impl Into<String>) -> Self {
        Self::SingularTransform(msg.into())
    }

    /// Create an optimizer error.
    pub fn optimizer(msg: impl Into<String>) -> Self {
        Self::OptimizerError(msg.into())
    }

    /// Create a numerical instability error.
    pub fn numerical_instability(msg: impl Into<String>) -> Self {
        Self::NumericalInstability(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn is_singular_transform(&self) -> bool {
        matches!(self, Self::SingularTransform(_))
    }
}

impl From<CoreError> for RegistrationError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ShapeMismatch { expected, actual } => Self::ShapeMismatch { expected, actual },
            CoreError::SingularTransform(msg) => Self::SingularTransform(msg),
            CoreError::InvalidVolume(msg) => Self::InvalidVolume(msg),
            CoreError::NumericalInstability(msg) => Self::NumericalInstability(msg),
            CoreError::InvalidParameters(msg) => Self::InvalidConfiguration(msg),
        }
    }
}
