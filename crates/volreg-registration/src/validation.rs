//! Validation utilities for registration operations.
//!
//! This module provides the input and configuration checks run before a
//! registration starts, so bad inputs fail fast instead of surfacing deep
//! inside the minimizer.

use burn::tensor::backend::Backend;
use volreg_core::{ParameterVector, Volume};

use crate::error::{RegistrationError, Result};
use crate::optimizer::NelderMeadConfig;

/// Validate that two volumes have the same shape.
pub fn validate_volume_shapes<B: Backend>(reference: &Volume<B>, moving: &Volume<B>) -> Result<()> {
    let expected = reference.shape();
    let actual = moving.shape();

    if expected != actual {
        return Err(RegistrationError::shape_mismatch(expected, actual));
    }

    Ok(())
}

/// Validate that cropping `margin` voxels from every face leaves something.
pub fn validate_crop_margin(shape: [usize; 3], margin: usize) -> Result<()> {
    if let Some(len) = shape.iter().copied().find(|&len| 2 * margin >= len) {
        return Err(RegistrationError::dimension_mismatch(format!(
            "crop margin {} leaves no voxels on an axis of length {} (shape {:?})",
            margin, len, shape
        )));
    }

    Ok(())
}

/// Validate a starting parameter vector.
pub fn validate_start(start: &ParameterVector) -> Result<()> {
    if !start.is_finite() {
        return Err(RegistrationError::numerical_instability(format!(
            "starting parameters must be finite, got {}",
            start
        )));
    }

    Ok(())
}

/// Validate per-coordinate initial simplex steps.
pub fn validate_steps(steps: &[f64]) -> Result<()> {
    if steps.is_empty() {
        return Err(RegistrationError::invalid_configuration(
            "at least one initial step is required",
        ));
    }

    if let Some((i, step)) = steps
        .iter()
        .enumerate()
        .find(|(_, s)| !s.is_finite() || **s == 0.0)
    {
        return Err(RegistrationError::invalid_configuration(format!(
            "initial step {} must be finite and non-zero, got {}",
            i, step
        )));
    }

    Ok(())
}

/// Validate iteration or evaluation budgets.
pub fn validate_budget(name: &str, budget: usize) -> Result<()> {
    if budget == 0 {
        return Err(RegistrationError::invalid_configuration(format!(
            "{} must be positive",
            name
        )));
    }

    Ok(())
}

/// Validate a tolerance.
pub fn validate_tolerance(name: &str, tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(RegistrationError::invalid_configuration(format!(
            "{} must be finite and non-negative, got {}",
            name, tolerance
        )));
    }

    Ok(())
}

/// Validate a Nelder-Mead configuration.
pub fn validate_nelder_mead_config(config: &NelderMeadConfig) -> Result<()> {
    validate_steps(&[config.initial_step])?;
    validate_tolerance("xatol", config.xatol)?;
    validate_tolerance("fatol", config.fatol)?;
    validate_budget("max_evaluations", config.max_evaluations)?;
    validate_budget("max_iterations", config.max_iterations)?;

    if !(config.reflection > 0.0) {
        return Err(RegistrationError::invalid_configuration(format!(
            "reflection coefficient must be positive, got {}",
            config.reflection
        )));
    }

    if !(config.expansion > 1.0 && config.expansion > config.reflection) {
        return Err(RegistrationError::invalid_configuration(format!(
            "expansion coefficient must exceed 1 and the reflection coefficient, got {}",
            config.expansion
        )));
    }

    for (name, value) in [("contraction", config.contraction), ("shrink", config.shrink)] {
        if !(value > 0.0 && value < 1.0) {
            return Err(RegistrationError::invalid_configuration(format!(
                "{} coefficient must lie in (0, 1), got {}",
                name, value
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_validate_volume_shapes() {
        let device = Default::default();
        let a = Volume::<TestBackend>::zeros([4, 4, 4], &device);
        let b = Volume::<TestBackend>::zeros([4, 4, 5], &device);
        assert!(validate_volume_shapes(&a, &a).is_ok());
        assert!(matches!(
            validate_volume_shapes(&a, &b),
            Err(RegistrationError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_crop_margin() {
        assert!(validate_crop_margin([11, 11, 11], 5).is_ok());
        assert!(validate_crop_margin([10, 11, 11], 5).is_err());
        assert!(validate_crop_margin([1, 1, 1], 0).is_ok());
    }

    #[test]
    fn test_validate_start() {
        assert!(validate_start(&ParameterVector::IDENTITY).is_ok());
        let bad = ParameterVector::from_translation([f64::NAN, 0.0, 0.0]);
        assert!(matches!(
            validate_start(&bad),
            Err(RegistrationError::NumericalInstability(_))
        ));
    }

    #[test]
    fn test_validate_steps() {
        assert!(validate_steps(&[0.05, 1.0]).is_ok());
        assert!(validate_steps(&[]).is_err());
        assert!(validate_steps(&[0.05, 0.0]).is_err());
        assert!(validate_steps(&[f64::INFINITY]).is_err());
    }

    #[test]
    fn test_validate_nelder_mead_config() {
        assert!(validate_nelder_mead_config(&NelderMeadConfig::new()).is_ok());
        assert!(validate_nelder_mead_config(&NelderMeadConfig::new().with_max_evaluations(0)).is_err());
        assert!(validate_nelder_mead_config(&NelderMeadConfig::new().with_xatol(-1.0)).is_err());
        assert!(validate_nelder_mead_config(&NelderMeadConfig::new().with_shrink(1.0)).is_err());
        assert!(validate_nelder_mead_config(&NelderMeadConfig::new().with_expansion(0.5)).is_err());
    }
}
