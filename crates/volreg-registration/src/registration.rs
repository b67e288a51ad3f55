//! Rigid registration of boolean volumes.
//!
//! The moving volume is resampled under a trial parameter vector, scored
//! against the fixed reference, and the cost is fed back to a derivative-free
//! minimizer until it converges or runs out of budget. Inputs are never
//! modified; the result is a parameter vector that can be applied to any
//! volume of the same shape.

use std::sync::Arc;

use burn::config::Config;
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use volreg_core::{
    resample, BoundaryMode, CoreError, NearestNeighborInterpolator, ParameterVector, Volume,
    VolumeResampler,
};

use crate::error::{self, RegistrationError};
use crate::metric::{Metric, MetricValue, OverlapMetric};
use crate::optimizer::{ConvergenceStatus, Minimizer, NelderMead, NelderMeadConfig};
use crate::progress::{EvaluationObserver, ObserverSet, TracingObserver};
use crate::validation::{validate_nelder_mead_config, validate_start, validate_steps, validate_volume_shapes};

/// What to do with a trial whose transform cannot be inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SingularTrialPolicy {
    /// Score the trial as `+inf` and keep searching.
    #[default]
    Penalize,
    /// Stop the run with [`RegistrationError::SingularTransform`].
    Abort,
}

/// Registration Configuration
#[derive(Config, Debug, PartialEq)]
pub struct RegistrationConfig {
    /// Voxels cropped from every face before scoring
    #[config(default = 5)]
    pub crop_margin: usize,
    /// Initial simplex step for the three rotation angles (radians)
    #[config(default = 0.05)]
    pub rotation_step: f64,
    /// Initial simplex step for the three translations (voxels)
    #[config(default = 1.0)]
    pub translation_step: f64,
    /// Initial simplex step for the three scale factors
    #[config(default = 0.05)]
    pub scale_step: f64,
    #[config(default = "NelderMeadConfig::new()")]
    pub optimizer: NelderMeadConfig,
    #[config(default = "SingularTrialPolicy::Penalize")]
    pub singular_policy: SingularTrialPolicy,
    /// Value of moving-volume samples that fall outside the volume
    #[config(default = "BoundaryMode::Constant(0.0)")]
    pub boundary: BoundaryMode,
}

impl RegistrationConfig {
    /// Per-parameter initial simplex steps, in parameter vector order.
    pub fn initial_steps(&self) -> Vec<f64> {
        let mut steps = Vec::with_capacity(ParameterVector::LEN);
        steps.extend([self.rotation_step; 3]);
        steps.extend([self.translation_step; 3]);
        steps.extend([self.scale_step; 3]);
        steps
    }

    /// Check the configuration before a run.
    pub fn validate(&self) -> error::Result<()> {
        validate_steps(&self.initial_steps())?;
        validate_nelder_mead_config(&self.optimizer)
    }
}

/// Result of a registration run.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    /// Best parameters found.
    pub params: ParameterVector,
    /// Cost at `params`.
    pub cost: f64,
    /// Overlap count at `params`; 0 if every trial was penalized.
    pub overlap: usize,
    pub evaluations: usize,
    pub iterations: usize,
    pub restarts: usize,
    /// Trials scored as `+inf` because their transform was singular.
    pub penalized_trials: usize,
    pub status: ConvergenceStatus,
}

impl RegistrationOutcome {
    pub fn converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }

    /// Resample `volume` with the best parameters, zero-filling outside.
    ///
    /// Typically used to move the intensity volume once its mask has been
    /// registered.
    pub fn apply<B: Backend>(&self, volume: &Volume<B>) -> error::Result<Volume<B>> {
        Ok(resample(volume, &self.params)?)
    }
}

/// Registration driver.
///
/// # Type Parameters
/// * `B` - The tensor backend
/// * `M` - The similarity metric
/// * `O` - The minimizer
pub struct Registration<B, M = OverlapMetric, O = NelderMead>
where
    B: Backend,
    M: Metric<B>,
    O: Minimizer,
{
    config: RegistrationConfig,
    metric: M,
    minimizer: O,
    resampler: VolumeResampler<B>,
    observers: ObserverSet,
}

impl<B: Backend> Registration<B> {
    /// Overlap metric and Nelder-Mead, both set up from `config`.
    pub fn new(config: RegistrationConfig) -> Self {
        let metric = OverlapMetric::new(config.crop_margin);
        let minimizer = NelderMead::new(config.optimizer.clone()).with_steps(config.initial_steps());
        Self::with_parts(config, metric, minimizer)
    }
}

impl<B, M, O> Registration<B, M, O>
where
    B: Backend,
    M: Metric<B>,
    O: Minimizer,
{
    /// Use a custom metric and minimizer.
    ///
    /// `crop_margin`, the simplex steps and the optimizer section of `config`
    /// are only read by [`Registration::new`]; here the metric and minimizer
    /// carry their own settings.
    pub fn with_parts(config: RegistrationConfig, metric: M, minimizer: O) -> Self {
        let resampler = VolumeResampler::new(
            NearestNeighborInterpolator::new().with_boundary(config.boundary),
        );
        Self {
            config,
            metric,
            minimizer,
            resampler,
            observers: ObserverSet::new(),
        }
    }

    /// Attach an observer notified on every evaluation.
    pub fn with_observer(mut self, observer: Arc<dyn EvaluationObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Log every evaluation at debug level.
    pub fn with_tracing(self) -> Self {
        self.with_observer(Arc::new(TracingObserver::default()))
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Score a single trial: resample `moving` under `params`, compare with
    /// `reference`.
    pub fn evaluate(
        &self,
        reference: &Volume<B>,
        moving: &Volume<B>,
        params: &ParameterVector,
    ) -> error::Result<MetricValue> {
        let candidate = self.resampler.apply(moving, params)?;
        self.metric.evaluate(reference, &candidate)
    }

    /// Register `moving` onto `reference`, starting from `start`.
    pub fn execute(
        &mut self,
        reference: &Volume<B>,
        moving: &Volume<B>,
        start: &ParameterVector,
    ) -> error::Result<RegistrationOutcome> {
        validate_volume_shapes(reference, moving)?;
        self.metric.validate_shape(reference.shape())?;
        validate_start(start)?;
        self.config.validate()?;

        let Self {
            config,
            metric,
            minimizer,
            resampler,
            observers,
        } = self;
        let policy = config.singular_policy;

        tracing::info!(
            shape = ?reference.shape(),
            metric = metric.name(),
            minimizer = minimizer.name(),
            "Registration started from {}",
            start
        );
        observers.start(start);

        let mut evaluations = 0;
        let mut penalized_trials = 0;
        let mut best_overlap: Option<(f64, usize)> = None;

        let result = {
            let observers = &*observers;
            let mut objective = |x: &[f64]| -> error::Result<f64> {
                evaluations += 1;
                let params = ParameterVector::from_slice(x)?;

                match resampler.apply(moving, &params) {
                    Ok(candidate) => {
                        let value = metric.evaluate(reference, &candidate)?;
                        if best_overlap.map_or(true, |(cost, _)| value.cost < cost) {
                            best_overlap = Some((value.cost, value.overlap));
                        }
                        observers.evaluation(evaluations, params, value.cost, Some(value.overlap));
                        Ok(value.cost)
                    }
                    Err(CoreError::SingularTransform(msg)) => match policy {
                        SingularTrialPolicy::Penalize => {
                            penalized_trials += 1;
                            tracing::warn!(evaluation = evaluations, "penalizing singular trial {}: {}", params, msg);
                            observers.evaluation(evaluations, params, f64::INFINITY, None);
                            Ok(f64::INFINITY)
                        }
                        SingularTrialPolicy::Abort => Err(RegistrationError::singular_transform(msg)),
                    },
                    Err(err) => Err(err.into()),
                }
            };
            minimizer.minimize(&mut objective, start.as_slice())
        };

        let search = match result {
            Ok(search) => search,
            Err(err) => {
                tracing::error!("Registration failed: {}", err);
                return Err(err);
            }
        };

        let outcome = RegistrationOutcome {
            params: ParameterVector::from_slice(&search.best)?,
            cost: search.value,
            overlap: best_overlap.map_or(0, |(_, overlap)| overlap),
            evaluations: search.evaluations,
            iterations: search.iterations,
            restarts: search.restarts,
            penalized_trials,
            status: search.status,
        };

        match outcome.status {
            ConvergenceStatus::Converged => tracing::info!(
                evaluations = outcome.evaluations,
                restarts = outcome.restarts,
                overlap = outcome.overlap,
                "Registration converged to {} (cost {:.6})",
                outcome.params,
                outcome.cost
            ),
            ConvergenceStatus::BudgetExhausted => tracing::warn!(
                evaluations = outcome.evaluations,
                iterations = outcome.iterations,
                overlap = outcome.overlap,
                "Registration budget exhausted; best so far {} (cost {:.6})",
                outcome.params,
                outcome.cost
            ),
        }

        observers.complete(&outcome);
        Ok(outcome)
    }
}

/// Register `moving` onto `reference` with the default configuration and
/// return the best parameters.
///
/// Use [`register_with`] to get convergence status and counts as well.
pub fn register<B: Backend>(
    reference: &Volume<B>,
    moving: &Volume<B>,
    start: &ParameterVector,
) -> error::Result<ParameterVector> {
    Ok(register_with(RegistrationConfig::new(), reference, moving, start)?.params)
}

/// Register with an explicit configuration.
pub fn register_with<B: Backend>(
    config: RegistrationConfig,
    reference: &Volume<B>,
    moving: &Volume<B>,
    start: &ParameterVector,
) -> error::Result<RegistrationOutcome> {
    Registration::<B>::new(config).execute(reference, moving, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn cube(offset: usize) -> Volume<TestBackend> {
        let device = Default::default();
        // 6^3 cube well inside the 5-voxel crop of a 20^3 volume
        Volume::from_fn([20, 20, 20], &device, |r, c, k| {
            let inside = |i: usize| (7..13).contains(&i);
            if inside(r) && inside(c.wrapping_sub(offset)) && inside(k) {
                1.0
            } else {
                0.0
            }
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = RegistrationConfig::new();
        assert_eq!(config.crop_margin, 5);
        assert_eq!(config.singular_policy, SingularTrialPolicy::Penalize);
        assert_eq!(config.boundary, BoundaryMode::Constant(0.0));
        assert_eq!(config.optimizer.max_evaluations, 2000);
        assert_eq!(
            config.initial_steps(),
            vec![0.05, 0.05, 0.05, 1.0, 1.0, 1.0, 0.05, 0.05, 0.05]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_step_is_rejected() {
        let config = RegistrationConfig::new().with_translation_step(0.0);
        assert!(matches!(
            config.validate(),
            Err(RegistrationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_evaluate_single_trial() {
        let reference = cube(1);
        let moving = cube(0);
        let registration = Registration::<TestBackend>::new(RegistrationConfig::new());

        let at_start = registration
            .evaluate(&reference, &moving, &ParameterVector::IDENTITY)
            .unwrap();
        let aligned = registration
            .evaluate(&reference, &moving, &ParameterVector::from_translation([1.0, 0.0, 0.0]))
            .unwrap();

        assert_eq!(at_start.overlap, 180);
        assert_eq!(aligned.overlap, 216);
        assert!(aligned.cost < at_start.cost);
    }

    #[test]
    fn test_shape_mismatch_fails_fast() {
        let device = Default::default();
        let reference = cube(0);
        let moving = Volume::<TestBackend>::zeros([20, 20, 19], &device);
        let err = register(&reference, &moving, &ParameterVector::IDENTITY).unwrap_err();
        assert!(matches!(err, RegistrationError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_outcome_apply() {
        let outcome = RegistrationOutcome {
            params: ParameterVector::from_translation([1.0, 0.0, 0.0]),
            cost: 0.0,
            overlap: 0,
            evaluations: 0,
            iterations: 0,
            restarts: 0,
            penalized_trials: 0,
            status: ConvergenceStatus::Converged,
        };
        let moved = outcome.apply(&cube(0)).unwrap();
        assert_eq!(moved.to_vec(), cube(1).to_vec());
    }
}
