//! Nelder-Mead simplex minimizer with restarts.
//!
//! Derivative-free downhill simplex search. Registration costs built from
//! nearest-neighbour resampling are piecewise constant, so a single simplex
//! often shrinks onto a plateau far from the optimum. After a run converges
//! the search restarts from the best vertex with a fresh simplex, and stops
//! once a restart brings no improvement.

use burn::config::Config;

use super::trait_::{ConvergenceStatus, Minimizer, MinimizerOutcome};
use crate::error::{self, RegistrationError};
use crate::validation::{validate_nelder_mead_config, validate_steps};

/// Nelder-Mead Configuration
#[derive(Config, Debug, PartialEq)]
pub struct NelderMeadConfig {
    /// Initial simplex edge along every axis, unless per-axis steps are given
    #[config(default = 0.05)]
    pub initial_step: f64,
    /// Converged once every vertex lies within this distance of the best one
    #[config(default = 1e-3)]
    pub xatol: f64,
    /// Converged also requires every vertex cost within this of the best cost
    #[config(default = 1e-4)]
    pub fatol: f64,
    /// Objective evaluations allowed, checked between iterations
    #[config(default = 2000)]
    pub max_evaluations: usize,
    /// Simplex iterations allowed across all restarts
    #[config(default = 1000)]
    pub max_iterations: usize,
    /// Fresh simplices started from the best vertex after convergence
    #[config(default = 4)]
    pub max_restarts: usize,
    #[config(default = 1.0)]
    pub reflection: f64,
    #[config(default = 2.0)]
    pub expansion: f64,
    #[config(default = 0.5)]
    pub contraction: f64,
    #[config(default = 0.5)]
    pub shrink: f64,
}

impl NelderMeadConfig {
    /// Initialize the minimizer.
    pub fn init(&self) -> NelderMead {
        NelderMead::new(self.clone())
    }
}

/// Nelder-Mead minimizer.
#[derive(Debug, Clone)]
pub struct NelderMead {
    config: NelderMeadConfig,
    steps: Option<Vec<f64>>,
}

impl NelderMead {
    pub fn new(config: NelderMeadConfig) -> Self {
        Self {
            config,
            steps: None,
        }
    }

    /// Use a separate initial step per coordinate.
    ///
    /// Useful when coordinates live on different scales, such as radians next
    /// to voxel offsets.
    pub fn with_steps(mut self, steps: Vec<f64>) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn config(&self) -> &NelderMeadConfig {
        &self.config
    }

    fn steps_for(&self, dims: usize) -> error::Result<Vec<f64>> {
        let steps = match &self.steps {
            Some(steps) if steps.len() != dims => {
                return Err(RegistrationError::invalid_configuration(format!(
                    "{} initial steps given for {} parameters",
                    steps.len(),
                    dims
                )));
            }
            Some(steps) => steps.clone(),
            None => vec![self.config.initial_step; dims],
        };
        validate_steps(&steps)?;
        Ok(steps)
    }

    /// One simplex run from `start`, whose cost is already known.
    fn run(
        &self,
        evaluator: &mut Evaluator<'_>,
        start: &[f64],
        start_value: f64,
        steps: &[f64],
        max_iterations: usize,
    ) -> error::Result<SimplexRun> {
        let n = start.len();
        let cfg = &self.config;

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        simplex.push((start.to_vec(), start_value));
        for (i, step) in steps.iter().enumerate() {
            let mut vertex = start.to_vec();
            vertex[i] += step;
            let value = evaluator.eval(&vertex)?;
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        loop {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            if self.converged(&simplex) {
                return Ok(SimplexRun {
                    iterations,
                    status: ConvergenceStatus::Converged,
                });
            }
            if iterations >= max_iterations || evaluator.exhausted() {
                return Ok(SimplexRun {
                    iterations,
                    status: ConvergenceStatus::BudgetExhausted,
                });
            }
            iterations += 1;

            let centroid = centroid(&simplex[..n]);
            let worst = simplex[n].0.clone();
            let best_value = simplex[0].1;
            let second_worst_value = simplex[n - 1].1;
            let worst_value = simplex[n].1;

            let reflected = along(&centroid, &worst, -cfg.reflection);
            let reflected_value = evaluator.eval(&reflected)?;

            if reflected_value < best_value {
                let expanded = along(&centroid, &worst, -cfg.reflection * cfg.expansion);
                let expanded_value = evaluator.eval(&expanded)?;
                simplex[n] = if expanded_value < reflected_value {
                    (expanded, expanded_value)
                } else {
                    (reflected, reflected_value)
                };
                continue;
            }

            if reflected_value < second_worst_value {
                simplex[n] = (reflected, reflected_value);
                continue;
            }

            if reflected_value < worst_value {
                // outside contraction
                let contracted = along(&centroid, &worst, -cfg.reflection * cfg.contraction);
                let contracted_value = evaluator.eval(&contracted)?;
                if contracted_value <= reflected_value {
                    simplex[n] = (contracted, contracted_value);
                    continue;
                }
            } else {
                // inside contraction
                let contracted = along(&centroid, &worst, cfg.contraction);
                let contracted_value = evaluator.eval(&contracted)?;
                if contracted_value < worst_value {
                    simplex[n] = (contracted, contracted_value);
                    continue;
                }
            }

            // shrink towards the best vertex
            let best = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let shrunk: Vec<f64> = best
                    .iter()
                    .zip(&vertex.0)
                    .map(|(b, v)| b + cfg.shrink * (v - b))
                    .collect();
                let value = evaluator.eval(&shrunk)?;
                *vertex = (shrunk, value);
            }
        }
    }

    fn converged(&self, simplex: &[(Vec<f64>, f64)]) -> bool {
        let (best, best_value) = &simplex[0];
        simplex[1..].iter().all(|(vertex, value)| {
            let spread = vertex
                .iter()
                .zip(best)
                .map(|(v, b)| (v - b).abs())
                .fold(0.0, f64::max);
            // inf - inf is NaN, which never satisfies the tolerance
            spread <= self.config.xatol && (value - best_value).abs() <= self.config.fatol
        })
    }
}

impl Default for NelderMead {
    fn default() -> Self {
        Self::new(NelderMeadConfig::new())
    }
}

impl Minimizer for NelderMead {
    fn minimize(
        &mut self,
        objective: &mut dyn FnMut(&[f64]) -> error::Result<f64>,
        start: &[f64],
    ) -> error::Result<MinimizerOutcome> {
        validate_nelder_mead_config(&self.config)?;
        if start.is_empty() {
            return Err(RegistrationError::optimizer("cannot minimize over zero parameters"));
        }
        if start.iter().any(|v| !v.is_finite()) {
            return Err(RegistrationError::numerical_instability(format!(
                "starting point must be finite, got {:?}",
                start
            )));
        }
        let steps = self.steps_for(start.len())?;

        let mut evaluator = Evaluator::new(objective, self.config.max_evaluations);
        let start_value = evaluator.eval(start)?;

        let first = self.run(
            &mut evaluator,
            start,
            start_value,
            &steps,
            self.config.max_iterations,
        )?;
        let mut iterations = first.iterations;
        let mut status = first.status;
        let mut restarts = 0;

        while status == ConvergenceStatus::Converged
            && restarts < self.config.max_restarts
            && !evaluator.exhausted()
            && iterations < self.config.max_iterations
        {
            let from = evaluator.best.clone();
            let before = evaluator.best_value;
            restarts += 1;
            tracing::debug!(restart = restarts, value = before, "restarting simplex from best vertex");

            let run = self.run(
                &mut evaluator,
                &from,
                before,
                &steps,
                self.config.max_iterations - iterations,
            )?;
            iterations += run.iterations;

            // a restart that found nothing better leaves the converged result standing
            if evaluator.best_value >= before {
                break;
            }
            status = run.status;
        }

        Ok(MinimizerOutcome {
            best: evaluator.best,
            value: evaluator.best_value,
            evaluations: evaluator.evaluations,
            iterations,
            restarts,
            status,
        })
    }

    fn name(&self) -> &'static str {
        "NelderMead"
    }
}

struct SimplexRun {
    iterations: usize,
    status: ConvergenceStatus,
}

/// Counts evaluations and remembers the best point ever evaluated.
struct Evaluator<'a> {
    objective: &'a mut dyn FnMut(&[f64]) -> error::Result<f64>,
    max_evaluations: usize,
    evaluations: usize,
    best: Vec<f64>,
    best_value: f64,
}

impl<'a> Evaluator<'a> {
    fn new(objective: &'a mut dyn FnMut(&[f64]) -> error::Result<f64>, max_evaluations: usize) -> Self {
        Self {
            objective,
            max_evaluations,
            evaluations: 0,
            best: Vec::new(),
            best_value: f64::INFINITY,
        }
    }

    fn eval(&mut self, x: &[f64]) -> error::Result<f64> {
        self.evaluations += 1;
        let value = (self.objective)(x)?;
        let value = if value.is_nan() { f64::INFINITY } else { value };

        if value < self.best_value || self.best.is_empty() {
            self.best = x.to_vec();
            self.best_value = value;
        }
        Ok(value)
    }

    fn exhausted(&self) -> bool {
        self.evaluations >= self.max_evaluations
    }
}

fn centroid(vertices: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let n = vertices.len() as f64;
    let mut sum = vec![0.0; vertices[0].0.len()];
    for (vertex, _) in vertices {
        for (s, v) in sum.iter_mut().zip(vertex) {
            *s += v;
        }
    }
    sum.into_iter().map(|s| s / n).collect()
}

/// `centroid + t * (worst - centroid)`.
fn along(centroid: &[f64], worst: &[f64], t: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(worst)
        .map(|(c, w)| c + t * (w - c))
        .collect()
}
