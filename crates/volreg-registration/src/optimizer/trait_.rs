//! Minimizer trait for derivative-free parameter search.
//!
//! This module defines the core Minimizer trait that search algorithms
//! implement, together with the outcome they report.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Minimizer trait for derivative-free optimization.
///
/// A minimizer only sees the objective as a black box from a parameter slice
/// to a scalar cost. Objective errors abort the search and are returned
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use volreg_registration::optimizer::{Minimizer, NelderMead, NelderMeadConfig};
///
/// let mut minimizer = NelderMead::new(NelderMeadConfig::new().with_initial_step(0.5));
/// let mut objective = |x: &[f64]| -> volreg_registration::Result<f64> {
///     Ok((x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2))
/// };
/// let outcome = minimizer.minimize(&mut objective, &[0.0, 0.0]).unwrap();
/// assert!((outcome.best[0] - 3.0).abs() < 1e-2);
/// ```
pub trait Minimizer {
    /// Minimize `objective` starting from `start`.
    ///
    /// # Arguments
    /// * `objective` - Cost of a parameter slice; lower is better
    /// * `start` - Initial parameters
    ///
    /// # Returns
    /// The best parameters seen and how the search ended
    fn minimize(
        &mut self,
        objective: &mut dyn FnMut(&[f64]) -> Result<f64>,
        start: &[f64],
    ) -> Result<MinimizerOutcome>;

    /// Get the name of this minimizer.
    fn name(&self) -> &'static str;
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// Tolerances were met.
    Converged,
    /// The evaluation or iteration budget ran out first; the best point so far
    /// is still reported.
    BudgetExhausted,
}

/// Result of a minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerOutcome {
    /// Lowest-cost parameters evaluated.
    pub best: Vec<f64>,
    /// Cost at `best`.
    pub value: f64,
    /// Objective evaluations performed.
    pub evaluations: usize,
    /// Simplex iterations performed, across restarts.
    pub iterations: usize,
    /// Restarts performed after the first run.
    pub restarts: usize,
    pub status: ConvergenceStatus,
}

impl MinimizerOutcome {
    pub fn converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }
}
