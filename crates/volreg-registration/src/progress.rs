//! Progress tracking and observers for registration runs.
//!
//! Every objective evaluation is reported to the attached observers with the
//! trial parameters and the raw overlap count behind its cost. Observers are
//! advisory: they cannot stop or steer the search.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use volreg_core::ParameterVector;

use crate::registration::RegistrationOutcome;

/// One objective evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationInfo {
    /// 1-based evaluation number.
    pub evaluation: usize,
    /// Trial parameters.
    pub params: ParameterVector,
    /// Cost handed to the minimizer (`+inf` for penalized trials).
    pub cost: f64,
    /// Overlap count behind the cost; `None` when the trial was penalized.
    pub overlap: Option<usize>,
    /// Time since the run started.
    pub elapsed: Duration,
}

impl EvaluationInfo {
    /// True when the trial transform was singular and scored as worst cost.
    pub fn penalized(&self) -> bool {
        self.overlap.is_none()
    }
}

/// Observer trait for monitoring registration progress.
pub trait EvaluationObserver: Send + Sync {
    /// Called after every objective evaluation.
    fn on_evaluation(&self, info: &EvaluationInfo);

    /// Called when registration starts.
    fn on_start(&self, _start: &ParameterVector) {}

    /// Called when registration completes successfully.
    fn on_complete(&self, _outcome: &RegistrationOutcome) {}
}

/// Observer that logs through `tracing`.
///
/// Evaluations are logged at debug level every `log_interval` evaluations.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Log interval (evaluations).
    pub log_interval: usize,
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self { log_interval: 1 }
    }
}

impl TracingObserver {
    /// Create a new tracing observer.
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
        }
    }
}

impl EvaluationObserver for TracingObserver {
    fn on_evaluation(&self, info: &EvaluationInfo) {
        if info.evaluation % self.log_interval != 0 {
            return;
        }
        match info.overlap {
            Some(overlap) => tracing::debug!(
                evaluation = info.evaluation,
                overlap,
                cost = info.cost,
                "params {}",
                info.params
            ),
            None => tracing::debug!(
                evaluation = info.evaluation,
                "params {} penalized (singular transform)",
                info.params
            ),
        }
    }
}

/// Observer that records every evaluation.
#[derive(Debug, Clone, Default)]
pub struct HistoryObserver {
    history: Arc<Mutex<Vec<EvaluationInfo>>>,
}

impl HistoryObserver {
    /// Create a new history observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded history.
    pub fn history(&self) -> Vec<EvaluationInfo> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clear the history.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EvaluationInfo>> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EvaluationObserver for HistoryObserver {
    fn on_evaluation(&self, info: &EvaluationInfo) {
        self.lock().push(info.clone());
    }
}

/// Set of observers notified together.
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn EvaluationObserver>>,
    start_time: Option<Instant>,
}

impl ObserverSet {
    /// Create an empty observer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer.
    pub fn add(&mut self, observer: Arc<dyn EvaluationObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Start the clock and notify observers.
    pub fn start(&mut self, start: &ParameterVector) {
        self.start_time = Some(Instant::now());
        for observer in &self.observers {
            observer.on_start(start);
        }
    }

    /// Report one evaluation.
    pub fn evaluation(
        &self,
        evaluation: usize,
        params: ParameterVector,
        cost: f64,
        overlap: Option<usize>,
    ) {
        if self.observers.is_empty() {
            return;
        }
        let info = EvaluationInfo {
            evaluation,
            params,
            cost,
            overlap,
            elapsed: self.elapsed(),
        };
        for observer in &self.observers {
            observer.on_evaluation(&info);
        }
    }

    /// Report the finished run.
    pub fn complete(&self, outcome: &RegistrationOutcome) {
        for observer in &self.observers {
            observer.on_complete(outcome);
        }
    }

    /// Time since [`start`](Self::start), zero before it.
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observers", &self.observers.len())
            .field("start_time", &self.start_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_observer() {
        let history = Arc::new(HistoryObserver::new());
        let mut set = ObserverSet::new();
        set.add(history.clone());
        set.start(&ParameterVector::IDENTITY);

        set.evaluation(1, ParameterVector::IDENTITY, -3.0, Some(9));
        set.evaluation(2, ParameterVector::from_translation([1.0, 0.0, 0.0]), f64::INFINITY, None);

        let recorded = history.history();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].evaluation, 1);
        assert_eq!(recorded[0].overlap, Some(9));
        assert!(!recorded[0].penalized());
        assert!(recorded[1].penalized());
        assert_eq!(recorded[1].params.translation(), [1.0, 0.0, 0.0]);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_tracing_observer_interval() {
        assert_eq!(TracingObserver::new(0).log_interval, 1);
        let observer = TracingObserver::new(10);
        // logging without a subscriber is a no-op
        observer.on_evaluation(&EvaluationInfo {
            evaluation: 10,
            params: ParameterVector::IDENTITY,
            cost: -1.0,
            overlap: Some(1),
            elapsed: Duration::ZERO,
        });
    }

    #[test]
    fn test_elapsed_before_start() {
        let set = ObserverSet::new();
        assert_eq!(set.elapsed(), Duration::ZERO);
        assert!(set.is_empty());
    }
}
