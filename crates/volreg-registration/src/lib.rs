//! Derivative-free rigid registration of boolean volumes.
//!
//! A moving volume is aligned to a fixed reference by searching the nine
//! parameters of a centred rotation, translation and anisotropic scaling.
//! Each trial resamples the moving volume and scores its overlap with the
//! reference; a restarted Nelder-Mead search minimizes that score.

pub mod error;
pub mod metric;
pub mod optimizer;
pub mod progress;
pub mod registration;
pub mod validation;

pub use error::{RegistrationError, Result};
pub use metric::{similarity_cost, Metric, MetricValue, OverlapMetric};
pub use optimizer::{ConvergenceStatus, Minimizer, NelderMead, NelderMeadConfig};
pub use progress::{EvaluationInfo, EvaluationObserver, HistoryObserver, ObserverSet, TracingObserver};
pub use registration::{
    register, register_with, Registration, RegistrationConfig, RegistrationOutcome,
    SingularTrialPolicy,
};
