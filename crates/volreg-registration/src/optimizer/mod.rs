//! Optimizer module for parameter search.
//!
//! Registration costs have no useful gradient under nearest-neighbour
//! resampling, so the search is derivative-free.
//!
//! # Examples
//!
//! ```rust
//! use volreg_registration::optimizer::{NelderMead, NelderMeadConfig};
//!
//! let minimizer: NelderMead = NelderMeadConfig::new()
//!     .with_max_evaluations(500)
//!     .init();
//! assert_eq!(minimizer.config().max_evaluations, 500);
//! ```

pub mod trait_;
pub mod nelder_mead;

pub use trait_::{ConvergenceStatus, Minimizer, MinimizerOutcome};
pub use nelder_mead::{NelderMead, NelderMeadConfig};
