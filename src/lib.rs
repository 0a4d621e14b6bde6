//! distcg: step-driven preconditioned Conjugate Gradient for distributed vectors
//!
//! The operator, the preconditioner and the inner product are supplied by the caller, so a
//! "vector" may be one rank's share of a map and the inner product a global reduction.
//! [`IterativeSolver`] advances one iteration per `step()` and reports a fast proxy error
//! and a lagged, more trustworthy energy-norm estimate; [`CgSolver`] runs it to tolerance.

pub mod parallel;

pub mod config;
pub mod core;
pub mod error;
pub mod preconditioner;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use self::core::*;
pub use error::*;
pub use preconditioner::*;
pub use solver::*;
pub use utils::*;
