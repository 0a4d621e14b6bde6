//! API options for the CG engine and its driver.
//!
//! This module provides the `CgOptions` struct, which collects every knob the
//! engine and the driver read: the error-estimation lag, permissive handling of
//! breakdowns, and the driver's stopping rule.

use crate::utils::convergence::StopCriterion;

/// Steps summed into the delayed true-error estimate.
pub const DEFAULT_LAG: usize = 4;

/// Solver options & parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CgOptions {
    /// Window d of the lagged error estimate; fixed once the engine is built
    pub lag: usize,

    /// Carry NaN/Inf through vanishing denominators instead of failing
    pub permissive: bool,

    /// Tolerance on the error estimate chosen by `criterion`
    pub tol: f64,

    /// Hard cap on driver iterations
    pub max_iters: usize,

    pub criterion: StopCriterion,
}

impl Default for CgOptions {
    fn default() -> Self {
        Self {
            lag: DEFAULT_LAG,
            permissive: false,
            tol: 1e-8,
            max_iters: 1000,
            criterion: StopCriterion::Proxy,
        }
    }
}
