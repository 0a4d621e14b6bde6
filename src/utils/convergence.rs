//! Convergence tracking & tolerance checks for the CG driver.

/// Which error estimate the driver compares against the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopCriterion {
    /// Stop once the proxy `err = rz / rz0` is below `tol`. Cheap and available
    /// from the first step, but optimistic.
    #[default]
    Proxy,
    /// Stop once the lagged energy-norm estimate `err_true` is below `tol`.
    /// Never fires during the first `d` steps.
    TrueError,
    /// Stop on whichever of the two fires first.
    Either,
}

/// Stopping criteria & stats.
#[derive(Debug, Clone)]
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
    pub criterion: StopCriterion,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveStats<T> {
    pub iterations: usize,
    /// Proxy error after the last step.
    pub final_error: T,
    /// Lagged true-error estimate, `None` until more than `d` steps ran.
    pub true_error: Option<T>,
    pub converged: bool,
}

impl<T: Copy + num_traits::Float> Convergence<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { tol, max_iters, criterion: StopCriterion::Proxy }
    }

    /// Whether the configured criterion holds for the given estimates.
    pub fn is_satisfied(&self, err: T, err_true: T) -> bool {
        match self.criterion {
            StopCriterion::Proxy => err <= self.tol,
            StopCriterion::TrueError => err_true <= self.tol,
            StopCriterion::Either => err <= self.tol || err_true <= self.tol,
        }
    }

    /// Returns (should_stop, stats) given the estimates after iteration `i`.
    pub fn check(&self, err: T, err_true: T, i: usize) -> (bool, SolveStats<T>) {
        let converged = self.is_satisfied(err, err_true);
        (
            converged || i >= self.max_iters,
            SolveStats {
                iterations: i,
                final_error: err,
                true_error: err_true.is_finite().then_some(err_true),
                converged,
            },
        )
    }
}
