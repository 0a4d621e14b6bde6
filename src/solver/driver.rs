//! Run-to-tolerance driver around [`IterativeSolver`].
//!
//! The engine only steps; this is the caller-side loop that decides when to
//! stop, caps the iteration count and reports progress.

use log::{debug, info, warn};
use num_traits::Float;

use crate::config::options::{CgOptions, DEFAULT_LAG};
use crate::core::traits::{InnerProduct, MatVec};
use crate::core::wrappers::Euclidean;
use crate::error::CgError;
use crate::preconditioner::{Identity, Preconditioner};
use crate::solver::cg::IterativeSolver;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats, StopCriterion};

pub struct CgSolver<T, I = Euclidean> {
    pub conv: Convergence<T>,
    pub lag: usize,
    pub permissive: bool,
    pub inner_product: I,
    pub monitor: Option<Box<dyn FnMut(usize, T, T)>>,
    /// Proxy error after every step, across solves until `clear_history`.
    pub error_history: Vec<T>,
}

impl<T: Copy + Float> CgSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self {
            conv: Convergence::new(tol, max_iters),
            lag: DEFAULT_LAG,
            permissive: false,
            inner_product: Euclidean,
            monitor: None,
            error_history: Vec::new(),
        }
    }

    pub fn from_options(opts: &CgOptions) -> Self
    where
        T: From<f64>,
    {
        Self::new(<T as From<f64>>::from(opts.tol), opts.max_iters)
            .with_criterion(opts.criterion)
            .with_lag(opts.lag)
            .with_permissive(opts.permissive)
    }
}

impl<T: Copy + Float, I> CgSolver<T, I> {
    pub fn with_criterion(mut self, criterion: StopCriterion) -> Self {
        self.conv.criterion = criterion;
        self
    }
    pub fn with_lag(mut self, lag: usize) -> Self {
        self.lag = lag;
        self
    }
    pub fn with_permissive(mut self, flag: bool) -> Self {
        self.permissive = flag;
        self
    }
    /// Swap the inner product, e.g. for a [`crate::CommInnerProduct`] over distributed vectors.
    pub fn with_inner_product<J>(self, inner_product: J) -> CgSolver<T, J> {
        CgSolver {
            conv: self.conv,
            lag: self.lag,
            permissive: self.permissive,
            inner_product,
            monitor: self.monitor,
            error_history: self.error_history,
        }
    }
    /// `f(i, err, err_true)` after every step.
    pub fn with_monitor<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, T, T) + 'static,
    {
        self.monitor = Some(Box::new(f));
        self
    }
    pub fn clear_history(&mut self) {
        self.error_history.clear();
    }
}

/// Lets a `&dyn Preconditioner<M, V>` serve an engine whose operator is `&M`.
struct BorrowedPc<'p, M, V>(&'p dyn Preconditioner<M, V>);

impl<'p, 'm, M, V> Preconditioner<&'m M, V> for BorrowedPc<'p, M, V> {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        self.0.apply(r, z)
    }
}

/// `b - A x == 0` entrywise.
fn residual_vanishes<M, V, T>(a: &M, b: &V, x: &V) -> bool
where
    M: MatVec<V>,
    V: AsRef<[T]> + From<Vec<T>>,
    T: Float,
{
    let mut ax = V::from(vec![T::zero(); b.as_ref().len()]);
    a.matvec(x, &mut ax);
    ax.as_ref().len() == b.as_ref().len()
        && b.as_ref().iter().zip(ax.as_ref()).all(|(&bi, &axi)| bi - axi == T::zero())
}

fn as_f64<T: Float>(v: T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

impl<M, V, T, I> LinearSolver<M, V> for CgSolver<T, I>
where
    M: MatVec<V>,
    I: InnerProduct<V, Scalar = T>,
    V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    T: Float + From<f64>,
{
    type Error = CgError;
    type Scalar = T;

    /// If a step fails, the last completed iterate is written into `x` before the error is returned.
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<T>, CgError> {
        let identity = Identity;
        let pc = BorrowedPc(pc.unwrap_or(&identity));
        let opts = CgOptions { lag: self.lag, permissive: self.permissive, ..CgOptions::default() };
        let started =
            IterativeSolver::with_options(a, b, Some(x.clone()), pc, &self.inner_product, &opts);
        let mut cg = match started {
            Ok(cg) => cg,
            // rz0 == 0 only means r0 == 0 when M and the inner product are definite.
            Err(CgError::DegenerateSystem) if residual_vanishes::<M, V, T>(a, b, &*x) => {
                info!("cg: initial residual vanishes, nothing to solve");
                return Ok(SolveStats {
                    iterations: 0,
                    final_error: T::zero(),
                    true_error: None,
                    converged: true,
                });
            }
            Err(CgError::DegenerateSystem) => {
                warn!("cg: <r0, M r0> vanishes for a nonzero residual");
                return Err(CgError::DegenerateSystem);
            }
            Err(e) => return Err(e),
        };
        debug!(
            "cg: n = {}, tol = {:e}, max_iters = {}, criterion = {:?}, lag = {}",
            b.as_ref().len(),
            as_f64(self.conv.tol),
            self.conv.max_iters,
            self.conv.criterion,
            self.lag
        );

        let mut stats = SolveStats { iterations: 0, final_error: cg.err(), true_error: None, converged: false };
        for _ in 0..self.conv.max_iters {
            if let Err(e) = cg.step() {
                warn!("cg: {} (proxy error {:e})", e, as_f64(cg.err()));
                *x = cg.x().clone();
                return Err(e);
            }
            let (err, err_true) = (cg.err(), cg.err_true());
            self.error_history.push(err);
            if let Some(ref mut monitor) = self.monitor {
                monitor(cg.i(), err, err_true);
            }
            let (stop, s) = self.conv.check(err, err_true, cg.i());
            stats = s;
            if stop {
                break;
            }
        }
        if stats.converged {
            info!("cg: converged in {} iterations, err = {:e}", stats.iterations, as_f64(stats.final_error));
        } else {
            warn!(
                "cg: no convergence after {} iterations, err = {:e}",
                stats.iterations,
                as_f64(stats.final_error)
            );
        }
        *x = cg.into_solution();
        Ok(stats)
    }
}
