//! Step-driven preconditioned Conjugate Gradient per Saad §9.2, with the
//! lagged energy-norm error estimate of Strakoš & Tichý (ETNA 13, 2002).
//!
//! The engine advances one iteration per [`IterativeSolver::step`] and never
//! decides to stop: the caller inspects [`err`](IterativeSolver::err) or
//! [`err_true`](IterativeSolver::err_true) after each step.
//!
//! `err` is `‖r_i‖²_{M⁻¹} / ‖r_0‖²_{M⁻¹}`, available at once but optimistic.
//! `err_true` is `Σ_{j=i-d+1..i} α_j ⟨r_{j-1}, z_{j-1}⟩`, an estimate of the
//! squared A-norm error of the iterate `d` steps in the past. It stays `+∞`
//! until more than `d` steps have run.

use log::trace;
use num_traits::Float;

use crate::config::options::CgOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::core::wrappers::Euclidean;
use crate::error::{check_len, BreakdownKind, CgError};
use crate::preconditioner::{Identity, Preconditioner};

/// Everything one CG run mutates. Only the owning [`IterativeSolver`] writes it.
#[derive(Debug, Clone)]
pub struct SolverState<V, T> {
    /// Current solution estimate.
    pub x: V,
    /// Residual `b - A x`, updated by recurrence.
    pub r: V,
    /// Preconditioned residual `M⁻¹ r`.
    pub z: V,
    /// Search direction.
    pub p: V,
    /// `⟨r, z⟩`.
    pub rz: T,
    /// `⟨r, z⟩` at construction.
    pub rz0: T,
    /// `α_j ⟨r_{j-1}, z_{j-1}⟩` per completed step; `arz.len() == i`.
    pub arz: Vec<T>,
    pub err: T,
    pub err_true: T,
    /// Completed iterations.
    pub i: usize,
    /// Lag of the true-error window.
    pub d: usize,
}

/// Preconditioned CG engine over pluggable operator `A`, preconditioner `P`
/// and inner product `I`.
pub struct IterativeSolver<A, V, T, P = Identity, I = Euclidean> {
    a: A,
    pc: P,
    ip: I,
    state: SolverState<V, T>,
    permissive: bool,
}

impl<A, V, T> IterativeSolver<A, V, T, Identity, Euclidean>
where
    A: MatVec<V>,
    Euclidean: InnerProduct<V, Scalar = T>,
    V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    T: Float + From<f64>,
{
    /// Unpreconditioned, Euclidean CG starting from `x0 = 0`.
    pub fn new(a: A, b: &V) -> Result<Self, CgError> {
        Self::with_parts(a, b, None, Identity, Euclidean)
    }

    /// Unpreconditioned, Euclidean CG starting from `x0`.
    pub fn with_x0(a: A, b: &V, x0: V) -> Result<Self, CgError> {
        Self::with_parts(a, b, Some(x0), Identity, Euclidean)
    }
}

impl<A, V, T, P, I> IterativeSolver<A, V, T, P, I>
where
    A: MatVec<V>,
    P: Preconditioner<A, V>,
    I: InnerProduct<V, Scalar = T>,
    V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>> + Clone,
    T: Float + From<f64>,
{
    /// Builds the engine with the default lag and strict breakdown handling.
    pub fn with_parts(a: A, b: &V, x0: Option<V>, pc: P, ip: I) -> Result<Self, CgError> {
        Self::with_options(a, b, x0, pc, ip, &CgOptions::default())
    }

    /// Builds the engine. Only `opts.lag` and `opts.permissive` are read here.
    ///
    /// # Errors
    /// * `InvalidOption` for a lag of 0.
    /// * `ShapeMismatch` if `x0`, `A x0` or `M r` differ in length from `b`.
    /// * `DegenerateSystem` if `⟨r_0, z_0⟩ == 0` and `opts.permissive` is off.
    pub fn with_options(
        a: A,
        b: &V,
        x0: Option<V>,
        pc: P,
        ip: I,
        opts: &CgOptions,
    ) -> Result<Self, CgError> {
        if opts.lag == 0 {
            return Err(CgError::InvalidOption("lag must be at least 1"));
        }
        let n = b.as_ref().len();
        let x = match x0 {
            Some(x0) => x0,
            None => V::from(vec![T::zero(); n]),
        };
        check_len("initial guess", n, x.as_ref().len())?;

        let mut ax = V::from(vec![T::zero(); n]);
        a.matvec(&x, &mut ax);
        check_len("operator output", n, ax.as_ref().len())?;
        let r = V::from(
            b.as_ref()
                .iter()
                .zip(ax.as_ref())
                .map(|(&bi, &axi)| bi - axi)
                .collect::<Vec<_>>(),
        );

        let mut z = V::from(vec![T::zero(); n]);
        pc.apply(&r, &mut z)?;
        check_len("preconditioner output", n, z.as_ref().len())?;

        let rz = ip.dot(&r, &z);
        if rz == T::zero() && !opts.permissive {
            return Err(CgError::DegenerateSystem);
        }
        let p = z.clone();
        Ok(Self {
            a,
            pc,
            ip,
            state: SolverState {
                x,
                r,
                z,
                p,
                rz,
                rz0: rz,
                arz: Vec::new(),
                err: T::infinity(),
                err_true: T::infinity(),
                i: 0,
                d: opts.lag,
            },
            permissive: opts.permissive,
        })
    }

    /// Advance one CG iteration.
    ///
    /// Every error is returned before any state is touched, so the current `x`
    /// is still the last completed iterate. A vanishing `⟨p, A p⟩` or `⟨r, z⟩`
    /// gives `Breakdown`; a failing or resizing operator or preconditioner gives
    /// its own error or `ShapeMismatch`.
    pub fn step(&mut self) -> Result<(), CgError> {
        let s = &mut self.state;
        let n = s.x.as_ref().len();

        let mut ap = V::from(vec![T::zero(); n]);
        self.a.matvec(&s.p, &mut ap);
        check_len("operator output", n, ap.as_ref().len())?;

        let p_ap = self.ip.dot(&s.p, &ap);
        if !self.permissive {
            let kind = if p_ap == T::zero() {
                Some(BreakdownKind::StepLength)
            } else if s.rz == T::zero() {
                Some(BreakdownKind::ConjugacyCoefficient)
            } else {
                None
            };
            if let Some(kind) = kind {
                return Err(CgError::Breakdown { iteration: s.i + 1, kind });
            }
        }
        let alpha = s.rz / p_ap;

        // The new residual and its preconditioned image are built aside and
        // committed together with x once the preconditioner has succeeded.
        let mut r_next = s.r.clone();
        for (rj, &apj) in r_next.as_mut().iter_mut().zip(ap.as_ref()) {
            *rj = *rj - alpha * apj;
        }
        let mut z_next = V::from(vec![T::zero(); n]);
        self.pc.apply(&r_next, &mut z_next)?;
        check_len("preconditioner output", n, z_next.as_ref().len())?;

        for (xj, &pj) in s.x.as_mut().iter_mut().zip(s.p.as_ref()) {
            *xj = *xj + alpha * pj;
        }
        s.r = r_next;
        s.z = z_next;

        let next_rz = self.ip.dot(&s.r, &s.z);
        s.err = next_rz / s.rz0;
        let rz_old = s.rz;
        let beta = next_rz / rz_old;
        s.rz = next_rz;
        for (pj, &zj) in s.p.as_mut().iter_mut().zip(s.z.as_ref()) {
            *pj = zj + beta * *pj;
        }

        s.arz.push(rz_old * alpha);
        if s.arz.len() > s.d {
            s.err_true = s.arz[s.arz.len() - s.d..]
                .iter()
                .fold(T::zero(), |acc, &v| acc + v);
        }
        s.i += 1;
        trace!(
            "cg step {}: alpha = {:e}, beta = {:e}, err = {:e}, err_true = {:e}",
            s.i,
            alpha.to_f64().unwrap_or(f64::NAN),
            beta.to_f64().unwrap_or(f64::NAN),
            s.err.to_f64().unwrap_or(f64::NAN),
            s.err_true.to_f64().unwrap_or(f64::NAN)
        );
        Ok(())
    }

    /// Current solution estimate.
    pub fn x(&self) -> &V {
        &self.state.x
    }

    /// Current residual.
    pub fn r(&self) -> &V {
        &self.state.r
    }

    pub fn z(&self) -> &V {
        &self.state.z
    }

    pub fn p(&self) -> &V {
        &self.state.p
    }

    /// Proxy relative error; `+∞` before the first step.
    pub fn err(&self) -> T {
        self.state.err
    }

    /// Squared A-norm error estimate for iterate `i - d`; `+∞` while `i <= d`.
    pub fn err_true(&self) -> T {
        self.state.err_true
    }

    /// `sqrt(err_true)`: the energy-norm error itself rather than its square.
    pub fn err_true_sqrt(&self) -> T {
        self.state.err_true.sqrt()
    }

    /// Completed iterations.
    pub fn i(&self) -> usize {
        self.state.i
    }

    pub fn iterations(&self) -> usize {
        self.state.i
    }

    pub fn rz(&self) -> T {
        self.state.rz
    }

    pub fn rz0(&self) -> T {
        self.state.rz0
    }

    pub fn arz(&self) -> &[T] {
        &self.state.arz
    }

    pub fn lag(&self) -> usize {
        self.state.d
    }

    pub fn is_permissive(&self) -> bool {
        self.permissive
    }

    pub fn state(&self) -> &SolverState<V, T> {
        &self.state
    }

    /// Discard the engine, keeping the solution.
    pub fn into_solution(self) -> V {
        self.state.x
    }
}
