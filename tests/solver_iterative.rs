//! Tests for the CG engine and driver against direct solves on random SPD systems.
//!
//! This module checks that the run-to-tolerance driver matches a faer LU solve, that the
//! step-driven engine reaches the exact solution in n steps, and that the lagged error
//! estimate tracks the true A-norm error of the iterate d steps back.

use approx::assert_abs_diff_eq;
use distcg::core::traits::{InnerProduct, MatVec};
use distcg::solver::{CgSolver, IterativeSolver, LinearSolver};
use distcg::{FnPreconditioner, StopCriterion, DEFAULT_LAG, Euclidean};
use faer::Mat;
use faer::linalg::solvers::SolveCore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Helper function to generate a random symmetric positive definite (SPD) matrix `A` and a random right-hand side `b`.
///
/// The SPD matrix is constructed as `A = Mᵀ M + I`, where `M` is a random matrix and `I` is the identity.
fn random_spd(n: usize, seed: u64) -> (faer::Mat<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<f64> = (0..n*n).map(|_| rng.r#gen()).collect();
    let m = Mat::from_fn(n, n, |i, j| data[j * n + i]);
    let m_t = m.transpose();
    let a = &m_t * &m + Mat::<f64>::identity(n, n);
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    (a, b)
}

/// Route the solver's log output through the test harness, down to per-step traces.
fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

fn direct_solve(a: &Mat<f64>, b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut x_direct = b.to_vec();
    let lus = faer::linalg::solvers::FullPivLu::new(a.as_ref());
    let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x_direct, n, 1);
    lus.solve_in_place_with_conj(faer::Conj::No, x_mat);
    x_direct
}

/// Squared A-norm of `u - v`.
fn energy_sq(a: &Mat<f64>, u: &[f64], v: &[f64]) -> f64 {
    let e: Vec<f64> = u.iter().zip(v).map(|(ui, vi)| ui - vi).collect();
    let mut ae = vec![0.0; e.len()];
    a.matvec(&e, &mut ae);
    Euclidean.dot(&e, &ae)
}

/// The driver agrees with a direct LU solve on a random SPD system.
#[test]
fn cg_vs_direct_on_spd() {
    init_logger();
    let n = 10;
    let (a, b) = random_spd(n, 1);
    let mut x_cg = vec![0.0; n];
    let mut solver = CgSolver::new(1e-20, 1000);
    let stats = solver.solve(&a, None, &b, &mut x_cg).unwrap();
    assert!(stats.converged);
    let x_direct = direct_solve(&a, &b);
    for i in 0..n {
        assert_abs_diff_eq!(x_cg[i], x_direct[i], epsilon = 1e-6);
    }
}

/// After n steps the recursive residual of an n-dimensional SPD system is numerically zero.
#[test]
fn engine_is_exact_after_n_steps() {
    init_logger();
    for seed in 0..4 {
        let n = 8;
        let (a, b) = random_spd(n, 100 + seed);
        let mut cg = IterativeSolver::new(&a, &b).unwrap();
        for _ in 0..n {
            cg.step().unwrap();
        }
        let rel = Euclidean.norm(cg.r()) / Euclidean.norm(&b);
        assert!(rel < 1e-6, "seed {}: relative residual {}", seed, rel);
        let x_direct = direct_solve(&a, &b);
        for (xi, di) in cg.x().iter().zip(&x_direct) {
            assert_abs_diff_eq!(*xi, *di, epsilon = 1e-5);
        }
    }
}

/// Default preconditioner and an explicit copy function give the same iterates.
#[test]
fn identity_preconditioner_equivalence() {
    let n = 12;
    let (a, b) = random_spd(n, 5);
    let x0: Vec<f64> = (0..n).map(|i| 0.1 * i as f64).collect();
    let copy = FnPreconditioner(|r: &Vec<f64>, z: &mut Vec<f64>| z.clone_from(r));
    let mut default = IterativeSolver::with_x0(&a, &b, x0.clone()).unwrap();
    let mut explicit = IterativeSolver::with_parts(&a, &b, Some(x0), copy, Euclidean).unwrap();
    for _ in 0..6 {
        default.step().unwrap();
        explicit.step().unwrap();
        assert_eq!(default.i(), explicit.i());
        assert_abs_diff_eq!(default.err(), explicit.err(), epsilon = 1e-12);
        for (u, v) in default.x().iter().zip(explicit.x()) {
            assert_abs_diff_eq!(*u, *v, epsilon = 1e-12);
        }
    }
}

/// `err_true` after step k estimates the squared A-norm error of iterate k - d;
/// it is a lower bound that becomes tight as the later steps close the gap.
#[test]
fn lagged_estimate_tracks_energy_error() {
    init_logger();
    let n = 30;
    let (a, b) = random_spd(n, 9);
    let x_star = direct_solve(&a, &b);
    let scale = energy_sq(&a, &x_star, &vec![0.0; n]);
    let mut cg = IterativeSolver::new(&a, &b).unwrap();
    let mut iterates = vec![cg.x().clone()];
    for k in 1..=12 {
        cg.step().unwrap();
        iterates.push(cg.x().clone());
        if k <= DEFAULT_LAG {
            assert!(cg.err_true().is_infinite());
            continue;
        }
        let past = &iterates[k - DEFAULT_LAG];
        let actual = energy_sq(&a, &x_star, past);
        let estimate = cg.err_true();
        assert!(estimate > 0.0);
        assert!(estimate <= actual + 1e-10 * scale, "k = {}: {} > {}", k, estimate, actual);
        let window: f64 = cg.arz()[k - DEFAULT_LAG..].iter().sum();
        assert_abs_diff_eq!(estimate, window, epsilon = 1e-15 * window.max(1.0));
    }
}

/// The proxy error of the 2x2 reference system falls below 1e-4 within ten steps.
#[test]
fn reference_two_by_two_system() {
    let a = Mat::from_fn(2, 2, |i, j| [[4.0, 1.0], [1.0, 3.0]][i][j]);
    let b = vec![1.0, 2.0];
    let mut cg = IterativeSolver::with_x0(&a, &b, vec![2.0, 1.0]).unwrap();
    while cg.err() > 1e-4 {
        assert!(cg.i() < 10);
        cg.step().unwrap();
    }
    let mut ax = vec![0.0; 2];
    a.matvec(cg.x(), &mut ax);
    for (ai, bi) in ax.iter().zip(&b) {
        assert_abs_diff_eq!(*ai, *bi, epsilon = 1e-4);
    }
}

/// Stopping on the lagged estimate leaves a small true A-norm error.
#[test]
fn true_error_criterion_vs_proxy() {
    init_logger();
    let n = 20;
    let (a, b) = random_spd(n, 21);
    let x_star = direct_solve(&a, &b);
    let mut x_proxy = vec![0.0; n];
    let mut x_true = vec![0.0; n];
    let s_proxy = CgSolver::new(1e-12, 500).solve(&a, None, &b, &mut x_proxy).unwrap();
    let s_true = CgSolver::new(1e-12, 500)
        .with_criterion(StopCriterion::TrueError)
        .solve(&a, None, &b, &mut x_true)
        .unwrap();
    assert!(s_proxy.converged && s_true.converged);
    assert!(s_true.iterations > DEFAULT_LAG);
    assert!(s_true.true_error.unwrap() <= 1e-12);
    assert!(energy_sq(&a, &x_star, &x_true) <= 1e-10);
}
