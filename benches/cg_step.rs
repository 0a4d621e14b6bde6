use criterion::{black_box, Criterion, criterion_group, criterion_main};
use distcg::solver::{CgSolver, IterativeSolver, LinearSolver};
use faer::Mat;

fn laplacian(n: usize) -> Mat<f64> {
    Mat::from_fn(n, n, |i, j| {
        if i == j {
            2.01
        } else if i.abs_diff(j) == 1 {
            -1.0
        } else {
            0.0
        }
    })
}

fn bench_cg(c: &mut Criterion) {
    let n = 200;
    let a = laplacian(n);
    let b: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();

    c.bench_function("cg 50 steps", |ben| {
        ben.iter(|| {
            let mut cg = IterativeSolver::new(black_box(&a), black_box(&b)).unwrap();
            for _ in 0..50 {
                cg.step().unwrap();
            }
            cg.err_true()
        })
    });

    c.bench_function("cg driver to 1e-10", |ben| {
        let mut solver = CgSolver::new(1e-10, 1000);
        ben.iter(|| {
            let mut x = vec![0.0; n];
            let _stats = solver.solve(black_box(&a), None, black_box(&b), &mut x).unwrap();
            solver.clear_history();
        })
    });
}

criterion_group!(benches, bench_cg);
criterion_main!(benches);
