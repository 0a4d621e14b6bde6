//! Stock collaborators for the CG engine.
//!
//! This module provides implementations of the core traits for `faer::Mat`, `faer::MatRef`, and `Vec<T>`,
//! plus adapters turning bare closures into operators and inner products, and a communicator-backed
//! inner product for vectors split across processes.
//!
//! # Features
//! - Matrix-vector multiplication for `faer` dense matrices.
//! - The Euclidean inner product, with optional Rayon parallelism.
//! - `CommInnerProduct`: local dot product followed by an all-reduce over a [`Comm`].
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-traits crate documentation](https://docs.rs/num-traits)

use std::marker::PhantomData;

use crate::core::traits::{Indexing, InnerProduct, MatVec};
use crate::parallel::Comm;
use faer::{Mat, MatRef};
use num_traits::Float;

/// Implements matrix-vector multiplication for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl<T: Float> MatVec<Vec<T>> for Mat<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        self.as_ref().matvec(x, y)
    }
}

/// Implements matrix-vector multiplication for a matrix reference (`faer::MatRef`).
impl<'a, T: Float> MatVec<Vec<T>> for MatRef<'a, T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = (0..self.ncols()).fold(T::zero(), |acc, j| acc + self[(i, j)] * x[j]);
        }
    }
}

/// The standard real inner product `x^T y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

/// If the `rayon` feature is enabled, the reduction uses parallel iterators.
impl<T: Float + From<f64> + Send + Sync> InnerProduct<Vec<T>> for Euclidean {
    type Scalar = T;

    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.as_slice()
                .par_iter()
                .zip(y.as_slice().par_iter())
                .map(|(xi, yi)| *xi * *yi)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y.iter())
                .map(|(xi, yi)| *xi * *yi)
                .fold(T::zero(), |acc, v| acc + v)
        }
    }

    fn norm(&self, x: &Vec<T>) -> T {
        self.dot(x, x).sqrt()
    }
}

/// Wraps a closure `|x, y| { *y = A x }` as a [`MatVec`] operator.
pub struct FnOperator<F>(pub F);

impl<V, F> MatVec<V> for FnOperator<F>
where
    F: Fn(&V, &mut V),
{
    fn matvec(&self, x: &V, y: &mut V) {
        (self.0)(x, y)
    }
}

/// Wraps a closure `|a, b| -> T` as an [`InnerProduct`].
pub struct FnInnerProduct<F, T> {
    f: F,
    _scalar: PhantomData<fn() -> T>,
}

impl<F, T> FnInnerProduct<F, T> {
    pub fn new(f: F) -> Self {
        Self { f, _scalar: PhantomData }
    }
}

impl<V, F, T> InnerProduct<V> for FnInnerProduct<F, T>
where
    F: Fn(&V, &V) -> T,
    T: Float + From<f64>,
{
    type Scalar = T;

    fn dot(&self, x: &V, y: &V) -> T {
        (self.f)(x, y)
    }

    fn norm(&self, x: &V) -> T {
        self.dot(x, x).sqrt()
    }
}

/// Inner product of vectors whose entries are split across the ranks of a communicator.
///
/// Each rank holds its local slice; `dot` sums the local products and all-reduces the
/// partial sums, so every rank sees the same scalar. The call blocks until all ranks
/// reach the reduction, which is why every rank must call `step()` the same number of times.
pub struct CommInnerProduct<'a, C: Comm> {
    /// Reference to the communicator implementing the `Comm` trait.
    pub comm: &'a C,
}

impl<'a, C: Comm> CommInnerProduct<'a, C> {
    pub fn new(comm: &'a C) -> Self {
        Self { comm }
    }
}

impl<'a, C, T> InnerProduct<Vec<T>> for CommInnerProduct<'a, C>
where
    C: Comm,
    T: Float + From<f64>,
{
    type Scalar = T;

    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        // Reduce in f64 so every backend sees one wire type
        let local = x
            .iter()
            .zip(y.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
            .to_f64()
            .unwrap_or(f64::NAN);
        <T as From<f64>>::from(self.comm.all_reduce(local))
    }

    fn norm(&self, x: &Vec<T>) -> T {
        self.dot(x, x).sqrt()
    }
}

/// Implements the `Indexing` trait for `Vec<T>`, treating a vector as a column vector.
impl<T> Indexing for Vec<T> {
    fn nrows(&self) -> usize {
        self.len()
    }
}

/// Implements the `Indexing` trait for `faer::Mat`, returning the number of rows.
impl<T> Indexing for Mat<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }
}
