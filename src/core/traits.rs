//! Collaborator seams for the CG engine.
//!
//! The engine never looks inside a vector beyond its flat slice view; what a
//! matrix-vector product or an inner product *means* is left to these traits,
//! so a vector may be one rank's share of a distributed map.

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x. `y` arrives with the length of `x`.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Inner products & norms.
pub trait InnerProduct<V> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd + From<f64>;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖ induced by `dot`.
    fn norm(&self, x: &V) -> Self::Scalar;
}

/// Uniform indexing into vectors and operators.
pub trait Indexing {
    /// Number of rows (or length for a vector).
    fn nrows(&self) -> usize;
}

impl<V, A: MatVec<V> + ?Sized> MatVec<V> for &A {
    fn matvec(&self, x: &V, y: &mut V) {
        (**self).matvec(x, y)
    }
}

impl<V, I: InnerProduct<V> + ?Sized> InnerProduct<V> for &I {
    type Scalar = I::Scalar;
    fn dot(&self, x: &V, y: &V) -> Self::Scalar {
        (**self).dot(x, y)
    }
    fn norm(&self, x: &V) -> Self::Scalar {
        (**self).norm(x)
    }
}

impl<A: Indexing + ?Sized> Indexing for &A {
    fn nrows(&self) -> usize {
        (**self).nrows()
    }
}
