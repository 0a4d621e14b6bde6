// Jacobi preconditioner implementation

use crate::preconditioner::Preconditioner;
use crate::core::traits::{MatVec, Indexing};
use crate::error::{check_len, CgError};
use num_traits::Float;

/// Jacobi preconditioner: M⁻¹ = D⁻¹
///
/// Zero diagonal entries (e.g. pixels no sample ever touched) map to a zero
/// inverse, so those components stay out of the solve.
#[derive(Debug, Clone)]
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Float> Jacobi<T> {
    /// new with empty state; user must call `setup`.
    pub fn new() -> Self {
        Self { inv_diag: Vec::new() }
    }

    /// Build directly from a known diagonal, skipping the probing in `setup`.
    pub fn from_diagonal(diag: &[T]) -> Self {
        Self { inv_diag: invert(diag.iter().copied()) }
    }

    pub fn inverse_diagonal(&self) -> &[T] {
        &self.inv_diag
    }
}

impl<T: Float> Default for Jacobi<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn invert<T: Float>(diag: impl Iterator<Item = T>) -> Vec<T> {
    diag.map(|d| if d != T::zero() { T::one() / d } else { T::zero() })
        .collect()
}

impl<M, V, T> Preconditioner<M, V> for Jacobi<T>
where
    M: MatVec<V> + Indexing,
    V: AsRef<[T]> + AsMut<[T]> + From<Vec<T>>,
    T: Float,
{
    /// Extracts diag(A) column by column with unit-vector products.
    fn setup(&mut self, a: &M) -> Result<(), CgError> {
        let n = a.nrows();
        let mut diag = Vec::with_capacity(n);
        for i in 0..n {
            let mut e = vec![T::zero(); n];
            e[i] = T::one();
            let mut col = V::from(vec![T::zero(); n]);
            a.matvec(&V::from(e), &mut col);
            check_len("jacobi setup", n, col.as_ref().len())?;
            diag.push(col.as_ref()[i]);
        }
        self.inv_diag = invert(diag.into_iter());
        Ok(())
    }

    fn apply(&self, x: &V, y: &mut V) -> Result<(), CgError> {
        if self.inv_diag.is_empty() && !x.as_ref().is_empty() {
            return Err(CgError::PreconditionerFailure(
                "jacobi preconditioner used before setup".into(),
            ));
        }
        let x_ref = x.as_ref();
        check_len("jacobi apply", self.inv_diag.len(), x_ref.len())?;
        let y_mut = y.as_mut();
        check_len("jacobi apply", self.inv_diag.len(), y_mut.len())?;
        for ((yi, &xi), &di) in y_mut.iter_mut().zip(x_ref).zip(&self.inv_diag) {
            *yi = di * xi;
        }
        Ok(())
    }
}
