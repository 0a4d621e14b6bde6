// Identity and closure-backed preconditioners

use crate::error::CgError;
use crate::preconditioner::Preconditioner;

/// M⁻¹ = I. `z` becomes an independent copy of `r`, never an alias.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl<M, V: Clone> Preconditioner<M, V> for Identity {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        z.clone_from(r);
        Ok(())
    }
}

/// Wraps a closure `|r, z| { *z = M⁻¹ r }` as a [`Preconditioner`].
pub struct FnPreconditioner<F>(pub F);

impl<M, V, F> Preconditioner<M, V> for FnPreconditioner<F>
where
    F: Fn(&V, &mut V),
{
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        (self.0)(r, z);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_copies_without_aliasing() {
        let r = vec![1.0, -2.0, 3.0];
        let mut z = vec![0.0; 3];
        Preconditioner::<(), _>::apply(&Identity, &r, &mut z).unwrap();
        assert_eq!(z, r);
        z[0] = 42.0;
        assert_eq!(r[0], 1.0);
    }

    #[test]
    fn closure_preconditioner_scales() {
        let pc = FnPreconditioner(|r: &Vec<f64>, z: &mut Vec<f64>| {
            for (zi, ri) in z.iter_mut().zip(r) {
                *zi = 0.5 * ri;
            }
        });
        let mut z = vec![0.0; 2];
        Preconditioner::<(), _>::apply(&pc, &vec![4.0, 2.0], &mut z).unwrap();
        assert_eq!(z, vec![2.0, 1.0]);
    }
}
