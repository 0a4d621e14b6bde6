//! Preconditioners for the CG engine.
//!
//! This module defines the Preconditioner trait together with the stock
//! implementations: [`Identity`] (the default), [`Jacobi`], and the closure
//! adapter [`FnPreconditioner`].

use crate::error::CgError;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<M, V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError>;
    /// Optionally: setup/factorize from A
    fn setup(&mut self, _a: &M) -> Result<(), CgError> { Ok(()) }
}

impl<M, V, P: Preconditioner<M, V> + ?Sized> Preconditioner<M, V> for &P {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        (**self).apply(r, z)
    }
}

pub mod identity;
pub mod jacobi;

pub use identity::{FnPreconditioner, Identity};
pub use jacobi::Jacobi;
