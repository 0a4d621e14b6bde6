use thiserror::Error;

// Unified error type for distcg

/// Which CG denominator vanished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownKind {
    /// `<p, A p> == 0` in the step length alpha.
    StepLength,
    /// `<r, z> == 0` in the conjugacy coefficient beta.
    ConjugacyCoefficient,
}

impl std::fmt::Display for BreakdownKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakdownKind::StepLength => write!(f, "step length (p^T A p = 0)"),
            BreakdownKind::ConjugacyCoefficient => write!(f, "conjugacy coefficient (r^T z = 0)"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CgError {
    #[error("shape mismatch in {what}: expected length {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("CG breakdown at iteration {iteration}: vanishing {kind}")]
    Breakdown { iteration: usize, kind: BreakdownKind },
    #[error("degenerate system: initial r^T z is zero")]
    DegenerateSystem,
    #[error("preconditioner failure: {0}")]
    PreconditionerFailure(String),
    #[error("invalid option: {0}")]
    InvalidOption(&'static str),
}

/// Returns `ShapeMismatch` unless `found == expected`.
pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), CgError> {
    if expected == found {
        Ok(())
    } else {
        Err(CgError::ShapeMismatch { what, expected, found })
    }
}
