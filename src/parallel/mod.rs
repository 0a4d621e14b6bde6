//! Communicators for inner products over distributed vectors.
//!
//! The CG engine itself never communicates. A distributed run gives each rank its local
//! share of the vectors and an inner product (see [`crate::CommInnerProduct`]) whose
//! partial sums are combined with [`Comm::all_reduce`].

pub trait Comm {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    fn barrier(&self);
    /// Sum `x` over all ranks; every rank receives the total.
    fn all_reduce(&self, x: f64) -> f64;
    fn dot(&self, a: &[f64], b: &[f64]) -> f64 {
        let local = a.iter().zip(b).map(|(&x, &y)| x * y).sum::<f64>();
        self.all_reduce(local)
    }
}

/// Single-process communicator: all collectives are identities.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialComm;

impl Comm for SerialComm {
    fn rank(&self) -> usize { 0 }
    fn size(&self) -> usize { 1 }
    fn barrier(&self) {}
    fn all_reduce(&self, x: f64) -> f64 { x }
}

#[cfg(feature="mpi")]
pub mod mpi_comm;
#[cfg(feature="mpi")]
pub use mpi_comm::MpiComm;

#[cfg(feature="rayon")]
pub mod rayon_comm;
#[cfg(feature="rayon")]
pub use rayon_comm::RayonComm;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_comm_is_identity() {
        let comm = SerialComm;
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        comm.barrier();
        assert_eq!(comm.all_reduce(2.5), 2.5);
        assert_eq!(comm.dot(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
    }
}
