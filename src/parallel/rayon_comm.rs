// rayon-based shared-memory communication

/// Shared-memory "communicator": one rank that owns the whole vector.
///
/// Construction sizes the global rayon pool to the machine; the threads work inside
/// [`crate::Euclidean`], not across ranks, so reductions are already global.
pub struct RayonComm;

impl RayonComm {
    pub fn new() -> Self {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .build_global()
            .ok();
        RayonComm
    }

    /// Worker threads available to the parallel reductions.
    pub fn threads(&self) -> usize {
        rayon::current_num_threads()
    }
}

impl Default for RayonComm {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Comm for RayonComm {
    fn rank(&self) -> usize { 0 }
    fn size(&self) -> usize { 1 }
    fn barrier(&self) { rayon::scope(|_| {}); }
    fn all_reduce(&self, x: f64) -> f64 {
        x
    }
}
