pub mod options;

pub use options::{CgOptions, DEFAULT_LAG};
