//! Core linear-algebra traits and their stock implementations.

pub mod traits;
pub mod wrappers;

pub use traits::{Indexing, InnerProduct, MatVec};
pub use wrappers::{CommInnerProduct, Euclidean, FnInnerProduct, FnOperator};
