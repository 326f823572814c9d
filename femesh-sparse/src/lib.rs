//! Sparse matrix functionality for femesh.
mod bsr;

pub use bsr::{BsrError, BsrMatrix};
