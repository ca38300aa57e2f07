//! Idiomatic Rust representations of finite permutations and their algebra.

#![deny(clippy::all)]

mod degree;
pub mod perm;
mod utils;

// Re-export useful data types into the top level of the crate
pub use degree::{Degree, ZeroDegreeError};
pub use perm::{ImageIter, InvalidPermutation, Perm, PermBuf};
