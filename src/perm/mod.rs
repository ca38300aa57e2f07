mod borrowed; // Contains `Perm`
mod errors;
mod owned; // Contains `PermBuf`

pub use borrowed::{ImageIter, Perm};
pub use errors::InvalidPermutation;
pub use owned::PermBuf;
