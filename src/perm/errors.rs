use std::{
    error::Error,
    fmt::{Display, Formatter},
};

use crate::Degree;

// Imports used solely for doc comments
#[allow(unused_imports)]
use crate::{Perm, PermBuf};

/// All the possible ways that a candidate [`Perm`] could fail to be a bijection, or that a valid
/// [`Perm`] could be handed an element outside its degree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InvalidPermutation {
    /// The candidate image list would hold fewer than two images.
    TooFewImages(usize),
    /// An image would appear twice in the new [`Perm`] (for example in `[0, 1, 1]`).
    DuplicateImage(usize),
    /// An image is not within the degree of the new [`Perm`] (for example `2` in `[0, 2]`).  By
    /// the pigeon hole principle this always leaves some element of the degree unmapped.
    ImageOutOfRange { image: usize, degree: Degree },
    /// An element passed to an accessor is outside `0..degree`.
    IndexOutOfBounds { index: usize, degree: Degree },
    /// The degree handed to [`PermBuf::random`] has fewer than two elements.
    DegreeTooSmall(Degree),
}

impl Display for InvalidPermutation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidPermutation::TooFewImages(num_images) => {
                write!(f, "A permutation needs at least 2 images, got {}", num_images)
            }
            InvalidPermutation::DuplicateImage(image) => {
                write!(f, "Image {} appears twice", image)
            }
            InvalidPermutation::ImageOutOfRange { image, degree } => {
                write!(f, "Image {} is not within degree {}", image, degree)
            }
            InvalidPermutation::IndexOutOfBounds { index, degree } => {
                write!(f, "Element {} is out of bounds for degree {}", index, degree)
            }
            InvalidPermutation::DegreeTooSmall(degree) => {
                write!(f, "Can't sample a random permutation of degree {}", degree)
            }
        }
    }
}

impl Error for InvalidPermutation {}
