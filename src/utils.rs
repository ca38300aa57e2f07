use crate::{Degree, InvalidPermutation};

/// Given a candidate image list of length `degree`, simultaneously check for duplicate images
/// and any images which are too big for the degree.
pub(crate) fn check_images(images: &[usize], degree: Degree) -> Result<(), InvalidPermutation> {
    // We check validity by keeping a checklist of which images we've seen, and checking off
    // each image as we go.  We do not need to check for empty spaces in the checklist once
    // we've finished because (by the Pigeon Hole Principle), fitting `n` images into `n` slots
    // with some gaps will always require that an image is either out of range or a duplicate.
    let mut checklist = vec![false; degree.num_elements()];
    for &image in images {
        match checklist.get_mut(image) {
            // If the image is out of range of the checklist, it can't belong within the degree
            None => return Err(InvalidPermutation::ImageOutOfRange { image, degree }),
            // If the image has already been seen before, then it must be a duplicate
            Some(&mut true) => return Err(InvalidPermutation::DuplicateImage(image)),
            // If the image has not been seen before, check off the checklist entry and continue
            Some(seen) => *seen = true,
        }
    }
    // If none of the images caused errors, the permutation must be valid
    Ok(())
}

/// Checks whether `images` holds every value in `0..images.len()` exactly once.
pub(crate) fn is_valid(images: &[usize]) -> bool {
    match Degree::try_from(images.len()) {
        Ok(degree) => check_images(images, degree).is_ok(),
        Err(_) => false,
    }
}
