use std::{
    borrow::{Borrow, BorrowMut},
    fmt::{Debug, Display, Formatter},
    ops::{Deref, DerefMut},
};

use itertools::Itertools;
use rand::Rng;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{utils, Degree, InvalidPermutation};

use super::borrowed::{ImageIter, Perm};

/// An owned permutation.
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct PermBuf {
    /// The images of `0, 1, ..., n-1` in element order.  Because of the bijection invariant,
    /// this can't contain duplicates or any value `>= n`.
    image_vec: Vec<usize>,
}

impl PermBuf {
    /* CONSTRUCTORS */

    /// Creates a `PermBuf` from a [`Vec`] of images, checking that the result is a valid
    /// bijection.  The `PermBuf` takes ownership of the [`Vec`], so the stored images can never
    /// alias caller-owned storage.
    ///
    /// # Example
    /// ```
    /// use permframe::{Degree, InvalidPermutation, PermBuf};
    ///
    /// // Converting a valid `Vec` of images is fine
    /// let p = PermBuf::from_images(vec![1, 0, 2])?;
    /// assert_eq!(p.degree(), Degree::new(3));
    ///
    /// // Anything that isn't a bijection on `{0, ..., n-1}` is rejected
    /// assert_eq!(
    ///     PermBuf::from_images(vec![0]),
    ///     Err(InvalidPermutation::TooFewImages(1))
    /// );
    /// assert_eq!(
    ///     PermBuf::from_images(vec![1, 1]),
    ///     Err(InvalidPermutation::DuplicateImage(1))
    /// );
    /// assert_eq!(
    ///     PermBuf::from_images(vec![0, 2]),
    ///     Err(InvalidPermutation::ImageOutOfRange {
    ///         image: 2,
    ///         degree: Degree::new(2)
    ///     })
    /// );
    /// # Ok::<(), InvalidPermutation>(())
    /// ```
    pub fn from_images(images: Vec<usize>) -> Result<Self, InvalidPermutation> {
        if images.len() < 2 {
            return Err(InvalidPermutation::TooFewImages(images.len()));
        }
        let degree = Degree::new(images.len());
        utils::check_images(&images, degree)?;
        Ok(Self { image_vec: images })
    }

    /// Utility function that creates a `PermBuf` from an [`Iterator`] of images, checking that
    /// the result is a valid bijection.
    pub fn from_image_iter(
        iter: impl Iterator<Item = usize>,
    ) -> Result<Self, InvalidPermutation> {
        Self::from_images(iter.collect_vec())
    }

    /// Creates a `PermBuf` from a [`Vec`] of images, **without** checking that the result is a
    /// valid bijection.  This is the unsafe version of [`PermBuf::from_images`].
    ///
    /// # Safety
    ///
    /// This function is safe if `images` contains every value in `0..images.len()` exactly
    /// once.
    #[inline]
    pub unsafe fn from_images_unchecked(images: Vec<usize>) -> PermBuf {
        PermBuf { image_vec: images }
    }

    /// Creates a `PermBuf` from an [`Iterator`] of images, **without** checking that the result
    /// is a valid bijection.  This is the unsafe version of [`PermBuf::from_image_iter`].
    ///
    /// # Safety
    ///
    /// This function is safe if `iter` yields every value in `0..n` exactly once, where `n` is
    /// the number of items yielded by `iter`.
    pub unsafe fn from_image_iter_unchecked(iter: impl Iterator<Item = usize>) -> Self {
        Self::from_images_unchecked(iter.collect())
    }

    /// Creates the identity permutation on a given [`Degree`], which maps every element to
    /// itself.  Unlike [`from_images`](Self::from_images), this places no lower bound on the
    /// degree.
    ///
    /// # Example
    /// ```
    /// use permframe::{Degree, PermBuf};
    ///
    /// assert_eq!(PermBuf::identity(Degree::new(4)).images(), &[0, 1, 2, 3]);
    /// ```
    pub fn identity(degree: Degree) -> Self {
        // This unsafety is OK, because the identity is always a valid permutation
        unsafe { Self::from_image_iter_unchecked(degree.elements()) }
    }

    /// Samples a permutation of a given [`Degree`] uniformly at random, using the caller's
    /// random number generator.  This draws one index uniformly from `0..degree.num_perms()`
    /// and decodes it with [`Degree::nth_perm`], so a seeded generator gives reproducible
    /// permutations.
    ///
    /// # Example
    /// ```
    /// use permframe::{Degree, PermBuf};
    /// use rand::SeedableRng;
    ///
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    /// let p = PermBuf::random(Degree::new(5), &mut rng)?;
    /// assert_eq!(p.degree(), Degree::new(5));
    ///
    /// // Sampling needs at least two elements
    /// assert!(PermBuf::random(Degree::new(1), &mut rng).is_err());
    /// # Ok::<(), permframe::InvalidPermutation>(())
    /// ```
    pub fn random(degree: Degree, rng: &mut impl Rng) -> Result<Self, InvalidPermutation> {
        if degree.num_elements() < 2 {
            return Err(InvalidPermutation::DegreeTooSmall(degree));
        }
        Ok(degree.nth_perm(rng.gen_range(0..degree.num_perms())))
    }

    /// Consumes this `PermBuf` and returns the underlying [`Vec`] of images.
    #[inline]
    pub fn into_images(self) -> Vec<usize> {
        self.image_vec
    }

    /// Converts a [`PermBuf`] into a [`Perm`].  Equivalent to `&*self`, but doesn't rely on
    /// type inference.
    #[inline]
    pub fn as_perm(&self) -> &Perm {
        // This unsafety is OK, because `PermBuf` requires its images to form a valid bijection
        unsafe { Perm::from_slice_unchecked(&self.image_vec) }
    }

    /// Converts a [`PermBuf`] into a `&mut Perm`.  Equivalent to `&mut *self`, but doesn't rely
    /// on type inference.
    #[inline]
    pub fn as_mut_perm(&mut self) -> &mut Perm {
        // This unsafety is OK, because `PermBuf` requires its images to form a valid bijection
        unsafe { Perm::from_mut_slice_unchecked(&mut self.image_vec) }
    }

    /* MUTATING OPERATIONS */

    /// Extend this `PermBuf` in-place with fixed elements until it has a given [`Degree`].
    pub fn extend_to(&mut self, degree: Degree) {
        assert!(self.degree() <= degree);
        self.image_vec
            .extend(degree.elements().skip(self.image_vec.len()));
    }
}

/* CONVERSIONS BETWEEN `Perm` AND `PermBuf` */

impl Deref for PermBuf {
    type Target = Perm;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_perm()
    }
}

impl DerefMut for PermBuf {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_perm()
    }
}

impl Borrow<Perm> for PermBuf {
    #[inline]
    fn borrow(&self) -> &Perm {
        self.deref()
    }
}

impl BorrowMut<Perm> for PermBuf {
    #[inline]
    fn borrow_mut(&mut self) -> &mut Perm {
        self.deref_mut()
    }
}

impl AsRef<Perm> for PermBuf {
    #[inline]
    fn as_ref(&self) -> &Perm {
        self.as_perm()
    }
}

impl AsMut<Perm> for PermBuf {
    #[inline]
    fn as_mut(&mut self) -> &mut Perm {
        self.as_mut_perm()
    }
}

impl ToOwned for Perm {
    type Owned = PermBuf;

    #[inline]
    fn to_owned(&self) -> Self::Owned {
        // We can skip the validity checks here because `Perm` is valid by invariant
        unsafe { PermBuf::from_image_iter_unchecked(self.image_iter()) }
    }
}

/* FORMATTING */

impl Debug for PermBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PermBuf({})", self)
    }
}

impl Display for PermBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Delegate to `Perm`'s implementation
        Display::fmt(self.deref(), f)
    }
}

/* OTHER TRAITS */

impl<'perm> IntoIterator for &'perm PermBuf {
    type Item = usize;
    type IntoIter = ImageIter<'perm>;

    fn into_iter(self) -> Self::IntoIter {
        self.image_iter()
    }
}

impl PartialEq<Perm> for PermBuf {
    fn eq(&self, other: &Perm) -> bool {
        self.as_perm() == other
    }
}

impl PartialEq<PermBuf> for Perm {
    fn eq(&self, other: &PermBuf) -> bool {
        self == other.as_perm()
    }
}

/* Allow [`PermBuf`]s to be serialised and deserialised with `serde` */

// Serialise as a sequence of images
#[cfg(feature = "serde")]
impl Serialize for PermBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.image_iter())
    }
}

// Deserialisation re-runs the full validity check, so a `PermBuf` can't be smuggled past the
// bijection invariant through serde
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for PermBuf {
    fn deserialize<D>(deserializer: D) -> Result<PermBuf, D::Error>
    where
        D: Deserializer<'de>,
    {
        let images = Vec::<usize>::deserialize(deserializer)?;
        PermBuf::from_images(images).map_err(serde_crate::de::Error::custom)
    }
}

//////////////////
// TESTING CODE //
//////////////////

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

#[cfg(test)]
impl Arbitrary for PermBuf {
    fn arbitrary(gen: &mut Gen) -> Self {
        // Decoding a uniformly drawn index gives every permutation of the chosen degree equal
        // weight.  Degrees are kept small so that `num_perms` stays tiny.
        let degree = Degree::new(usize::arbitrary(gen) % 6 + 2);
        let index = usize::arbitrary(gen) % degree.num_perms();
        degree.nth_perm(index)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use quickcheck_macros::quickcheck;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn from_images_ok() {
        #[track_caller]
        fn check(images: Vec<usize>) {
            let perm = PermBuf::from_images(images.clone()).unwrap();
            assert_eq!(perm.images(), images.as_slice());
        }

        check(vec![0, 1]);
        check(vec![1, 0]);
        check(vec![2, 0, 1]);
        check(vec![0, 5, 4, 8, 2, 1, 3, 7, 6]);
    }

    #[test]
    fn from_images_err() {
        assert_eq!(
            PermBuf::from_images(vec![]),
            Err(InvalidPermutation::TooFewImages(0))
        );
        assert_eq!(
            PermBuf::from_images(vec![0]),
            Err(InvalidPermutation::TooFewImages(1))
        );
        assert_eq!(
            PermBuf::from_images(vec![1, 1]),
            Err(InvalidPermutation::DuplicateImage(1))
        );
        assert_eq!(
            PermBuf::from_images(vec![0, 1, 1]),
            Err(InvalidPermutation::DuplicateImage(1))
        );
        assert_eq!(
            PermBuf::from_images(vec![0, 2]),
            Err(InvalidPermutation::ImageOutOfRange {
                image: 2,
                degree: Degree::new(2)
            })
        );
    }

    #[test]
    fn identity_maps_every_element_to_itself() {
        assert_eq!(PermBuf::identity(Degree::new(2)).images(), &[0, 1]);
        assert_eq!(PermBuf::identity(Degree::new(5)).images(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn identity_is_exempt_from_the_two_element_minimum() {
        assert_eq!(PermBuf::identity(Degree::new(1)).images(), &[0]);
    }

    #[test]
    fn equality_is_structural() {
        let decoded = Degree::new(3).nth_perm(2);
        let built = PermBuf::from_images(vec![1, 0, 2]).unwrap();
        assert_eq!(decoded, built);
    }

    #[test]
    fn clone_does_not_alias() {
        let mut perm = PermBuf::from_images(vec![2, 0, 1]).unwrap();
        let copy = perm.clone();
        perm.swap(0, 1);
        assert_ne!(perm, copy);
        assert_eq!(copy.images(), &[2, 0, 1]);
    }

    #[test]
    fn extend_to_appends_fixed_elements() {
        let mut perm = PermBuf::from_images(vec![1, 0]).unwrap();
        perm.extend_to(Degree::new(5));
        assert_eq!(perm.images(), &[1, 0, 2, 3, 4]);
    }

    #[test]
    fn random_needs_at_least_two_elements() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            PermBuf::random(Degree::new(1), &mut rng),
            Err(InvalidPermutation::DegreeTooSmall(Degree::new(1)))
        );
    }

    #[test]
    fn random_samples_stay_within_the_group() {
        let degree = Degree::new(4);
        let group: HashSet<PermBuf> = degree.symmetric_group().into_iter().collect();
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..100 {
            let perm = PermBuf::random(degree, &mut rng).unwrap();
            assert!(group.contains(&perm));
        }
    }

    #[test]
    fn random_is_deterministic_under_a_fixed_seed() {
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(
                PermBuf::random(Degree::new(5), &mut rng1).unwrap(),
                PermBuf::random(Degree::new(5), &mut rng2).unwrap()
            );
        }
    }

    #[quickcheck]
    fn arbitrary_perms_uphold_the_bijection_invariant(perm: PermBuf) -> bool {
        let mut images = perm.clone().into_images();
        images.sort_unstable();
        images.into_iter().eq(perm.degree().elements())
    }
}
