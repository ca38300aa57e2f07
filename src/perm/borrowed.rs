use std::{
    fmt::{Debug, Display, Formatter},
    ops::{Index, Mul, MulAssign, Not},
};

use itertools::Itertools;

use crate::{utils, Degree, InvalidPermutation, PermBuf};

pub type ImageIter<'a> = std::iter::Copied<std::slice::Iter<'a, usize>>;

/// A borrowed permutation of `{0, ..., n-1}`.
///
/// `Perm`s and [`PermBuf`]s must always be valid bijections - i.e. a `Perm` of degree `n` must
/// contain every value in `0..n` once and precisely once.  This is only checked in the
/// constructors and then used as assumed knowledge to avoid further checks.  This is similar to
/// how [`&str`](str) and [`String`] are required to be valid UTF-8.
///
/// # Example
/// ```
/// use permframe::{InvalidPermutation, PermBuf};
///
/// // `[1, 0, 2]` swaps the first two elements and fixes the last
/// let p = PermBuf::from_images(vec![1, 0, 2])?;
/// assert_eq!(p.image(0)?, 1);
/// assert_eq!(p.image(2)?, 2);
///
/// // If we try to build an invalid permutation, we get an error.  This means that we can
/// // assume that every `Perm` satisfies the bijection invariant
/// assert_eq!(
///     PermBuf::from_images(vec![1, 1, 0]),
///     Err(InvalidPermutation::DuplicateImage(1))
/// );
/// #
/// # Ok::<(), InvalidPermutation>(())
/// ```
#[derive(Eq, PartialEq, PartialOrd, Ord, Hash)]
#[repr(transparent)] // Required so we can safely cast between &[usize] and &Perm
pub struct Perm {
    /// The images of `0, 1, ..., n-1` in element order.  Because of the bijection invariant,
    /// this can't contain duplicates or any value `>= n`.
    images: [usize],
}

impl Perm {
    /// Returns the [`Degree`] of this `Perm`.
    #[inline]
    pub fn degree(&self) -> Degree {
        Degree::new(self.images.len())
    }

    /// The number of elements mapped by this `Perm`.  Equivalent to
    /// `self.degree().num_elements()`.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.images.len()
    }

    /// Returns the underlying slice of images.
    #[inline]
    pub fn images(&self) -> &[usize] {
        &self.images
    }

    /// Returns an iterator over the images in this `Perm`, in element order.
    #[inline]
    pub fn image_iter(&self) -> ImageIter {
        self.images.iter().copied()
    }

    /// Gets the image of a given element under this `Perm`.
    ///
    /// # Example
    /// ```
    /// use permframe::PermBuf;
    ///
    /// let p = PermBuf::from_images(vec![1, 0, 2])?;
    /// assert_eq!(p.image(0)?, 1);
    /// assert!(p.image(3).is_err());
    /// # Ok::<(), permframe::InvalidPermutation>(())
    /// ```
    pub fn image(&self, element: usize) -> Result<usize, InvalidPermutation> {
        self.check_element(element)?;
        Ok(self.images[element])
    }

    /// Gets the element which maps to a given image under this `Perm`.  This performs a linear
    /// search; use [`inverse`](Self::inverse) if many lookups are needed.
    ///
    /// # Example
    /// ```
    /// use permframe::PermBuf;
    ///
    /// let p = PermBuf::from_images(vec![1, 2, 0])?;
    /// assert_eq!(p.preimage(2)?, 1);
    /// # Ok::<(), permframe::InvalidPermutation>(())
    /// ```
    pub fn preimage(&self, image: usize) -> Result<usize, InvalidPermutation> {
        self.check_element(image)?;
        // The unwrap is fine because a valid `Perm` is onto, so the search always succeeds
        Ok(self.image_iter().position(|x| x == image).unwrap())
    }

    /// Perform an in-place check that this `Perm` is equal to the identity.  `p.is_identity()`
    /// is an optimised version of `p == PermBuf::identity(p.degree())`.
    pub fn is_identity(&self) -> bool {
        self.image_iter().enumerate().all(|(i, image)| image == i)
    }

    /// Return the [`Degree`] of the shortest prefix of `self` that is still a valid
    /// permutation.  This is the smallest [`Degree`] that this `Perm` can be safely reduced to;
    /// the identity on any [`Degree`] has an `effective_degree` of one.
    ///
    /// # Example
    /// ```
    /// use permframe::{Degree, PermBuf};
    ///
    /// // The trailing `2, 3` are fixed, so this is essentially a degree-2 permutation
    /// assert_eq!(
    ///     PermBuf::from_images(vec![1, 0, 2, 3])?.effective_degree(),
    ///     Degree::new(2)
    /// );
    /// assert_eq!(
    ///     PermBuf::identity(Degree::new(6)).effective_degree(),
    ///     Degree::new(1)
    /// );
    /// # Ok::<(), permframe::InvalidPermutation>(())
    /// ```
    pub fn effective_degree(&self) -> Degree {
        // Iterate backwards over the images looking for the first element which isn't fixed.
        // That element defines the effective degree of the permutation.
        for (i, image) in self.images.iter().enumerate().rev() {
            if *image != i {
                // The `+ 1` is needed because `i` is 0-indexed
                return Degree::new(i + 1);
            }
        }
        // If the loop reached the front of the images, then the effective degree is 1
        Degree::new(1)
    }

    /// Swap two images round in this `Perm`, panicking if either of the indices point out of
    /// bounds.  For the pure version that returns a new value, see
    /// [`transposition`](Self::transposition).
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.images.swap(a, b);
    }

    /* PERMUTATION ARITHMETIC */

    /// Returns a new permutation identical to `self` except that the images at positions `a`
    /// and `b` are swapped.  Both indices are validated before any result is built; `self` is
    /// never changed.
    ///
    /// # Example
    /// ```
    /// use permframe::PermBuf;
    ///
    /// let p = PermBuf::from_images(vec![1, 0, 2])?;
    /// assert_eq!(p.transposition(0, 2)?.images(), &[2, 0, 1]);
    /// assert!(p.transposition(0, 3).is_err());
    /// # Ok::<(), permframe::InvalidPermutation>(())
    /// ```
    pub fn transposition(&self, a: usize, b: usize) -> Result<PermBuf, InvalidPermutation> {
        self.check_element(a)?;
        self.check_element(b)?;
        let mut transposed = self.to_owned();
        transposed.swap(a, b);
        Ok(transposed)
    }

    /// Composes two permutations (i.e. uses the RHS to permute `self`): the result maps `i` to
    /// `self[rhs[i]]`, so the right-hand operand is applied first.  This is like using the `*`
    /// operator, except that it doesn't rely on operator overloading.
    ///
    /// The operands don't have to share a degree: a permutation acts as the identity on every
    /// index at or beyond its own degree, and the result's degree is the larger of the two.
    /// Under this extension composition is total and associative, and the identity laws hold in
    /// every size case.
    ///
    /// # Example
    /// ```
    /// use permframe::PermBuf;
    ///
    /// let p = PermBuf::from_images(vec![0, 2, 3, 1])?;
    /// let q = PermBuf::from_images(vec![3, 2, 1, 0])?;
    /// assert_eq!(p.product(&q).images(), &[1, 3, 2, 0]);
    ///
    /// // Degrees may differ; the shorter operand fixes everything beyond its own degree
    /// let r = PermBuf::from_images(vec![1, 0])?;
    /// assert_eq!(p.product(&r).images(), &[2, 0, 3, 1]);
    /// # Ok::<(), permframe::InvalidPermutation>(())
    /// ```
    pub fn product(&self, rhs: &Perm) -> PermBuf {
        let degree = self.degree().max(rhs.degree());
        let images = degree.elements().map(|i| {
            let mid = rhs.images.get(i).copied().unwrap_or(i);
            self.images.get(mid).copied().unwrap_or(mid)
        });
        // This unsafety is OK because composing two bijections (each extended by the identity)
        // gives another bijection.  The debug assertion keeps the old constructor-level
        // re-check alive in debug builds.
        let product = unsafe { PermBuf::from_image_iter_unchecked(images) };
        debug_assert!(utils::is_valid(product.images()));
        product
    }

    /// Find the inverse of a `Perm`.  If `Y = X.inverse()`, then `XY = YX = I` where `I` is the
    /// identity on the same degree as `X`.  This operation cannot fail, since all valid `Perm`s
    /// have an inverse.  This is equivalent to using the `!` operator.
    ///
    /// # Example
    /// ```
    /// use permframe::PermBuf;
    ///
    /// let p = PermBuf::from_images(vec![2, 0, 1])?;
    /// assert_eq!(p.inverse().images(), &[1, 2, 0]);
    ///
    /// // A single swap is its own inverse
    /// let t = PermBuf::from_images(vec![1, 0, 2])?;
    /// assert_eq!(t.inverse(), t);
    /// # Ok::<(), permframe::InvalidPermutation>(())
    /// ```
    pub fn inverse(&self) -> PermBuf {
        let mut inv_images = vec![0; self.num_elements()];
        for (i, image) in self.image_iter().enumerate() {
            inv_images[image] = i;
        }
        // This unsafety is OK because the inverse of a bijection is always a bijection
        unsafe { PermBuf::from_images_unchecked(inv_images) }
    }

    /* MISC FUNCTIONS */

    /// Creates a `&Perm` from a `&[usize]`, **without** checking that the slice is a valid
    /// bijection.
    ///
    /// # Safety
    ///
    /// This is safe if `slice` contains every value in `0..slice.len()` exactly once.  See
    /// [`Perm`]'s docs for more information about this invariant.
    #[inline]
    pub unsafe fn from_slice_unchecked(slice: &[usize]) -> &Perm {
        // The unsafe pointer cast here is OK, because `Perm` is a `#[repr(transparent)]`
        // wrapper around slices of `usize` and the pointer cast doesn't change the lifetime of
        // the underlying data.
        &*(slice as *const [usize] as *const Perm)
    }

    /// Creates a `&mut Perm` from a `&mut [usize]`, **without** checking that the slice is a
    /// valid bijection.
    ///
    /// # Safety
    ///
    /// This is safe if `slice` contains every value in `0..slice.len()` exactly once.  See
    /// [`Perm`]'s docs for more information about this invariant.
    #[inline]
    pub unsafe fn from_mut_slice_unchecked(slice: &mut [usize]) -> &mut Perm {
        // The unsafe pointer cast here is OK, because `Perm` is a `#[repr(transparent)]`
        // wrapper around slices of `usize` and the pointer cast doesn't change the lifetime of
        // the underlying data.
        &mut *(slice as *mut [usize] as *mut Perm)
    }

    fn check_element(&self, element: usize) -> Result<(), InvalidPermutation> {
        if self.degree().contains(element) {
            Ok(())
        } else {
            Err(InvalidPermutation::IndexOutOfBounds {
                index: element,
                degree: self.degree(),
            })
        }
    }
}

impl Index<usize> for Perm {
    type Output = usize;

    /// `perm[i]` gets the image of `i` (0-indexed).
    ///
    /// # Panics
    ///
    /// Panics if `i >= perm.num_elements()`.  For the checked version, see
    /// [`image`](Perm::image).
    fn index(&self, element: usize) -> &usize {
        &self.images[element]
    }
}

impl Not for &Perm {
    type Output = PermBuf;

    /// Find the inverse of a [`Perm`].  `!p` is equivalent to `p.inverse()`.
    fn not(self) -> Self::Output {
        self.inverse()
    }
}

impl Not for &PermBuf {
    type Output = PermBuf;

    /// Find the inverse of a [`PermBuf`].  `!p` is equivalent to `p.inverse()`.
    fn not(self) -> Self::Output {
        self.inverse()
    }
}

impl Not for PermBuf {
    type Output = PermBuf;

    /// Find the inverse of a [`PermBuf`].  `!p` is equivalent to `p.inverse()`.
    fn not(self) -> Self::Output {
        self.inverse()
    }
}

impl Mul for &Perm {
    type Output = PermBuf;

    /// Uses the RHS to permute the LHS without consuming either argument; the right-hand
    /// operand is applied first.
    #[inline]
    fn mul(self, rhs: &Perm) -> Self::Output {
        self.product(rhs)
    }
}

macro_rules! mul_impl {
    ($lhs: ty, $rhs: ty) => {
        impl Mul<$rhs> for $lhs {
            type Output = PermBuf;

            /// Uses the RHS to permute the LHS without consuming either argument; the
            /// right-hand operand is applied first.
            #[inline]
            fn mul(self, rhs: $rhs) -> Self::Output {
                self.product(&rhs)
            }
        }
    };
}

// Add impl for every pair within `PermBuf`, `&PermBuf` and `&Perm` (except `&Perm * &Perm`,
// which we've explicitly implemented)
mul_impl!(PermBuf, PermBuf);
mul_impl!(PermBuf, &PermBuf);
mul_impl!(PermBuf, &Perm);
mul_impl!(&PermBuf, PermBuf);
mul_impl!(&PermBuf, &PermBuf);
mul_impl!(&PermBuf, &Perm);
mul_impl!(&Perm, PermBuf);
mul_impl!(&Perm, &PermBuf);

impl MulAssign<&Perm> for PermBuf {
    fn mul_assign(&mut self, rhs: &Perm) {
        *self = &*self * rhs;
    }
}

impl MulAssign<&PermBuf> for PermBuf {
    fn mul_assign(&mut self, rhs: &PermBuf) {
        *self *= rhs.as_perm();
    }
}

impl MulAssign<PermBuf> for PermBuf {
    fn mul_assign(&mut self, rhs: PermBuf) {
        *self *= rhs.as_perm();
    }
}

impl<'perm> IntoIterator for &'perm Perm {
    type Item = usize;
    type IntoIter = ImageIter<'perm>;

    fn into_iter(self) -> Self::IntoIter {
        self.image_iter()
    }
}

////////////////
// FORMATTING //
////////////////

impl Debug for Perm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Perm({})", self)
    }
}

impl Display for Perm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.image_iter().format(" "))
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use crate::{Degree, InvalidPermutation, PermBuf};

    #[test]
    fn image_of_each_element() {
        let p = PermBuf::from_images(vec![1, 0, 2]).unwrap();
        assert_eq!(p.image(0), Ok(1));
        assert_eq!(p.image(1), Ok(0));
        assert_eq!(p.image(2), Ok(2));
        assert_eq!(
            p.image(3),
            Err(InvalidPermutation::IndexOutOfBounds {
                index: 3,
                degree: Degree::new(3)
            })
        );
    }

    #[test]
    fn preimage_inverts_single_lookups() {
        let p = PermBuf::from_images(vec![1, 2, 0]).unwrap();
        assert_eq!(p.preimage(1), Ok(0));
        assert_eq!(p.preimage(2), Ok(1));
        assert_eq!(p.preimage(0), Ok(2));
        assert!(p.preimage(3).is_err());
    }

    #[test]
    fn transposition_swaps_two_images() {
        let p = PermBuf::from_images(vec![1, 0, 2]).unwrap();
        assert_eq!(p.transposition(0, 2).unwrap().images(), &[2, 0, 1]);
        assert!(p.transposition(0, 3).is_err());
        assert!(p.transposition(4, 1).is_err());
        // The receiver is untouched in every case
        assert_eq!(p.images(), &[1, 0, 2]);
    }

    #[test]
    fn product_applies_the_right_hand_operand_first() {
        let p = PermBuf::from_images(vec![0, 2, 3, 1]).unwrap();
        let q = PermBuf::from_images(vec![3, 2, 1, 0]).unwrap();
        assert_eq!(p.product(&q).images(), &[1, 3, 2, 0]);
        assert_eq!(q.product(&p).images(), &[3, 1, 0, 2]);
    }

    #[test]
    fn product_treats_short_operands_as_identity_beyond_their_degree() {
        let p = PermBuf::from_images(vec![1, 2, 0]).unwrap();
        let q = PermBuf::from_images(vec![1, 0]).unwrap();
        assert_eq!(p.product(&q).images(), &[2, 1, 0]);
        assert_eq!(q.product(&p).images(), &[0, 2, 1]);
    }

    #[test]
    fn product_extends_with_the_identity() {
        let p = PermBuf::from_images(vec![1, 2, 0]).unwrap();
        let id6 = PermBuf::identity(Degree::new(6));
        let mut extended = p.clone();
        extended.extend_to(Degree::new(6));
        assert_eq!(p.product(&id6), extended);
        assert_eq!(id6.product(&p), extended);
    }

    #[test]
    fn inverse_scatters_images_back() {
        let p = PermBuf::from_images(vec![1, 0, 2]).unwrap();
        assert_eq!(p.inverse(), p);
        let q = PermBuf::from_images(vec![2, 0, 1]).unwrap();
        assert_eq!(q.inverse().images(), &[1, 2, 0]);
    }

    #[test]
    fn effective_degree_ignores_trailing_fixed_elements() {
        #[track_caller]
        fn check(images: Vec<usize>, exp_degree: usize) {
            let perm = PermBuf::from_images(images).unwrap();
            assert_eq!(perm.effective_degree(), Degree::new(exp_degree));
        }

        check(vec![1, 0, 2, 3], 2);
        check(vec![0, 1, 3, 2], 4);
        check(vec![0, 1, 2, 3], 1);
    }

    #[test]
    fn is_identity() {
        assert!(PermBuf::identity(Degree::new(5)).is_identity());
        assert!(!PermBuf::from_images(vec![1, 0]).unwrap().is_identity());
    }

    #[test]
    fn operators_delegate_to_the_algebra() {
        let p = PermBuf::from_images(vec![1, 2, 0]).unwrap();
        let q = PermBuf::from_images(vec![0, 2, 1]).unwrap();
        assert_eq!(&p * &q, p.product(&q));
        assert_eq!(!&p, p.inverse());

        let mut accumulated = PermBuf::identity(Degree::new(3));
        accumulated *= &p;
        assert_eq!(accumulated, p);
    }

    #[quickcheck]
    fn identity_laws(p: PermBuf) -> bool {
        let id = PermBuf::identity(p.degree());
        id.product(&p) == p && p.product(&id) == p
    }

    #[quickcheck]
    fn inverse_composes_to_the_identity(p: PermBuf) -> bool {
        let id = PermBuf::identity(p.degree());
        p.product(&p.inverse()) == id && p.inverse().product(&p) == id
    }

    #[quickcheck]
    fn inverse_is_an_involution(p: PermBuf) -> bool {
        p.inverse().inverse() == p
    }

    #[quickcheck]
    fn transposition_is_an_involution(p: PermBuf, a: usize, b: usize) -> bool {
        let a = a % p.num_elements();
        let b = b % p.num_elements();
        let twice = p
            .transposition(a, b)
            .unwrap()
            .transposition(a, b)
            .unwrap();
        twice == p
    }

    #[quickcheck]
    fn product_is_associative(p: PermBuf, q: PermBuf, r: PermBuf) -> bool {
        // Degrees of `p`, `q` and `r` are arbitrary, so this also pins down the
        // identity-extension policy
        p.product(&q).product(&r) == p.product(&q.product(&r))
    }
}
