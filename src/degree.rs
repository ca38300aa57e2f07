//! A representation of the degree of a permutation.

use std::fmt::{Debug, Display, Formatter};

use factorial::Factorial;

#[cfg(feature = "serde")]
use serde_crate::{
    de::{Error, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::PermBuf;

/// A newtype over [`usize`] that represents the degree of a permutation - i.e. the size `n` of
/// the set `{0, ..., n-1}` being permuted.  All `Degree`s must contain at least one element;
/// zero-element `Degree`s cannot be created without using incorrect `unsafe` code.
///
/// To create a new `Degree`, you can either create it directly with [`Degree::try_from`] (which
/// returns a [`Result`]) or with [`Degree::new`] (which panics if passed `0`).
///
/// ```
/// use permframe::Degree;
///
/// assert_eq!(Degree::new(5).num_elements(), 5);
/// assert_eq!(Degree::new(100).num_elements(), 100);
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Degree(usize);

impl Degree {
    /// Creates a new `Degree` representing a given number of elements.
    ///
    /// # Panics
    ///
    /// Panics if `num_elements` is zero.
    #[track_caller]
    pub fn new(num_elements: usize) -> Degree {
        Self::try_from(num_elements).expect("Can't create a `Degree` of zero elements")
    }

    /// The number of elements permuted by a permutation of this `Degree`.  This is guaranteed to
    /// be non-zero.
    #[inline(always)]
    pub fn num_elements(self) -> usize {
        self.0
    }

    /// Gets an [`Iterator`] over the elements contained within this `Degree`, in increasing
    /// order.
    pub fn elements(self) -> impl DoubleEndedIterator<Item = usize> {
        0..self.0
    }

    /// Returns `true` if a given element is contained in this `Degree`.
    pub fn contains(self, element: usize) -> bool {
        element < self.0
    }

    /// The number of distinct permutations of this `Degree` - i.e. the factorial of
    /// [`num_elements`](Self::num_elements).
    ///
    /// # Panics
    ///
    /// Panics if the factorial overflows [`usize`].  On 64-bit machines this happens for degrees
    /// over 20, so keep degrees small when enumerating.
    ///
    /// # Example
    /// ```
    /// use permframe::Degree;
    ///
    /// assert_eq!(Degree::new(1).num_perms(), 1);
    /// assert_eq!(Degree::new(5).num_perms(), 120);
    /// ```
    pub fn num_perms(self) -> usize {
        self.0
            .checked_factorial()
            .expect("`usize` overflowed computing the number of permutations")
    }

    /// Decodes an index in `0..self.num_perms()` into a permutation.  Every index decodes to
    /// exactly one permutation and every permutation of this `Degree` is reached by exactly one
    /// index, so the induced order is fixed and reproducible.
    ///
    /// The decode is factorial-base: the index is split into mixed-radix digits with radices
    /// `1, 2, ..., degree` (least significant first), and each digit then selects-and-removes an
    /// element from the working list `[0, ..., degree - 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_perms()`.
    ///
    /// # Example
    /// ```
    /// use permframe::Degree;
    ///
    /// let degree = Degree::new(3);
    /// assert_eq!(degree.nth_perm(0).images(), &[0, 1, 2]);
    /// assert_eq!(degree.nth_perm(4).images(), &[2, 0, 1]);
    /// ```
    #[track_caller]
    pub fn nth_perm(self, index: usize) -> PermBuf {
        let num_perms = self.num_perms();
        assert!(
            index < num_perms,
            "index {} is out of range for the {} permutations of degree {}",
            index,
            num_perms,
            self
        );

        // Split the index into factorial-base digits.  The digit of radix `j + 1` lands `j`
        // places from the back, so `digits[0]` ends up as the most significant digit.
        let mut digits = vec![0; self.0];
        let mut remaining = index;
        for (radix_minus_one, digit) in digits.iter_mut().rev().enumerate() {
            *digit = remaining % (radix_minus_one + 1);
            remaining /= radix_minus_one + 1;
        }

        // Each digit selects one element out of the shrinking pool of unused elements.
        let mut pool: Vec<usize> = self.elements().collect();
        let images: Vec<usize> = digits.iter().map(|&digit| pool.remove(digit)).collect();

        // This unsafety is OK because selection-with-removal uses each element of the pool
        // exactly once, which is precisely the bijection invariant.
        unsafe { PermBuf::from_images_unchecked(images) }
    }

    /// Returns every permutation of this `Degree` exactly once, in the index order of
    /// [`nth_perm`](Self::nth_perm).  The result has [`num_perms`](Self::num_perms) elements, so
    /// this is only usable for small degrees.
    ///
    /// # Example
    /// ```
    /// use permframe::Degree;
    ///
    /// let group = Degree::new(2).symmetric_group();
    /// assert_eq!(group.len(), 2);
    /// assert_eq!(group[0].images(), &[0, 1]);
    /// assert_eq!(group[1].images(), &[1, 0]);
    /// ```
    pub fn symmetric_group(self) -> Vec<PermBuf> {
        (0..self.num_perms()).map(|index| self.nth_perm(index)).collect()
    }
}

impl Debug for Degree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Degree({})", self.0)
    }
}

impl Display for Degree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for Degree {
    type Error = ZeroDegreeError;

    fn try_from(num_elements: usize) -> Result<Self, Self::Error> {
        match num_elements {
            0 => Err(ZeroDegreeError),
            _ => Ok(Degree(num_elements)),
        }
    }
}

/// An error created when attempting to create a [`Degree`] of zero elements.
#[derive(Debug, Clone, Copy)]
pub struct ZeroDegreeError;

impl Display for ZeroDegreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Can't create a `Degree` of zero elements")
    }
}

impl std::error::Error for ZeroDegreeError {}

/* Allow [`Degree`]s to be serialised and deserialised with `serde` */

// Serialise as a u64
#[cfg(feature = "serde")]
impl Serialize for Degree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0 as u64)
    }
}

#[cfg(feature = "serde")]
struct DegreeVisitor;

#[cfg(feature = "serde")]
impl<'de> Visitor<'de> for DegreeVisitor {
    type Value = Degree;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a positive integer")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        let num_elements: usize = v
            .try_into()
            .map_err(|_| E::custom(format!("degree is too large: {}", v)))?;
        Degree::try_from(num_elements).map_err(|_| E::custom("Can't have a degree of zero"))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        let v: u64 = v
            .try_into()
            .map_err(|_| E::custom(format!("negative degree: {}", v)))?;
        self.visit_u64(v)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Degree {
    fn deserialize<D>(deserializer: D) -> Result<Degree, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u64(DegreeVisitor)
    }
}

//////////////////
// TESTING CODE //
//////////////////

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

#[cfg(test)]
impl Arbitrary for Degree {
    fn arbitrary(gen: &mut Gen) -> Self {
        // Cap the degree at 7 so that `num_perms` stays tiny and exhaustive properties run
        // quickly.  The distribution doesn't have to be fair, just useful.
        let num_elements = usize::arbitrary(gen) % 7 + 1;
        Self::new(num_elements)
    }
}
