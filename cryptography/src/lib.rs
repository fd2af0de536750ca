//! Hash primitives consumed by chunked tree hash computations.
//!
//! Tree hash computations never hardcode a hash function. They are written against [Hasher],
//! which fixes the digest length through its associated [Digest] type, so the same chunking
//! and combination logic works for SHA-256 (the default used by cold-storage upload protocols),
//! for MD5 chunk lists, and for any other fixed-output primitive.

use rand::{CryptoRng, Rng};
use std::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::Deref,
};
use thiserror::Error;

pub mod sha256;
pub use sha256::{hash, Sha256};
pub mod blake3;
pub use self::blake3::Blake3;
pub mod md5;
pub use self::md5::Md5;
pub mod utils;

/// Errors that can occur when working with digests.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid digest length: expected {0}, found {1}")]
    InvalidDigestLength(usize, usize),
}

/// An immutable, fixed-length output of a [Hasher].
///
/// Two digests are equal if and only if their bytes are equal.
pub trait Digest:
    AsRef<[u8]>
    + Deref<Target = [u8]>
    + for<'a> TryFrom<&'a [u8], Error = Error>
    + Copy
    + Eq
    + Ord
    + Hash
    + Debug
    + Display
    + Send
    + Sync
    + 'static
{
    /// Length of the digest in bytes.
    const SIZE: usize;
}

/// Interface that tree hash computations rely on for hashing.
///
/// This trait is required to implement the `Clone` trait because it is often
/// part of a struct that is cloned. Implementations do not clone the hasher
/// state, so users should not rely on a clone continuing a computation.
pub trait Hasher: Clone + Send + Sync + 'static {
    /// Digest generated by the hasher.
    type Digest: Digest;

    /// Create a new hasher.
    fn new() -> Self;

    /// Append message to previously recorded data.
    fn update(&mut self, message: &[u8]);

    /// Hash all recorded data and reset the hasher
    /// to the initial state.
    fn finalize(&mut self) -> Self::Digest;

    /// Reset the hasher without generating a hash.
    ///
    /// This function does not need to be called after `finalize`.
    fn reset(&mut self);

    /// Generate a random [Digest].
    ///
    /// # Warning
    ///
    /// This function is typically used for testing and is not recommended
    /// for production use.
    fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self::Digest;

    /// Hash a single message with a fresh hasher.
    fn hash(message: &[u8]) -> Self::Digest {
        let mut hasher = Self::new();
        hasher.update(message);
        hasher.finalize()
    }

    /// Return result of hashing nothing.
    fn empty() -> Self::Digest {
        Self::new().finalize()
    }
}
