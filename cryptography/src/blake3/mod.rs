//! BLAKE3 implementation of the `Hasher` trait.
//!
//! Shipped to demonstrate that tree hash computations are independent of the underlying primitive.
//! Enable the `parallel-blake3` feature to let large updates use multiple threads.

use crate::{utils::hex, Error, Hasher};
use ::blake3::Hasher as IBlake3;
use rand::{CryptoRng, Rng};
use std::{
    fmt::{Debug, Display},
    ops::Deref,
};

const DIGEST_LENGTH: usize = ::blake3::OUT_LEN;

/// Generate a BLAKE3 digest from a message.
pub fn hash(message: &[u8]) -> Digest {
    Digest::from(*::blake3::hash(message).as_bytes())
}

/// BLAKE3 hasher.
#[derive(Debug)]
pub struct Blake3 {
    hasher: IBlake3,
}

impl Default for Blake3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Blake3 {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl Hasher for Blake3 {
    type Digest = Digest;

    fn new() -> Self {
        Self {
            hasher: IBlake3::new(),
        }
    }

    fn update(&mut self, message: &[u8]) {
        #[cfg(not(feature = "parallel-blake3"))]
        self.hasher.update(message);

        #[cfg(feature = "parallel-blake3")]
        self.hasher.update_rayon(message);
    }

    fn finalize(&mut self) -> Self::Digest {
        let digest = Digest::from(*self.hasher.finalize().as_bytes());
        self.hasher.reset();
        digest
    }

    fn reset(&mut self) {
        self.hasher.reset();
    }

    fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self::Digest {
        let mut digest = [0u8; DIGEST_LENGTH];
        rng.fill_bytes(&mut digest);
        Self::Digest::from(digest)
    }

    fn hash(message: &[u8]) -> Self::Digest {
        hash(message)
    }
}

/// Digest of a BLAKE3 hashing operation.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Digest([u8; DIGEST_LENGTH]);

impl crate::Digest for Digest {
    const SIZE: usize = DIGEST_LENGTH;
}

impl From<[u8; DIGEST_LENGTH]> for Digest {
    fn from(value: [u8; DIGEST_LENGTH]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; DIGEST_LENGTH] = value
            .try_into()
            .map_err(|_| Error::InvalidDigestLength(DIGEST_LENGTH, value.len()))?;
        Ok(Self(array))
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Digest {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}
