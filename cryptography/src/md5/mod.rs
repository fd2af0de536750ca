//! MD5 implementation of the `Hasher` trait.
//!
//! Cold-storage upload protocols accept a per-chunk MD5 list alongside the SHA-256 tree hash, so
//! MD5 is offered for producing chunk digests. It is not collision resistant and should not be
//! used where that matters.

use crate::{utils::hex, Error, Hasher};
use ::md5::{Digest as _, Md5 as IMd5};
use rand::{CryptoRng, Rng};
use std::{
    fmt::{Debug, Display},
    ops::Deref,
};

const DIGEST_LENGTH: usize = 16;

/// Generate an MD5 digest from a message.
pub fn hash(message: &[u8]) -> Digest {
    let array: [u8; DIGEST_LENGTH] = IMd5::digest(message).into();
    Digest::from(array)
}

/// MD5 hasher.
#[derive(Debug)]
pub struct Md5 {
    hasher: IMd5,
}

impl Default for Md5 {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Md5 {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl Hasher for Md5 {
    type Digest = Digest;

    fn new() -> Self {
        Self {
            hasher: IMd5::new(),
        }
    }

    fn update(&mut self, message: &[u8]) {
        self.hasher.update(message);
    }

    fn finalize(&mut self) -> Self::Digest {
        let array: [u8; DIGEST_LENGTH] = self.hasher.finalize_reset().into();
        Self::Digest::from(array)
    }

    fn reset(&mut self) {
        self.hasher = IMd5::new();
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

/// Digest of an MD5 hashing operation.
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
