//! Compute chunked tree hashes over byte streams, in batch or incrementally.
//!
//! A tree hash divides a stream into fixed-size chunks (only the last may be short), hashes
//! each chunk, and then combines the chunk digests pairwise, level by level, until a single
//! root digest remains. A digest left without a partner at the end of a level is carried to the
//! next level unchanged rather than re-hashed.
//!
//! # Example
//!
//! Ten chunks reduce as follows (`H(x, y)` hashes the concatenation `x || y`):
//!
//! ```text
//!    Level   Digests
//!      0     d0      d1      d2      d3      d4      d5      d6      d7      d8      d9
//!      1     H(d0,d1)        H(d2,d3)        H(d4,d5)        H(d6,d7)        H(d8,d9)
//!      2     H(0..3)                         H(4..7)                         H(8,9) carried
//!      3     H(0..7)                                                         H(8,9) carried
//!      4     root = H(H(0..7), H(8,9))
//! ```
//!
//! The same root can be computed in two ways:
//!
//! * [chunk::ChunkHasher] collects every chunk digest, and [batch::root] reduces the complete
//!   list.
//! * [incremental::TreeHasher] folds chunk digests into at most `log2(n) + 1` pending subtree
//!   digests as bytes arrive, so arbitrarily large streams never require the full list.
//!
//! ```rust
//! use treehash::{batch, chunk::ChunkHasher, incremental::TreeHasher, Config};
//! use treehash_cryptography::Sha256;
//!
//! let cfg = Config { chunk_size: 4 };
//! let data = b"0123456789";
//!
//! let mut chunks = ChunkHasher::<Sha256>::new(cfg).unwrap();
//! chunks.feed(&data[..8], false).unwrap();
//! chunks.feed(&data[8..], true).unwrap();
//! let expected = batch::root::<Sha256>(&chunks.hashes().unwrap()).unwrap();
//!
//! let mut tree = TreeHasher::<Sha256>::new(cfg).unwrap();
//! tree.feed(&data[..4], false).unwrap();
//! tree.feed(&data[4..], true).unwrap();
//! assert_eq!(tree.root().unwrap(), expected);
//! ```

use thiserror::Error;
use treehash_cryptography::Hasher;

pub mod batch;
pub mod chunk;
pub mod incremental;
pub mod io;

/// Chunk size used by the reference cold-storage upload protocol.
pub const ONE_MIB: usize = 1024 * 1024;

/// Errors that can occur when computing a tree hash.
#[derive(Error, Debug)]
pub enum Error {
    #[error("already finalized")]
    AlreadyFinalized,
    #[error("not finalized")]
    NotFinalized,
    #[error("chunk size must be positive")]
    InvalidChunkSize,
    #[error("input length {0} is not a multiple of chunk size {1}")]
    UnalignedInput(usize, usize),
    #[error("insufficient data: expected {expected} bytes, found {found}")]
    InsufficientData { expected: u64, found: u64 },
    #[error("invalid digest length at index {index}: expected {expected}, found {found}")]
    InvalidDigestLength {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("range of {count} digests starting at {start} exceeds {len} digests")]
    InvalidRange {
        start: usize,
        count: usize,
        len: usize,
    },
    #[error("start index {start} out of range for {len} digests")]
    StartOutOfRange { start: usize, len: usize },
    #[error("range must contain at least one digest")]
    EmptyRange,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad classification of an [Error].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The operation is not allowed in the current (sealed or unsealed) state.
    InvalidState,
    /// The arguments are malformed.
    InvalidInput,
    /// A start index or count falls outside the supplied digests.
    OutOfRange,
    /// An underlying reader or writer failed.
    Io,
}

impl Error {
    /// Returns the [ErrorKind] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AlreadyFinalized | Error::NotFinalized => ErrorKind::InvalidState,
            Error::InvalidChunkSize
            | Error::UnalignedInput(..)
            | Error::InsufficientData { .. }
            | Error::InvalidDigestLength { .. }
            | Error::InvalidRange { .. } => ErrorKind::InvalidInput,
            Error::StartOutOfRange { .. } | Error::EmptyRange => ErrorKind::OutOfRange,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

/// Configuration for [chunk::ChunkHasher] and [incremental::TreeHasher].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// The number of bytes covered by each chunk digest.
    ///
    /// Every chunk has exactly this size except the last, which may be shorter.
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: ONE_MIB,
        }
    }
}

impl Config {
    /// Returns an error if the configuration cannot be used.
    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }
        Ok(())
    }
}

/// A consumer of stream bytes delivered in chunk-aligned pieces.
pub trait Feed {
    /// The chunk size every non-final piece must be a multiple of.
    fn chunk_size(&self) -> usize;

    /// Consume `bytes`.
    ///
    /// Unless `last` is set, `bytes.len()` must be a multiple of [Feed::chunk_size]. The call
    /// with `last` set seals the consumer: it may carry any number of bytes (including zero), and
    /// every later call fails with [Error::AlreadyFinalized].
    fn feed(&mut self, bytes: &[u8], last: bool) -> Result<(), Error>;
}

/// Hash the concatenation of `left` and `right`.
pub fn combine<H: Hasher>(hasher: &mut H, left: &H::Digest, right: &H::Digest) -> H::Digest {
    hasher.update(left.as_ref());
    hasher.update(right.as_ref());
    hasher.finalize()
}

/// Split `bytes` into chunks of `chunk_size`, rejecting unaligned input unless `last` is set.
///
/// Only the final chunk of a `last` piece can be short.
pub(crate) fn split(
    bytes: &[u8],
    chunk_size: usize,
    last: bool,
) -> Result<std::slice::Chunks<'_, u8>, Error> {
    if !last && bytes.len() % chunk_size != 0 {
        return Err(Error::UnalignedInput(bytes.len(), chunk_size));
    }
    Ok(bytes.chunks(chunk_size))
}
