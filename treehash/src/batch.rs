//! Reduce a complete, ordered list of chunk digests to a tree hash.
//!
//! The selected digests form level 0. Each following level is built by hashing adjacent pairs
//! `(left, right)` from the start of the level; if the level has an odd number of digests, the
//! last one is carried to the next level unchanged. Reduction stops when one digest remains.
//!
//! These functions are pure: every call uses its own hasher and shares no state, so they may run
//! concurrently over the same (read-only) digests.
//!
//! Ranges are not checked for alignment with any power-of-two boundary. Any non-empty, in-bounds
//! range is reduced with the same rules, and it is up to the caller to pass a range that is
//! meaningful to its protocol.

use crate::{combine, Error};
use tracing::trace;
use treehash_cryptography::{Digest, Hasher};

/// Compute the tree hash of all `digests`.
///
/// An empty list has no tree hash and is rejected with [Error::StartOutOfRange].
pub fn root<H: Hasher>(digests: &[H::Digest]) -> Result<H::Digest, Error> {
    root_range::<H>(digests, 0, digests.len())
}

/// Compute the tree hash of `count` digests starting at `start`.
pub fn root_range<H: Hasher>(
    digests: &[H::Digest],
    start: usize,
    count: usize,
) -> Result<H::Digest, Error> {
    check_range(digests.len(), start, count)?;
    Ok(reduce::<H>(digests[start..start + count].to_vec()))
}

/// Compute the tree hash of `count` raw digests starting at `start`.
///
/// Every element of `digests`, including those outside the selected range, must be exactly
/// `H::Digest::SIZE` bytes long. A call can therefore be rejected because of a digest that would
/// not have participated in the reduction.
pub fn root_from_bytes<H: Hasher, D: AsRef<[u8]>>(
    digests: &[D],
    start: usize,
    count: usize,
) -> Result<H::Digest, Error> {
    check_range(digests.len(), start, count)?;
    let mut parsed = Vec::with_capacity(digests.len());
    for (index, digest) in digests.iter().enumerate() {
        let bytes = digest.as_ref();
        let digest =
            H::Digest::try_from(bytes).map_err(|_| Error::InvalidDigestLength {
                index,
                expected: H::Digest::SIZE,
                found: bytes.len(),
            })?;
        parsed.push(digest);
    }
    parsed.truncate(start + count);
    parsed.drain(..start);
    Ok(reduce::<H>(parsed))
}

/// Check that `[start, start + count)` is a non-empty range within `len` digests.
fn check_range(len: usize, start: usize, count: usize) -> Result<(), Error> {
    if start >= len {
        return Err(Error::StartOutOfRange { start, len });
    }
    if count == 0 {
        return Err(Error::EmptyRange);
    }
    match start.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(Error::InvalidRange { start, count, len }),
    }
}

/// Reduce a non-empty `level` to a single digest.
fn reduce<H: Hasher>(mut level: Vec<H::Digest>) -> H::Digest {
    let mut hasher = H::new();
    let mut height = 0u32;
    while level.len() > 1 {
        let width = level.len();
        let mut next = Vec::with_capacity(width.div_ceil(2));
        for pair in level.chunks(2) {
            match pair {
                [left, right] => next.push(combine(&mut hasher, left, right)),
                [odd] => next.push(*odd),
                _ => unreachable!("chunks(2) yields one or two digests"),
            }
        }
        trace!(height, width, "reduced level");
        level = next;
        height += 1;
    }
    level[0]
}
