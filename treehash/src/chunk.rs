//! Hash a byte stream chunk by chunk, retaining every chunk digest.
//!
//! [ChunkHasher] is the leaf stage of a tree hash: it turns stream bytes into the ordered list of
//! chunk digests that [crate::batch] reduces. The position of a digest in that list is its chunk
//! index; no index is stored alongside it.

use crate::{split, Config, Error, Feed};
use tracing::{debug, trace};
use treehash_cryptography::Hasher;

/// Collects one digest per chunk of a single stream.
///
/// A [ChunkHasher] is single-use: the [ChunkHasher::feed] call with `last` set seals it, after
/// which the digests can be read and no more input is accepted.
pub struct ChunkHasher<H: Hasher> {
    cfg: Config,
    hasher: H,

    // Digests of all chunks hashed so far, in stream order.
    hashes: Vec<H::Digest>,

    finalized: bool,
}

impl<H: Hasher> ChunkHasher<H> {
    /// Create a new [ChunkHasher], failing if `cfg` is invalid.
    pub fn new(cfg: Config) -> Result<Self, Error> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            hasher: H::new(),
            hashes: Vec::new(),
            finalized: false,
        })
    }

    /// Hash `bytes`, appending one digest per chunk.
    ///
    /// Unless `last` is set, `bytes.len()` must be a multiple of the chunk size. When `last` is
    /// set, a trailing partial chunk is hashed as the final (short) chunk and the hasher is sealed.
    /// A stream of zero bytes produces no digests at all.
    pub fn feed(&mut self, bytes: &[u8], last: bool) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        let chunks = split(bytes, self.cfg.chunk_size, last)?;
        self.hashes.reserve(chunks.len());
        for chunk in chunks {
            self.hasher.update(chunk);
            self.hashes.push(self.hasher.finalize());
            trace!(chunk = self.hashes.len() - 1, len = chunk.len(), "hashed chunk");
        }
        if last {
            self.finalized = true;
            debug!(chunks = self.hashes.len(), "sealed chunk hasher");
        }
        Ok(())
    }

    /// Return a copy of all chunk digests, in stream order.
    ///
    /// Fails with [Error::NotFinalized] until the final piece has been fed.
    pub fn hashes(&self) -> Result<Vec<H::Digest>, Error> {
        if !self.finalized {
            return Err(Error::NotFinalized);
        }
        Ok(self.hashes.clone())
    }

    /// Consume the hasher and return its chunk digests, in stream order.
    pub fn into_hashes(self) -> Result<Vec<H::Digest>, Error> {
        if !self.finalized {
            return Err(Error::NotFinalized);
        }
        Ok(self.hashes)
    }

    /// Number of chunk digests produced so far.
    pub fn chunks(&self) -> usize {
        self.hashes.len()
    }

    /// Whether the final piece has been fed.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl<H: Hasher> Feed for ChunkHasher<H> {
    fn chunk_size(&self) -> usize {
        self.cfg.chunk_size
    }

    fn feed(&mut self, bytes: &[u8], last: bool) -> Result<(), Error> {
        ChunkHasher::feed(self, bytes, last)
    }
}
