//! Compute a tree hash while the stream is being read, holding O(log n) digests.
//!
//! [TreeHasher] keeps a stack of digests of complete (perfect) subtrees, oldest and largest at
//! the bottom. After `n` chunks the stack holds one digest per set bit of `n`, so it never
//! exceeds `floor(log2(n)) + 1` entries. For example, after 11 chunks (`0b1011`):
//!
//! ```text
//!    Stack (bottom -> top)
//!      H(c0..c7)  H(c8,c9)  c10
//! ```
//!
//! Adding a chunk digest works like incrementing a binary counter: push it, then, for every
//! trailing zero bit of the new count, pop `right` and `left` and push `H(left || right)`.
//!
//! At the end, the stack is folded starting from the top: the most recent (smallest) subtree is
//! the initial accumulator, and each older subtree below it is hashed in on the left. This is
//! exactly how [crate::batch] carries an odd trailing digest up through its levels, so both
//! produce the same root for every chunk count.

use crate::{combine, split, Config, Error, Feed};
use tracing::{debug, trace};
use treehash_cryptography::Hasher;

/// Incrementally computes the tree hash of a single stream.
///
/// A [TreeHasher] is single-use: the [TreeHasher::feed] call with `last` set computes the root
/// and seals it.
pub struct TreeHasher<H: Hasher> {
    cfg: Config,
    hasher: H,

    // Digests of complete subtrees, in decreasing order of height.
    stack: Vec<H::Digest>,

    // Number of chunks hashed so far.
    chunks: u64,

    // Set once the final piece has been fed.
    root: Option<H::Digest>,
}

impl<H: Hasher> TreeHasher<H> {
    /// Create a new [TreeHasher], failing if `cfg` is invalid.
    pub fn new(cfg: Config) -> Result<Self, Error> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            hasher: H::new(),
            stack: Vec::new(),
            chunks: 0,
            root: None,
        })
    }

    /// Hash `bytes` into the tree.
    ///
    /// Unless `last` is set, `bytes.len()` must be a multiple of the chunk size. When `last` is
    /// set, a trailing partial chunk is hashed as the final (short) chunk, the root is computed,
    /// and the hasher is sealed.
    pub fn feed(&mut self, bytes: &[u8], last: bool) -> Result<(), Error> {
        if self.root.is_some() {
            return Err(Error::AlreadyFinalized);
        }
        for chunk in split(bytes, self.cfg.chunk_size, last)? {
            self.hasher.update(chunk);
            let digest = self.hasher.finalize();
            self.add(digest);
        }
        if last {
            let root = self.fold();
            debug!(chunks = self.chunks, %root, "computed tree hash");
            self.root = Some(root);
        }
        Ok(())
    }

    /// Return the tree hash of the stream.
    ///
    /// Fails with [Error::NotFinalized] until the final piece has been fed.
    pub fn root(&self) -> Result<H::Digest, Error> {
        self.root.ok_or(Error::NotFinalized)
    }

    /// Number of chunks hashed so far.
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    /// Number of subtree digests currently held.
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    /// Whether the final piece has been fed.
    pub fn is_finalized(&self) -> bool {
        self.root.is_some()
    }

    /// Push a chunk digest, merging every pair of equal-height subtrees it completes.
    fn add(&mut self, digest: H::Digest) {
        self.stack.push(digest);
        self.chunks += 1;
        let mut count = self.chunks;
        while count % 2 == 0 {
            count >>= 1;

            // The stack holds one entry per set bit of the previous count, plus the new digest,
            // so at least two entries are present whenever the count is even.
            let len = self.stack.len();
            let right = self.stack[len - 1];
            let left = self.stack[len - 2];
            self.stack.truncate(len - 2);
            self.stack.push(combine(&mut self.hasher, &left, &right));
        }
        trace!(chunks = self.chunks, pending = self.stack.len(), "added chunk");
    }

    /// Fold the pending subtrees into the root, or return the empty digest if no chunks were hashed.
    fn fold(&mut self) -> H::Digest {
        let stack = std::mem::take(&mut self.stack);
        let mut subtrees = stack.into_iter().rev();
        let Some(mut root) = subtrees.next() else {
            return H::empty();
        };
        for subtree in subtrees {
            root = combine(&mut self.hasher, &subtree, &root);
        }
        root
    }
}

impl<H: Hasher> Feed for TreeHasher<H> {
    fn chunk_size(&self) -> usize {
        self.cfg.chunk_size
    }

    fn feed(&mut self, bytes: &[u8], last: bool) -> Result<(), Error> {
        TreeHasher::feed(self, bytes, last)
    }
}
