//! Drive a [Feed] from `std::io` sources.
//!
//! Hashing is kept separate from moving bytes: [copy] reads chunk-aligned blocks from a reader,
//! hands each block to a [Feed], and passes it through to a writer unchanged. [digest] does the
//! same without a writer. [RangeReader] restricts a seekable source to a sub-range, so a part of a
//! larger file can be hashed on its own.
//!
//! None of these helpers close the underlying source. To keep using it afterwards, pass a
//! mutable reference (`&mut R` is itself a reader, writer, and seeker).

use crate::{Error, Feed};
use std::io::{self, Read, Seek, SeekFrom, Write};
use tracing::debug;

/// Minimum number of bytes read from the source per block, rounded up to whole chunks.
const MIN_BLOCK_SIZE: usize = 64 * 1024;

/// Exposes `len` bytes of an inner source, starting at `start`.
///
/// Positions are relative to `start`. Reads stop at the end of the range even if the inner
/// source continues. The range is read-only.
pub struct RangeReader<R> {
    inner: R,
    start: u64,
    len: u64,

    // Position relative to `start`. May exceed `len` after seeking past the end.
    pos: u64,
}

impl<R: Read + Seek> RangeReader<R> {
    /// Create a [RangeReader] over `[start, start + len)` of `inner` and seek `inner` to `start`.
    ///
    /// Fails with [Error::InsufficientData] if `inner` ends before `start + len`.
    pub fn new(mut inner: R, start: u64, len: u64) -> Result<Self, Error> {
        let available = inner.seek(SeekFrom::End(0))?;
        let end = start.saturating_add(len);
        if end > available {
            return Err(Error::InsufficientData {
                expected: end,
                found: available,
            });
        }
        inner.seek(SeekFrom::Start(start))?;
        Ok(Self {
            inner,
            start,
            len,
            pos: 0,
        })
    }
}

impl<R> RangeReader<R> {
    /// Length of the range in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get a reference to the inner source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Return the inner source. Its position is wherever the range left it.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for RangeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let max = remaining.min(buf.len() as u64) as usize;
        let n = self.inner.read(&mut buf[..max])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Seek> Seek for RangeReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
        }
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of range")
        })?;
        let absolute = self.start.checked_add(target).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek position overflows")
        })?;
        self.inner.seek(SeekFrom::Start(absolute))?;
        self.pos = target;
        Ok(target)
    }
}

/// Copy all bytes from `reader` to `writer`, feeding them to `feed` on the way.
///
/// Bytes are delivered to `feed` in chunk-aligned blocks; the block that reaches the end of
/// `reader` is delivered with `last` set, sealing `feed`. Each block is fed before it is written,
/// so a block rejected by `feed` never reaches `writer`. Returns the number of bytes copied.
pub fn copy<R, W, F>(mut reader: R, mut writer: W, feed: &mut F) -> Result<u64, Error>
where
    R: Read,
    W: Write,
    F: Feed + ?Sized,
{
    let chunk_size = feed.chunk_size();
    if chunk_size == 0 {
        return Err(Error::InvalidChunkSize);
    }
    let block_size = chunk_size * (MIN_BLOCK_SIZE / chunk_size).max(1);
    let mut block = vec![0u8; block_size];
    let mut total = 0u64;
    loop {
        let filled = fill(&mut reader, &mut block)?;
        let last = filled < block.len();
        feed.feed(&block[..filled], last)?;
        writer.write_all(&block[..filled])?;
        total += filled as u64;
        if last {
            break;
        }
    }
    writer.flush()?;
    debug!(bytes = total, block_size, "copied stream");
    Ok(total)
}

/// Feed all bytes from `reader` to `feed`, sealing it at the end. Returns the number of bytes read.
pub fn digest<R, F>(reader: R, feed: &mut F) -> Result<u64, Error>
where
    R: Read,
    F: Feed + ?Sized,
{
    copy(reader, io::sink(), feed)
}

/// Read from `reader` until `buf` is full or the reader is exhausted.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{batch, chunk::ChunkHasher, incremental::TreeHasher, Config, ErrorKind};
    use rand::{rngs::StdRng, RngCore, SeedableRng};
    use std::io::Cursor;
    use test_case::test_case;
    use treehash_cryptography::{Blake3, Hasher, Sha256};

    fn data(len: usize) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(len as u64);
        let mut data = vec![0u8; len];
        rng.fill_bytes(&mut data);
        data
    }

    /// Returns at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    /// Fails after yielding `ok` bytes.
    struct Broken {
        ok: usize,
    }

    impl Read for Broken {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.ok == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken"));
            }
            let n = self.ok.min(buf.len());
            buf[..n].fill(0);
            self.ok -= n;
            Ok(n)
        }
    }

    fn tree_root(cfg: Config, bytes: &[u8]) -> treehash_cryptography::sha256::Digest {
        let mut tree = TreeHasher::<Sha256>::new(cfg).unwrap();
        tree.feed(bytes, true).unwrap();
        tree.root().unwrap()
    }

    #[test]
    fn test_range_reader_reads_range() {
        let bytes = data(100);
        let mut range = RangeReader::new(Cursor::new(bytes.clone()), 10, 20).unwrap();
        assert_eq!(range.len(), 20);
        let mut out = Vec::new();
        range.read_to_end(&mut out).unwrap();
        assert_eq!(out, &bytes[10..30]);

        // Exhausted
        let mut buf = [0u8; 4];
        assert_eq!(range.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_range_reader_seek() {
        let bytes = data(100);
        let mut range = RangeReader::new(Cursor::new(bytes.clone()), 10, 20).unwrap();
        let mut buf = [0u8; 5];

        assert_eq!(range.seek(SeekFrom::Start(5)).unwrap(), 5);
        range.read_exact(&mut buf).unwrap();
        assert_eq!(buf, bytes[15..20]);

        assert_eq!(range.seek(SeekFrom::End(-5)).unwrap(), 15);
        range.read_exact(&mut buf).unwrap();
        assert_eq!(buf, bytes[25..30]);

        assert_eq!(range.seek(SeekFrom::Current(-10)).unwrap(), 10);
        range.read_exact(&mut buf).unwrap();
        assert_eq!(buf, bytes[20..25]);

        // Before the start of the range
        let err = range.seek(SeekFrom::Current(-100)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        // Past the end reads nothing
        range.seek(SeekFrom::Start(50)).unwrap();
        assert_eq!(range.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_range_reader_rejects_short_source() {
        let err = RangeReader::new(Cursor::new(data(10)), 5, 6)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::InsufficientData {
                expected: 11,
                found: 10
            }
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = RangeReader::new(Cursor::new(data(10)), 1, u64::MAX)
            .err()
            .unwrap();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }

    #[test]
    fn test_range_reader_leaves_source_open() {
        let bytes = data(64);
        let mut cursor = Cursor::new(bytes.clone());
        {
            let mut range = RangeReader::new(&mut cursor, 8, 8).unwrap();
            let mut buf = [0u8; 8];
            range.read_exact(&mut buf).unwrap();
        }
        assert_eq!(cursor.position(), 16);

        // The owned source is handed back where the range left it.
        let mut range = RangeReader::new(cursor, 4, 8).unwrap();
        assert_eq!(range.get_ref().position(), 4);
        let mut buf = [0u8; 3];
        range.read_exact(&mut buf).unwrap();
        assert_eq!(buf, bytes[4..7]);
        let mut cursor = range.into_inner();
        assert_eq!(cursor.position(), 7);
        cursor.set_position(16);
        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, &bytes[16..]);
    }

    #[test_case(0; "empty")]
    #[test_case(1; "one byte")]
    #[test_case(4096; "one chunk")]
    #[test_case(MIN_BLOCK_SIZE; "one block")]
    #[test_case(MIN_BLOCK_SIZE * 2 + 4096 + 7; "blocks and a tail")]
    fn test_copy_passes_bytes_through(len: usize) {
        let cfg = Config { chunk_size: 4096 };
        let bytes = data(len);
        let mut tree = TreeHasher::<Sha256>::new(cfg).unwrap();
        let mut out = Vec::new();
        let copied = copy(Cursor::new(&bytes), &mut out, &mut tree).unwrap();
        assert_eq!(copied, len as u64);
        assert_eq!(out, bytes);
        assert_eq!(tree.root().unwrap(), tree_root(cfg, &bytes));
    }

    #[test]
    fn test_digest_chunk_hasher() {
        let cfg = Config { chunk_size: 1000 };
        let bytes = data(10_500);
        let mut chunks = ChunkHasher::<Blake3>::new(cfg).unwrap();
        assert_eq!(digest(bytes.as_slice(), &mut chunks).unwrap(), 10_500);
        let hashes = chunks.hashes().unwrap();
        assert_eq!(hashes.len(), 11);
        assert_eq!(hashes[10], Blake3::hash(&bytes[10_000..]));
    }

    #[test]
    fn test_digest_short_reads() {
        let cfg = Config { chunk_size: 7 };
        let bytes = data(1000);
        let mut tree = TreeHasher::<Sha256>::new(cfg).unwrap();
        let reader = Trickle {
            data: &bytes,
            step: 3,
        };
        digest(reader, &mut tree).unwrap();
        assert_eq!(tree.root().unwrap(), tree_root(cfg, &bytes));
    }

    #[test]
    fn test_digest_range_of_stream() {
        let cfg = Config { chunk_size: 512 };
        let bytes = data(10_000);
        let mut source = Cursor::new(bytes.clone());
        let range = RangeReader::new(&mut source, 1000, 3000).unwrap();
        let mut chunks = ChunkHasher::<Sha256>::new(cfg).unwrap();
        digest(range, &mut chunks).unwrap();
        let root = batch::root::<Sha256>(&chunks.hashes().unwrap()).unwrap();
        assert_eq!(root, tree_root(cfg, &bytes[1000..4000]));
    }

    #[test]
    fn test_copy_reader_error() {
        let mut tree = TreeHasher::<Sha256>::new(Config { chunk_size: 16 }).unwrap();
        let err = digest(Broken { ok: 100 }, &mut tree).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!tree.is_finalized());
    }

    #[test]
    fn test_copy_into_sealed_feed() {
        let mut tree = TreeHasher::<Sha256>::new(Config { chunk_size: 16 }).unwrap();
        tree.feed(&[], true).unwrap();
        let mut out = Vec::new();
        let err = copy(Cursor::new(data(32)), &mut out, &mut tree).unwrap_err();
        assert!(matches!(err, Error::AlreadyFinalized));
        assert!(out.is_empty());
    }

    #[test]
    fn test_copy_dyn_feed() {
        let cfg = Config { chunk_size: 64 };
        let bytes = data(200);
        let mut tree = TreeHasher::<Sha256>::new(cfg).unwrap();
        let feed: &mut dyn Feed = &mut tree;
        digest(bytes.as_slice(), feed).unwrap();
        assert_eq!(tree.root().unwrap(), tree_root(cfg, &bytes));
    }
}
