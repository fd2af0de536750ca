#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use treehash::{batch, chunk::ChunkHasher, incremental::TreeHasher, Config};
use treehash_cryptography::{Hasher, Sha256};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    chunk_size: u8,
    data: Vec<u8>,
    // Number of chunks in each non-final piece.
    pieces: Vec<u8>,
}

fn fuzz(input: FuzzInput) {
    let cfg = Config {
        chunk_size: input.chunk_size as usize + 1,
    };
    let mut chunks = ChunkHasher::<Sha256>::new(cfg).unwrap();
    let mut tree = TreeHasher::<Sha256>::new(cfg).unwrap();

    let mut offset = 0;
    for piece in input.pieces {
        let len = piece as usize * cfg.chunk_size;
        if offset + len > input.data.len() {
            break;
        }
        let bytes = &input.data[offset..offset + len];
        chunks.feed(bytes, false).unwrap();
        tree.feed(bytes, false).unwrap();
        offset += len;
    }
    chunks.feed(&input.data[offset..], true).unwrap();
    tree.feed(&input.data[offset..], true).unwrap();

    let hashes = chunks.hashes().unwrap();
    assert_eq!(hashes.len(), input.data.len().div_ceil(cfg.chunk_size));
    let root = tree.root().unwrap();
    match batch::root::<Sha256>(&hashes) {
        Ok(expected) => assert_eq!(root, expected),
        Err(_) => {
            assert!(input.data.is_empty());
            assert_eq!(root, Sha256::empty());
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
