#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use treehash::{batch, ErrorKind};
use treehash_cryptography::{Digest, Hasher, Sha256};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    digests: Vec<Vec<u8>>,
    start: u16,
    count: u16,
}

fn fuzz(input: FuzzInput) {
    let start = input.start as usize;
    let count = input.count as usize;
    let len = input.digests.len();
    let result = batch::root_from_bytes::<Sha256, _>(&input.digests, start, count);

    if start >= len || count == 0 {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::OutOfRange);
        return;
    }
    if start + count > len {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);
        return;
    }
    let valid = input
        .digests
        .iter()
        .all(|digest| digest.len() == <Sha256 as Hasher>::Digest::SIZE);
    if !valid {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);
        return;
    }

    // Matches the typed entry point
    let typed: Vec<_> = input
        .digests
        .iter()
        .map(|digest| <Sha256 as Hasher>::Digest::try_from(digest.as_slice()).unwrap())
        .collect();
    let expected = batch::root_range::<Sha256>(&typed, start, count).unwrap();
    assert_eq!(result.unwrap(), expected);
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
