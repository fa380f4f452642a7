//! Shared helpers for ecpool integration tests.
//!
//! Builds codecs, deterministic inputs, and erasure patterns so each test
//! file can focus on one property of the encode → erase → decode pipeline.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use ecpool_erasure::{ErasureCode, ErasureCodeJerasure, ReedSolomonVandermonde, WordSize};

/// Every supported word size.
pub const WORD_SIZES: [WordSize; 3] = [WordSize::W8, WordSize::W16, WordSize::W32];

/// Reed-Solomon Vandermonde codec with explicit parameters.
pub fn rs_codec(k: usize, m: usize, w: WordSize) -> ErasureCodeJerasure<ReedSolomonVandermonde> {
    ErasureCodeJerasure::new(
        ReedSolomonVandermonde::new(k, m, w).expect("valid reed-solomon parameters"),
    )
}

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

/// Indices `0..n`.
pub fn all_chunks(n: usize) -> BTreeSet<usize> {
    (0..n).collect()
}

/// Encode `data` into every chunk.
pub fn encode_all(codec: &dyn ErasureCode, data: &[u8]) -> BTreeMap<usize, Bytes> {
    codec
        .encode(&all_chunks(codec.chunk_count()), data)
        .expect("encode succeeds")
}

/// Copy of `chunks` without the indices in `erased`.
pub fn without(chunks: &BTreeMap<usize, Bytes>, erased: &[usize]) -> BTreeMap<usize, Bytes> {
    chunks
        .iter()
        .filter(|(i, _)| !erased.contains(*i))
        .map(|(&i, c)| (i, c.clone()))
        .collect()
}

/// Concatenate the data chunks and strip the padding.
pub fn reassemble(codec: &dyn ErasureCode, chunks: &BTreeMap<usize, Bytes>, len: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..codec.data_chunk_count() {
        out.extend_from_slice(&chunks[&i]);
    }
    out.truncate(len);
    out
}

/// Every `size`-element subset of `0..n`, in lexicographic order.
pub fn combinations(n: usize, size: usize) -> Vec<Vec<usize>> {
    fn walk(start: usize, n: usize, size: usize, cur: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if cur.len() == size {
            out.push(cur.clone());
            return;
        }
        for i in start..n {
            cur.push(i);
            walk(i + 1, n, size, cur, out);
            cur.pop();
        }
    }

    let mut out = Vec::new();
    walk(0, n, size, &mut Vec::new(), &mut out);
    out
}
