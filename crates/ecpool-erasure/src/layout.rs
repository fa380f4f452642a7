//! Padding and chunk layout for the encode working buffer.
//!
//! The working buffer holds `k` data blocks followed by `m` coding blocks,
//! all `blocksize` bytes long. Chunk ranges are validated once here so the
//! encoder can slice without re-deriving bounds.

use std::io;
use std::ops::Range;

use bytes::BytesMut;

use crate::error::ErasureError;

/// Alignment unit in bytes, multiplied by `k * w` to get the pad boundary.
const ALIGNMENT_WORD: usize = 4;

/// Smallest length `>= len` divisible by `k * w * 4`.
pub fn pad_length(len: usize, k: usize, w_bits: u32) -> usize {
    len.next_multiple_of(k * w_bits as usize * ALIGNMENT_WORD)
}

/// Byte layout of one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    k: usize,
    m: usize,
    blocksize: usize,
}

impl ChunkLayout {
    /// Lay out `input_len` bytes padded to `padded_len` across `k` data
    /// and `m` coding blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ErasureError::Io`] if the padded length is shorter than
    /// the input or does not split evenly into `k` blocks.
    pub fn new(
        k: usize,
        m: usize,
        input_len: usize,
        padded_len: usize,
    ) -> Result<Self, ErasureError> {
        if padded_len < input_len || !padded_len.is_multiple_of(k) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("padded length {padded_len} cannot hold {input_len} bytes in {k} blocks"),
            )
            .into());
        }
        Ok(Self {
            k,
            m,
            blocksize: padded_len / k,
        })
    }

    pub fn blocksize(&self) -> usize {
        self.blocksize
    }

    /// Bytes occupied by the data blocks.
    pub fn data_len(&self) -> usize {
        self.blocksize * self.k
    }

    /// Bytes occupied by data and coding blocks together.
    pub fn total_len(&self) -> usize {
        self.blocksize * (self.k + self.m)
    }

    /// Byte range of chunk `index` inside the working buffer.
    pub fn range(&self, index: usize) -> Range<usize> {
        debug_assert!(index < self.k + self.m);
        let start = index * self.blocksize;
        start..start + self.blocksize
    }

    /// Zeroed working buffer with `input` copied into the data region.
    pub fn working_buffer(&self, input: &[u8]) -> BytesMut {
        let mut buffer = BytesMut::zeroed(self.total_len());
        buffer[..input.len()].copy_from_slice(input);
        buffer
    }
}
