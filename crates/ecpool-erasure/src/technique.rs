//! Coding techniques pluggable into the codec facade.
//!
//! A technique owns everything that depends on how the generator matrix is
//! built: the pad-length rule, the encode primitive, and the decode
//! primitive. The facade handles chunk maps, validation, and buffers.

use std::collections::BTreeSet;

use tracing::debug;

use crate::decoder::matrix_decode;
use crate::encoder::matrix_encode;
use crate::error::ErasureError;
use crate::galois::WordSize;
use crate::layout::pad_length;
use crate::matrix::{Matrix, vandermonde_coding_matrix};
use crate::profile::Profile;

/// Matrix-construction and encode/decode strategy behind a codec.
pub trait Technique: Send + Sync {
    /// Name matched against the `erasure-code-technique` parameter.
    const NAME: &'static str;

    /// Build the technique, including its generator data.
    fn prepare(profile: &Profile) -> Result<Self, ErasureError>
    where
        Self: Sized;

    /// Number of data chunks (k).
    fn data_chunk_count(&self) -> usize;

    /// Number of coding chunks (m).
    fn coding_chunk_count(&self) -> usize;

    /// Padded length for an input of `len` bytes. Must be a multiple of
    /// [`Self::data_chunk_count`].
    fn pad_length(&self, len: usize) -> usize;

    /// Compute the coding blocks from the data blocks.
    fn encode_blocks(&self, data: &[&[u8]], coding: &mut [&mut [u8]]);

    /// Rebuild erased blocks in place. `blocks` holds all `k + m` blocks,
    /// with zeroed buffers at the erased indices.
    fn decode_blocks(
        &self,
        erasures: &[usize],
        want_to_read: &BTreeSet<usize>,
        blocks: &mut [Vec<u8>],
    ) -> Result<(), ErasureError>;
}

/// Reed-Solomon over a Vandermonde-derived generator matrix.
#[derive(Debug, Clone)]
pub struct ReedSolomonVandermonde {
    k: usize,
    m: usize,
    w: WordSize,
    /// `m × k` coding rows. Built once, never mutated.
    matrix: Matrix,
}

impl ReedSolomonVandermonde {
    /// Build the technique for explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ErasureError::InvalidParameters`] if `k` or `m` is zero or
    /// `k + m > 2^w`.
    pub fn new(k: usize, m: usize, w: WordSize) -> Result<Self, ErasureError> {
        let matrix = vandermonde_coding_matrix(k, m, w)?;
        debug!(technique = Self::NAME, k, m, %w, "prepared coding matrix");
        Ok(Self { k, m, w, matrix })
    }

    pub fn word_size(&self) -> WordSize {
        self.w
    }

    /// The `m × k` coding rows.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }
}

impl Technique for ReedSolomonVandermonde {
    const NAME: &'static str = "reed_sol_van";

    fn prepare(profile: &Profile) -> Result<Self, ErasureError> {
        Self::new(profile.k, profile.m, profile.w)
    }

    fn data_chunk_count(&self) -> usize {
        self.k
    }

    fn coding_chunk_count(&self) -> usize {
        self.m
    }

    fn pad_length(&self, len: usize) -> usize {
        pad_length(len, self.k, self.w.bits())
    }

    fn encode_blocks(&self, data: &[&[u8]], coding: &mut [&mut [u8]]) {
        matrix_encode(&self.matrix, self.w, data, coding);
    }

    fn decode_blocks(
        &self,
        erasures: &[usize],
        want_to_read: &BTreeSet<usize>,
        blocks: &mut [Vec<u8>],
    ) -> Result<(), ErasureError> {
        let size = blocks.first().map_or(0, Vec::len);
        if !size.is_multiple_of(self.w.bytes()) {
            return Err(ErasureError::UnalignedChunk {
                size,
                word_bytes: self.w.bytes(),
            });
        }
        matrix_decode(&self.matrix, self.w, true, erasures, want_to_read, blocks)
    }
}
