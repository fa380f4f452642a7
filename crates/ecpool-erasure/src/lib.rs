//! Reed-Solomon erasure coding over GF(2^w).
//!
//! This crate provides:
//! - [`ErasureCode`] — the interface the storage layer calls: `encode`,
//!   `decode`, `minimum_to_decode`, `minimum_to_decode_with_cost`.
//! - [`ErasureCodeJerasure`] — the matrix-based implementation, generic
//!   over a [`Technique`].
//! - [`ReedSolomonVandermonde`] — a systematic code whose generator matrix
//!   is derived from a Vandermonde matrix; any `k` of the `k + m` chunks
//!   rebuild the input.
//! - [`Profile`] — lenient parsing of `erasure-code-*` string parameters.
//!
//! Input is zero-padded to a multiple of `k * w * 4` bytes, so every chunk
//! is a whole number of field words. Encoded chunks are zero-copy [`Bytes`]
//! views of one working buffer.

mod codec;
mod decoder;
mod encoder;
mod error;
pub mod galois;
mod layout;
pub mod matrix;
mod profile;
mod technique;

pub use bytes::Bytes;
pub use codec::{ErasureCode, ErasureCodeJerasure, from_parameters, from_profile};
pub use error::ErasureError;
pub use galois::WordSize;
pub use layout::{ChunkLayout, pad_length};
pub use profile::{
    DEFAULT_K, DEFAULT_M, DEFAULT_TECHNIQUE, DEFAULT_W, K_KEY, M_KEY, Profile, TECHNIQUE_KEY,
    W_KEY,
};
pub use technique::{ReedSolomonVandermonde, Technique};
