//! Error types for erasure coding operations.

/// Errors that can occur while building a codec or encoding/decoding chunks.
#[derive(Debug, thiserror::Error)]
pub enum ErasureError {
    /// Fewer than `k` chunks were available.
    #[error("not enough chunks: need {needed}, got {got}")]
    NotEnoughChunks {
        /// Minimum chunks required (k).
        needed: usize,
        /// Chunks actually available.
        got: usize,
    },

    /// A chunk index outside `0..k+m` was supplied.
    #[error("chunk index {index} out of range for {total} chunks")]
    InvalidChunkIndex {
        /// The offending index.
        index: usize,
        /// Total chunk count (k + m).
        total: usize,
    },

    /// Chunks handed to the decoder do not share one block size.
    #[error("chunk {index} is {got} bytes, expected {expected}")]
    ChunkSizeMismatch {
        /// Index of the first chunk with a different size.
        index: usize,
        /// Block size taken from the first available chunk.
        expected: usize,
        /// Size of the offending chunk.
        got: usize,
    },

    /// The block size is not a whole number of field words.
    #[error("chunk size {size} is not a multiple of the {word_bytes}-byte field word")]
    UnalignedChunk {
        /// Block size in bytes.
        size: usize,
        /// Field word width in bytes.
        word_bytes: usize,
    },

    /// Codec parameters cannot produce a valid generator matrix.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The requested technique is not implemented.
    #[error("unsupported technique: {0}")]
    UnsupportedTechnique(String),

    /// A matrix that must be invertible turned out to be singular.
    #[error("singular matrix")]
    SingularMatrix,

    /// The working buffer could not be laid out consistently.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
