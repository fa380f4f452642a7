//! Codec facade consumed by the storage layer.
//!
//! [`ErasureCode`] is the stable, object-safe interface. [`ErasureCodeJerasure`]
//! implements it for any [`Technique`], so the concrete strategy is fixed
//! when the codec is constructed.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::error::ErasureError;
use crate::layout::ChunkLayout;
use crate::profile::Profile;
use crate::technique::{ReedSolomonVandermonde, Technique};

/// Encode/decode interface shared by every erasure code.
///
/// Chunk indices `0..k` are data chunks, `k..k+m` are coding chunks.
pub trait ErasureCode: Send + Sync {
    /// Total number of chunks (k + m).
    fn chunk_count(&self) -> usize;

    /// Number of data chunks (k).
    fn data_chunk_count(&self) -> usize;

    /// Size of every chunk produced when encoding `object_len` bytes.
    fn chunk_size(&self, object_len: usize) -> usize;

    /// Pick the chunks to read in order to decode `want_to_read`.
    ///
    /// # Errors
    ///
    /// Returns [`ErasureError::NotEnoughChunks`] if fewer than `k` chunks
    /// are available.
    fn minimum_to_decode(
        &self,
        want_to_read: &BTreeSet<usize>,
        available: &BTreeSet<usize>,
    ) -> Result<BTreeSet<usize>, ErasureError>;

    /// Same as [`Self::minimum_to_decode`] over the keys of a cost map.
    ///
    /// Every set of `k` chunks costs the same to decode from, so costs are
    /// accepted but do not bias the choice.
    fn minimum_to_decode_with_cost(
        &self,
        want_to_read: &BTreeSet<usize>,
        available: &BTreeMap<usize, u32>,
    ) -> Result<BTreeSet<usize>, ErasureError> {
        let available: BTreeSet<usize> = available.keys().copied().collect();
        self.minimum_to_decode(want_to_read, &available)
    }

    /// Pad and split `input`, compute the coding chunks, and return the
    /// chunks listed in `want_to_encode`.
    fn encode(
        &self,
        want_to_encode: &BTreeSet<usize>,
        input: &[u8],
    ) -> Result<BTreeMap<usize, Bytes>, ErasureError>;

    /// Rebuild missing chunks from at least `k` available ones.
    ///
    /// The result holds every available chunk, every data chunk, and every
    /// coding chunk listed in `want_to_read`.
    fn decode(
        &self,
        want_to_read: &BTreeSet<usize>,
        chunks: &BTreeMap<usize, Bytes>,
    ) -> Result<BTreeMap<usize, Bytes>, ErasureError>;
}

/// Build a shareable codec from string parameters, selecting the technique
/// named by `erasure-code-technique`.
///
/// # Errors
///
/// Returns [`ErasureError::UnsupportedTechnique`] for unknown technique
/// names, or whatever the technique's preparation reports.
pub fn from_parameters(
    parameters: &HashMap<String, String>,
) -> Result<Arc<dyn ErasureCode>, ErasureError> {
    from_profile(&Profile::parse(parameters))
}

/// Build a shareable codec from an already parsed profile.
///
/// # Errors
///
/// Same as [`from_parameters`].
pub fn from_profile(profile: &Profile) -> Result<Arc<dyn ErasureCode>, ErasureError> {
    if profile.technique == ReedSolomonVandermonde::NAME {
        let codec = ErasureCodeJerasure::<ReedSolomonVandermonde>::from_profile(profile)?;
        return Ok(Arc::new(codec));
    }
    Err(ErasureError::UnsupportedTechnique(profile.technique.clone()))
}

/// Matrix-based erasure code over a pluggable [`Technique`].
///
/// Immutable after construction; share it across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ErasureCodeJerasure<T> {
    technique: T,
}

impl<T: Technique> ErasureCodeJerasure<T> {
    /// Wrap an already prepared technique.
    pub fn new(technique: T) -> Self {
        Self { technique }
    }

    /// Parse `parameters` and prepare the technique.
    pub fn init(parameters: &HashMap<String, String>) -> Result<Self, ErasureError> {
        Self::from_profile(&Profile::parse(parameters))
    }

    /// Prepare the technique from a typed profile.
    ///
    /// # Errors
    ///
    /// Returns [`ErasureError::UnsupportedTechnique`] if the profile names
    /// a different technique than `T`.
    pub fn from_profile(profile: &Profile) -> Result<Self, ErasureError> {
        if profile.technique != T::NAME {
            return Err(ErasureError::UnsupportedTechnique(profile.technique.clone()));
        }
        debug!(technique = T::NAME, "initializing erasure code");
        Ok(Self::new(T::prepare(profile)?))
    }

    pub fn technique(&self) -> &T {
        &self.technique
    }

    fn check_indices<'a>(
        &self,
        indices: impl IntoIterator<Item = &'a usize>,
    ) -> Result<(), ErasureError> {
        let total = self.chunk_count();
        match indices.into_iter().find(|&&i| i >= total) {
            Some(&index) => Err(ErasureError::InvalidChunkIndex { index, total }),
            None => Ok(()),
        }
    }
}

impl<T: Technique> ErasureCode for ErasureCodeJerasure<T> {
    fn chunk_count(&self) -> usize {
        self.technique.data_chunk_count() + self.technique.coding_chunk_count()
    }

    fn data_chunk_count(&self) -> usize {
        self.technique.data_chunk_count()
    }

    fn chunk_size(&self, object_len: usize) -> usize {
        self.technique.pad_length(object_len) / self.data_chunk_count()
    }

    fn minimum_to_decode(
        &self,
        want_to_read: &BTreeSet<usize>,
        available: &BTreeSet<usize>,
    ) -> Result<BTreeSet<usize>, ErasureError> {
        self.check_indices(want_to_read)?;
        self.check_indices(available)?;

        let k = self.data_chunk_count();
        if available.len() < k {
            return Err(ErasureError::NotEnoughChunks {
                needed: k,
                got: available.len(),
            });
        }
        Ok(available.iter().take(k).copied().collect())
    }

    fn encode(
        &self,
        want_to_encode: &BTreeSet<usize>,
        input: &[u8],
    ) -> Result<BTreeMap<usize, Bytes>, ErasureError> {
        self.check_indices(want_to_encode)?;

        let k = self.technique.data_chunk_count();
        let m = self.technique.coding_chunk_count();
        let padded_len = self.technique.pad_length(input.len());
        let layout = ChunkLayout::new(k, m, input.len(), padded_len)?;

        let mut buffer = layout.working_buffer(input);
        let blocksize = layout.blocksize();
        if blocksize > 0 {
            let (data_region, coding_region) = buffer.split_at_mut(layout.data_len());
            let data: Vec<&[u8]> = data_region.chunks_exact(blocksize).collect();
            let mut coding: Vec<&mut [u8]> = coding_region.chunks_exact_mut(blocksize).collect();
            self.technique.encode_blocks(&data, &mut coding);
        }

        debug!(
            k,
            m,
            input_len = input.len(),
            padded_len,
            blocksize,
            "encoded buffer into chunks"
        );

        let buffer = buffer.freeze();
        Ok(want_to_encode
            .iter()
            .map(|&i| (i, buffer.slice(layout.range(i))))
            .collect())
    }

    fn decode(
        &self,
        want_to_read: &BTreeSet<usize>,
        chunks: &BTreeMap<usize, Bytes>,
    ) -> Result<BTreeMap<usize, Bytes>, ErasureError> {
        self.check_indices(want_to_read)?;
        self.check_indices(chunks.keys())?;

        let k = self.data_chunk_count();
        let total = self.chunk_count();
        if chunks.len() < k {
            return Err(ErasureError::NotEnoughChunks {
                needed: k,
                got: chunks.len(),
            });
        }

        let blocksize = chunks.values().next().map_or(0, Bytes::len);
        if let Some((&index, chunk)) = chunks.iter().find(|(_, c)| c.len() != blocksize) {
            return Err(ErasureError::ChunkSizeMismatch {
                index,
                expected: blocksize,
                got: chunk.len(),
            });
        }

        let erasures: Vec<usize> = (0..total).filter(|i| !chunks.contains_key(i)).collect();
        if erasures.is_empty() {
            return Ok(chunks.clone());
        }

        let mut blocks: Vec<Vec<u8>> = (0..total)
            .map(|i| chunks.get(&i).map_or_else(|| vec![0; blocksize], |c| c.to_vec()))
            .collect();
        self.technique
            .decode_blocks(&erasures, want_to_read, &mut blocks)?;

        debug!(
            k,
            m = total - k,
            blocksize,
            erasures = erasures.len(),
            "decoded chunks"
        );

        let mut decoded = BTreeMap::new();
        for (i, block) in blocks.into_iter().enumerate() {
            if let Some(chunk) = chunks.get(&i) {
                decoded.insert(i, chunk.clone());
            } else if i < k || want_to_read.contains(&i) {
                decoded.insert(i, Bytes::from(block));
            }
        }
        Ok(decoded)
    }
}
