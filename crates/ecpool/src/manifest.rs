//! On-disk chunk directory layout.
//!
//! `ecpool encode` writes one file per chunk (`chunk.<index>`) next to a
//! postcard-encoded [`Manifest`]. The manifest pins the codec parameters and
//! records a BLAKE3 digest per chunk, so a chunk file that changed on disk is
//! treated as missing instead of poisoning the decode.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ecpool_erasure::{K_KEY, M_KEY, TECHNIQUE_KEY, W_KEY, WordSize};
use serde::{Deserialize, Serialize};

/// Manifest format version written by this build.
pub const MANIFEST_VERSION: u8 = 1;

/// File name of the manifest inside a chunk directory.
pub const MANIFEST_FILE: &str = "manifest";

/// Describes one encoded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version.
    pub version: u8,
    /// Technique name.
    pub technique: String,
    /// Number of data chunks.
    pub k: u32,
    /// Number of coding chunks.
    pub m: u32,
    /// Galois field word size in bits.
    pub w: u32,
    /// Size of the input before padding.
    pub original_size: u64,
    /// Size of every chunk.
    pub chunk_size: u64,
    /// `blake3(chunk)` for chunk `0..k+m`.
    pub digests: Vec<[u8; 32]>,
}

impl Manifest {
    /// Codec parameters that reproduce the code used at encode time.
    pub fn parameters(&self) -> HashMap<String, String> {
        HashMap::from([
            (TECHNIQUE_KEY.to_string(), self.technique.clone()),
            (K_KEY.to_string(), self.k.to_string()),
            (M_KEY.to_string(), self.m.to_string()),
            (W_KEY.to_string(), self.w.to_string()),
        ])
    }

    /// Whether `data` matches the recorded digest of chunk `index`.
    pub fn verify(&self, index: usize, data: &[u8]) -> bool {
        self.digests
            .get(index)
            .is_some_and(|d| *d == <[u8; 32]>::from(blake3::hash(data)))
    }

    /// Write the manifest into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let bytes = postcard::to_allocvec(self).context("failed to serialize manifest")?;
        let path = dir.join(MANIFEST_FILE);
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Read and validate the manifest in `dir`.
    pub fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let bytes =
            std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let manifest: Manifest =
            postcard::from_bytes(&bytes).context("failed to deserialize manifest")?;

        if manifest.version != MANIFEST_VERSION {
            bail!(
                "unsupported manifest version {}, this build supports version {}",
                manifest.version,
                MANIFEST_VERSION
            );
        }
        if manifest.k == 0 || manifest.m == 0 {
            bail!(
                "manifest records k={} and m={}, both must be at least 1",
                manifest.k,
                manifest.m
            );
        }
        if WordSize::from_bits(manifest.w).is_none() {
            bail!("manifest records w={}, expected 8, 16 or 32", manifest.w);
        }
        let Some(total) = manifest.k.checked_add(manifest.m) else {
            bail!(
                "manifest chunk count overflows: k={} m={}",
                manifest.k,
                manifest.m
            );
        };
        let total = total as usize;
        if manifest.digests.len() != total {
            bail!(
                "manifest lists {} digests for {} chunks",
                manifest.digests.len(),
                total
            );
        }
        Ok(manifest)
    }
}

/// Path of chunk `index` inside `dir`.
pub fn chunk_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("chunk.{index}"))
}
