//! Matrix decoder.
//!
//! Rebuilds erased blocks from any `k` surviving blocks of a systematic
//! code. Erased data blocks are recomputed through the inverse of the
//! survivors' submatrix; erased coding blocks are then re-encoded from
//! the complete data.

use std::collections::BTreeSet;

use tracing::debug;

use crate::encoder::dot_product;
use crate::error::ErasureError;
use crate::galois::WordSize;
use crate::matrix::{Matrix, decoding_matrix};

/// Rebuild the erased blocks of a `k + m` block set in place.
///
/// * `matrix`: the `m × k` coding rows
/// * `row_k_ones`: the first coding row is all ones, so one lost data
///   block can be rebuilt as the XOR of the others and coding block `k`
/// * `erasures`: indices of missing blocks; their buffers in `blocks`
///   must already be allocated at the block size
/// * `want_to_read`: erased coding blocks are rebuilt only if listed here;
///   erased data blocks are always rebuilt
///
/// # Errors
///
/// Returns [`ErasureError::NotEnoughChunks`] if more than `m` blocks are
/// erased, or [`ErasureError::SingularMatrix`] if the survivors' submatrix
/// cannot be inverted.
pub fn matrix_decode(
    matrix: &Matrix,
    w: WordSize,
    row_k_ones: bool,
    erasures: &[usize],
    want_to_read: &BTreeSet<usize>,
    blocks: &mut [Vec<u8>],
) -> Result<(), ErasureError> {
    let k = matrix.cols();
    let m = matrix.rows();
    let n = k + m;
    debug_assert_eq!(blocks.len(), n);

    if erasures.len() > m {
        return Err(ErasureError::NotEnoughChunks {
            needed: k,
            got: n - erasures.len(),
        });
    }

    let mut erased = vec![false; n];
    for &i in erasures {
        erased[i] = true;
    }

    let erased_data: Vec<usize> = (0..k).filter(|&i| erased[i]).collect();

    // The last erased data block goes through the parity shortcut when
    // coding block k survived.
    let (via_matrix, via_parity) = match erased_data.split_last() {
        Some((&last, rest)) if row_k_ones && !erased[k] => (rest, Some(last)),
        _ => (erased_data.as_slice(), None),
    };

    if !via_matrix.is_empty() {
        let survivors: Vec<usize> = (0..n).filter(|&i| !erased[i]).take(k).collect();
        let decoding = decoding_matrix(matrix, &survivors, w)?;
        for &target in via_matrix {
            rebuild(blocks, target, &survivors, decoding.row(target), w);
        }
    }

    if let Some(target) = via_parity {
        let sources: Vec<usize> = (0..=k).filter(|&i| i != target).collect();
        rebuild(blocks, target, &sources, &vec![1; k], w);
    }

    let data_ids: Vec<usize> = (0..k).collect();
    for i in 0..m {
        let index = k + i;
        if erased[index] && want_to_read.contains(&index) {
            rebuild(blocks, index, &data_ids, matrix.row(i), w);
        }
    }

    debug!(
        k,
        m,
        erasures = erasures.len(),
        via_matrix = via_matrix.len(),
        via_parity = via_parity.is_some(),
        "rebuilt erased blocks"
    );

    Ok(())
}

/// `blocks[target] = Σ coefficients[j] * blocks[source_ids[j]]`.
fn rebuild(
    blocks: &mut [Vec<u8>],
    target: usize,
    source_ids: &[usize],
    coefficients: &[u32],
    w: WordSize,
) {
    debug_assert!(!source_ids.contains(&target));

    let mut dest = std::mem::take(&mut blocks[target]);
    let sources: Vec<&[u8]> = source_ids.iter().map(|&id| blocks[id].as_slice()).collect();
    dot_product(coefficients, w, &sources, &mut dest);
    blocks[target] = dest;
}
