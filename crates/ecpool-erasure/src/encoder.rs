//! Matrix encoder.
//!
//! Each coding block is a field-weighted sum of the `k` data blocks:
//! `coding_i[word] = Σ_j matrix[i][j] * data_j[word]`.

use crate::galois::WordSize;
use crate::matrix::Matrix;

/// Fill `coding` with the products of the coding `matrix` and `data`.
///
/// `data` holds `matrix.cols()` blocks and `coding` holds `matrix.rows()`
/// blocks, all the same length.
pub fn matrix_encode(matrix: &Matrix, w: WordSize, data: &[&[u8]], coding: &mut [&mut [u8]]) {
    debug_assert_eq!(data.len(), matrix.cols());
    debug_assert_eq!(coding.len(), matrix.rows());

    for (i, dest) in coding.iter_mut().enumerate() {
        dot_product(matrix.row(i), w, data, dest);
    }
}

/// `dest = Σ_j coefficients[j] * sources[j]`.
pub(crate) fn dot_product(coefficients: &[u32], w: WordSize, sources: &[&[u8]], dest: &mut [u8]) {
    debug_assert_eq!(coefficients.len(), sources.len());

    let mut first = true;
    for (&c, src) in coefficients.iter().zip(sources) {
        if c == 0 {
            continue;
        }
        w.region_multiply(src, c, dest, !first);
        first = false;
    }
    if first {
        dest.fill(0);
    }
}
