//! Generator matrix construction and inversion over GF(2^w).
//!
//! The coding matrix is derived from an extended Vandermonde matrix of
//! `k + m` rows and `k` columns. Column operations turn its top `k` rows
//! into the identity, so the code is systematic and only the bottom `m`
//! rows need to be stored. Because column operations and row scaling
//! preserve the rank of every square submatrix, any `k` of the `k + m`
//! rows remain invertible.

use crate::error::ErasureError;
use crate::galois::WordSize;

/// Dense row-major matrix of field elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u32>,
}

impl Matrix {
    /// All-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1);
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row.
    pub fn row(&self, row: usize) -> &[u32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    fn row_mut(&mut self, row: usize) -> &mut [u32] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.cols {
            self.data.swap(a * self.cols + col, b * self.cols + col);
        }
    }

    /// Copy of rows `start..end`.
    fn sub_rows(&self, start: usize, end: usize) -> Self {
        Self {
            rows: end - start,
            cols: self.cols,
            data: self.data[start * self.cols..end * self.cols].to_vec(),
        }
    }

    /// Invert a square matrix with Gauss-Jordan elimination.
    ///
    /// # Errors
    ///
    /// Returns [`ErasureError::SingularMatrix`] if no pivot can be found
    /// for some column.
    pub fn invert(&self, w: WordSize) -> Result<Self, ErasureError> {
        assert_eq!(self.rows, self.cols, "only square matrices can be inverted");
        let n = self.rows;
        let mut mat = self.clone();
        let mut inv = Self::identity(n);

        for i in 0..n {
            let pivot = (i..n)
                .find(|&r| mat.get(r, i) != 0)
                .ok_or(ErasureError::SingularMatrix)?;
            mat.swap_rows(i, pivot);
            inv.swap_rows(i, pivot);

            let p = mat.get(i, i);
            if p != 1 {
                let scale = w.inv(p);
                for v in mat.row_mut(i) {
                    *v = w.mul(*v, scale);
                }
                for v in inv.row_mut(i) {
                    *v = w.mul(*v, scale);
                }
            }

            for r in 0..n {
                let e = mat.get(r, i);
                if r == i || e == 0 {
                    continue;
                }
                for c in 0..n {
                    let m = mat.get(r, c) ^ w.mul(e, mat.get(i, c));
                    mat.set(r, c, m);
                    let v = inv.get(r, c) ^ w.mul(e, inv.get(i, c));
                    inv.set(r, c, v);
                }
            }
        }

        Ok(inv)
    }
}

/// Extended Vandermonde matrix with `rows` rows and `cols` columns.
///
/// Row 0 is `[1, 0, …, 0]`, the last row is `[0, …, 0, 1]`, and row `i`
/// in between is `[1, i, i^2, …]`. The evaluation points are therefore
/// 0, 1, …, rows-2 and the point at infinity, all distinct.
fn extended_vandermonde(rows: usize, cols: usize, w: WordSize) -> Matrix {
    let mut vdm = Matrix::zeros(rows, cols);
    vdm.set(0, 0, 1);
    vdm.set(rows - 1, cols - 1, 1);
    for i in 1..rows - 1 {
        for j in 0..cols {
            vdm.set(i, j, w.pow(i as u32, j as u64));
        }
    }
    vdm
}

/// Build the `m × k` coding rows of a systematic Reed-Solomon code.
///
/// The first coding row is all ones and the first column of every coding
/// row is one. The decoder relies on the all-ones row to rebuild a single
/// lost data chunk with XOR alone.
///
/// # Errors
///
/// Returns [`ErasureError::InvalidParameters`] if `k` or `m` is zero or
/// `k + m` exceeds the number of field elements.
pub fn vandermonde_coding_matrix(k: usize, m: usize, w: WordSize) -> Result<Matrix, ErasureError> {
    if k == 0 || m == 0 {
        return Err(ErasureError::InvalidParameters(format!(
            "k={k} and m={m} must both be at least 1"
        )));
    }
    let rows = k + m;
    if rows as u64 > w.field_size() {
        return Err(ErasureError::InvalidParameters(format!(
            "k + m = {rows} exceeds the {} elements of GF(2^{w})",
            w.field_size()
        )));
    }

    let mut dist = extended_vandermonde(rows, k, w);

    // Reduce the top k rows to the identity with column operations.
    for i in 1..k {
        let pivot = (i..rows)
            .find(|&r| dist.get(r, i) != 0)
            .ok_or(ErasureError::SingularMatrix)?;
        dist.swap_rows(i, pivot);

        let d = dist.get(i, i);
        if d != 1 {
            let scale = w.inv(d);
            for r in 0..rows {
                dist.set(r, i, w.mul(scale, dist.get(r, i)));
            }
        }

        for j in 0..k {
            let e = dist.get(i, j);
            if j == i || e == 0 {
                continue;
            }
            for r in 0..rows {
                let v = dist.get(r, j) ^ w.mul(e, dist.get(r, i));
                dist.set(r, j, v);
            }
        }
    }

    // Scale coding columns so row k is all ones.
    for j in 0..k {
        let e = dist.get(k, j);
        if e != 1 {
            let scale = w.inv(e);
            for r in k..rows {
                dist.set(r, j, w.mul(scale, dist.get(r, j)));
            }
        }
    }

    // Scale the remaining coding rows so their first element is one.
    for r in k + 1..rows {
        let e = dist.get(r, 0);
        if e != 1 {
            let scale = w.inv(e);
            for v in dist.row_mut(r) {
                *v = w.mul(*v, scale);
            }
        }
    }

    Ok(dist.sub_rows(k, rows))
}

/// Inverse of the `k × k` matrix formed by the rows of `survivors`.
///
/// `survivors` holds exactly `k` chunk indices in ascending order. Data
/// indices contribute identity rows, coding indices contribute the
/// matching row of `coding`.
pub fn decoding_matrix(
    coding: &Matrix,
    survivors: &[usize],
    w: WordSize,
) -> Result<Matrix, ErasureError> {
    let k = coding.cols();
    debug_assert_eq!(survivors.len(), k);

    let mut sub = Matrix::zeros(k, k);
    for (row, &id) in survivors.iter().enumerate() {
        if id < k {
            sub.set(row, id, 1);
        } else {
            sub.row_mut(row).copy_from_slice(coding.row(id - k));
        }
    }
    sub.invert(w)
}
