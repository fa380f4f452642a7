//! GF(2^32) with primitive polynomial x^32 + x^22 + x^2 + x + 1.
//!
//! Log tables for this field would need 2^32 entries, so products are
//! computed with a carry-less multiply followed by polynomial reduction.

const POLYNOMIAL: u64 = 0x1_0040_0007;

/// Order of the multiplicative group.
const ORDER: u64 = (1 << 32) - 1;

#[inline]
pub(super) fn mul(a: u32, b: u32) -> u32 {
    let mut product: u64 = 0;
    let mut a = u64::from(a);
    let mut b = b;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        a <<= 1;
        b >>= 1;
    }
    reduce(product)
}

/// Reduce a product of two field elements (at most 63 bits) modulo the polynomial.
fn reduce(mut p: u64) -> u32 {
    for bit in (32..64).rev() {
        if p & (1 << bit) != 0 {
            p ^= POLYNOMIAL << (bit - 32);
        }
    }
    p as u32
}

/// `a^(2^32 - 2) = a^-1`. `a` must be nonzero.
pub(super) fn inv(a: u32) -> u32 {
    let mut base = a;
    let mut acc = 1;
    let mut n = ORDER - 1;
    while n > 0 {
        if n & 1 == 1 {
            acc = mul(acc, base);
        }
        base = mul(base, base);
        n >>= 1;
    }
    acc
}

/// Multiply little-endian 32-bit words by `c` using four byte-indexed
/// tables: `table[i][b] = c * (b << 8i)`.
pub(super) fn region_multiply(src: &[u8], c: u32, dst: &mut [u8], accumulate: bool) {
    let mut tables = [[0u32; 256]; 4];
    for (i, table) in tables.iter_mut().enumerate() {
        for b in 1..256u32 {
            table[b as usize] = mul(c, b << (8 * i));
        }
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let mut product = tables[0][s[0] as usize]
            ^ tables[1][s[1] as usize]
            ^ tables[2][s[2] as usize]
            ^ tables[3][s[3] as usize];
        if accumulate {
            product ^= u32::from_le_bytes([d[0], d[1], d[2], d[3]]);
        }
        d.copy_from_slice(&product.to_le_bytes());
    }
}
