//! GF(2^16) with primitive polynomial x^16 + x^12 + x^3 + x + 1 (0x1100B).

use std::sync::LazyLock;

const POLYNOMIAL: u32 = 0x1100B;
const ORDER: usize = 65_535;

struct Tables {
    log: Vec<u32>,
    exp: Vec<u16>,
}

static TABLES: LazyLock<Tables> = LazyLock::new(|| {
    let mut log = vec![0u32; ORDER + 1];
    let mut exp = vec![0u16; 2 * ORDER];

    let mut val: u32 = 1;
    for i in 0..ORDER {
        exp[i] = val as u16;
        exp[i + ORDER] = val as u16;
        log[val as usize] = i as u32;
        val <<= 1;
        if val & 0x1_0000 != 0 {
            val ^= POLYNOMIAL;
        }
    }

    Tables { log, exp }
});

#[inline]
pub(super) fn mul(a: u16, b: u16) -> u16 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = &*TABLES;
    t.exp[(t.log[a as usize] + t.log[b as usize]) as usize]
}

#[inline]
pub(super) fn div(a: u16, b: u16) -> u16 {
    if a == 0 {
        return 0;
    }
    let t = &*TABLES;
    t.exp[t.log[a as usize] as usize + ORDER - t.log[b as usize] as usize]
}

/// Multiply little-endian 16-bit words by `c`.
///
/// `c * x = c * lo(x) ^ c * (hi(x) << 8)`, so two 256-entry tables built
/// per call replace the per-word log lookups.
pub(super) fn region_multiply(src: &[u8], c: u16, dst: &mut [u8], accumulate: bool) {
    let mut lo = [0u16; 256];
    let mut hi = [0u16; 256];
    for b in 1..256u16 {
        lo[b as usize] = mul(c, b);
        hi[b as usize] = mul(c, b << 8);
    }

    for (d, s) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
        let mut product = lo[s[0] as usize] ^ hi[s[1] as usize];
        if accumulate {
            product ^= u16::from_le_bytes([d[0], d[1]]);
        }
        d.copy_from_slice(&product.to_le_bytes());
    }
}
