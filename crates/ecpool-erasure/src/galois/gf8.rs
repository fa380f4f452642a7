//! GF(2^8) with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D).

use std::sync::LazyLock;

const POLYNOMIAL: u32 = 0x11D;
const ORDER: usize = 255;

struct Tables {
    log: [u16; 256],
    /// Antilog table, doubled so `log[a] + log[b]` never needs a modulo.
    exp: [u8; 2 * ORDER],
}

static TABLES: LazyLock<Tables> = LazyLock::new(|| {
    let mut log = [0u16; 256];
    let mut exp = [0u8; 2 * ORDER];

    let mut val: u32 = 1;
    for i in 0..ORDER {
        exp[i] = val as u8;
        exp[i + ORDER] = val as u8;
        log[val as usize] = i as u16;
        val <<= 1;
        if val & 0x100 != 0 {
            val ^= POLYNOMIAL;
        }
    }

    Tables { log, exp }
});

#[inline]
pub(super) fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = &*TABLES;
    t.exp[(t.log[a as usize] + t.log[b as usize]) as usize]
}

#[inline]
pub(super) fn div(a: u8, b: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let t = &*TABLES;
    t.exp[t.log[a as usize] as usize + ORDER - t.log[b as usize] as usize]
}

/// `table[x] = c * x`. One lookup per byte in the region loop.
fn mul_table(c: u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    for x in 1..=255u8 {
        table[x as usize] = mul(c, x);
    }
    table
}

pub(super) fn region_multiply(src: &[u8], c: u8, dst: &mut [u8], accumulate: bool) {
    let table = mul_table(c);
    if accumulate {
        for (d, s) in dst.iter_mut().zip(src) {
            *d ^= table[*s as usize];
        }
    } else {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = table[*s as usize];
        }
    }
}
