//! Galois field arithmetic over GF(2^w).
//!
//! Three fields are supported, one per word size. Each has its own
//! primitive polynomial and its own implementation:
//!
//! | w  | polynomial                     | multiply                |
//! |----|--------------------------------|-------------------------|
//! | 8  | x^8 + x^4 + x^3 + x^2 + 1      | log/antilog tables      |
//! | 16 | x^16 + x^12 + x^3 + x + 1      | log/antilog tables      |
//! | 32 | x^32 + x^22 + x^2 + x + 1      | carry-less shift/reduce |
//!
//! Field elements are carried as `u32` regardless of `w`. Chunk regions are
//! interpreted as little-endian words of `w / 8` bytes. Addition is XOR.

mod gf16;
mod gf32;
mod gf8;

use std::fmt;

/// Word size of the Galois field used by a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WordSize {
    /// GF(2^8).
    #[default]
    W8,
    /// GF(2^16).
    W16,
    /// GF(2^32).
    W32,
}

impl WordSize {
    /// Map a bit count to a supported word size.
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::W8),
            16 => Some(Self::W16),
            32 => Some(Self::W32),
            _ => None,
        }
    }

    /// Number of bits per field element.
    pub fn bits(self) -> u32 {
        match self {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
        }
    }

    /// Number of bytes per word in a chunk region.
    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Number of elements in the field (`2^w`).
    pub fn field_size(self) -> u64 {
        1u64 << self.bits()
    }

    /// `a * b`.
    #[inline]
    pub fn mul(self, a: u32, b: u32) -> u32 {
        match self {
            Self::W8 => u32::from(gf8::mul(a as u8, b as u8)),
            Self::W16 => u32::from(gf16::mul(a as u16, b as u16)),
            Self::W32 => gf32::mul(a, b),
        }
    }

    /// `a / b`. `b` must be nonzero.
    #[inline]
    pub fn div(self, a: u32, b: u32) -> u32 {
        debug_assert_ne!(b, 0, "division by zero in GF(2^{})", self.bits());
        match self {
            Self::W8 => u32::from(gf8::div(a as u8, b as u8)),
            Self::W16 => u32::from(gf16::div(a as u16, b as u16)),
            Self::W32 => gf32::mul(a, gf32::inv(b)),
        }
    }

    /// Multiplicative inverse. `a` must be nonzero.
    #[inline]
    pub fn inv(self, a: u32) -> u32 {
        self.div(1, a)
    }

    /// `a^n`, with `0^0 = 1`.
    pub fn pow(self, a: u32, mut n: u64) -> u32 {
        let mut base = a;
        let mut acc = 1;
        while n > 0 {
            if n & 1 == 1 {
                acc = self.mul(acc, base);
            }
            base = self.mul(base, base);
            n >>= 1;
        }
        acc
    }

    /// Multiply every word of `src` by `c` and store (or XOR, when
    /// `accumulate` is set) the products into `dst`.
    ///
    /// Both regions must have the same length, a multiple of [`Self::bytes`].
    pub fn region_multiply(self, src: &[u8], c: u32, dst: &mut [u8], accumulate: bool) {
        debug_assert_eq!(src.len(), dst.len());
        debug_assert!(src.len().is_multiple_of(self.bytes()));

        match c {
            0 => {
                if !accumulate {
                    dst.fill(0);
                }
            }
            1 => {
                if accumulate {
                    region_xor(src, dst);
                } else {
                    dst.copy_from_slice(src);
                }
            }
            _ => match self {
                Self::W8 => gf8::region_multiply(src, c as u8, dst, accumulate),
                Self::W16 => gf16::region_multiply(src, c as u16, dst, accumulate),
                Self::W32 => gf32::region_multiply(src, c, dst, accumulate),
            },
        }
    }
}

impl fmt::Display for WordSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// `dst ^= src`, byte by byte.
pub fn region_xor(src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}
