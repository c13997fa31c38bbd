//! # Lanes
//!
//! A [`Lane`] is a 256-bit value seen as four `u64` words for arithmetic and
//! as eight `u32` words (or 32 bytes) for permutation. Word `0` is the least
//! significant.
//!
//! The two byte rotations are built from the [`AlignRight`] window over the
//! lane's 128-bit halves:
//!
//! ```md
//! bytes => | L0 .. L15 | H0 .. H15 |
//!
//! rotate_by_12 => | align(L, H, 12) | align(H, L, 12) |
//! rotate_by_20 => | align(H, L, 4)  | align(L, H, 4)  |
//! ```
//!
//! which equals picking 32-bit words `{3,4,5,6,7,0,1,2}` and
//! `{5,6,7,0,1,2,3,4}` respectively.
//!
use crate::simd::{AlignRight, Scalar};
use core::ops::{Add, BitXor, Shr};

pub(crate) const LANE_BYTES: usize = 32;

#[repr(C, align(32))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lane([u64; 4]);

impl Lane {
    pub const ZERO: Lane = Lane([0; 4]);

    #[inline(always)]
    pub const fn from_words(words: [u64; 4]) -> Self {
        Self(words)
    }

    #[inline(always)]
    pub const fn words(&self) -> [u64; 4] {
        self.0
    }

    /// Serializes the four words low word first, each little-endian.
    #[inline(always)]
    pub fn to_le_bytes(&self) -> [u8; LANE_BYTES] {
        let mut out = [0u8; LANE_BYTES];
        self.write_le(&mut out);

        out
    }

    #[inline(always)]
    pub(crate) fn write_le(&self, out: &mut [u8]) {
        debug_assert!(out.len() >= LANE_BYTES);

        for (chunk, word) in out.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
    }

    /// Rotates the lane right by 12 bytes.
    #[inline]
    pub fn rotate_lane_by_12(self) -> Self {
        self.rotate_by_12::<Scalar>()
    }

    /// Rotates the lane right by 20 bytes.
    #[inline]
    pub fn rotate_lane_by_20(self) -> Self {
        self.rotate_by_20::<Scalar>()
    }

    #[inline(always)]
    pub(crate) fn rotate_by_12<B: AlignRight>(self) -> Self {
        let (lo, hi) = self.halves();
        Self::from_halves(B::align_right::<12>(lo, hi), B::align_right::<12>(hi, lo))
    }

    #[inline(always)]
    pub(crate) fn rotate_by_20<B: AlignRight>(self) -> Self {
        let (lo, hi) = self.halves();
        Self::from_halves(B::align_right::<4>(hi, lo), B::align_right::<4>(lo, hi))
    }

    #[inline(always)]
    fn halves(self) -> (u128, u128) {
        let [w0, w1, w2, w3] = self.0;

        (
            (u128::from(w1) << 64) | u128::from(w0),
            (u128::from(w3) << 64) | u128::from(w2),
        )
    }

    #[inline(always)]
    fn from_halves(lo: u128, hi: u128) -> Self {
        Self([lo as u64, (lo >> 64) as u64, hi as u64, (hi >> 64) as u64])
    }
}

impl From<[u64; 4]> for Lane {
    fn from(words: [u64; 4]) -> Self {
        Self(words)
    }
}

/// Elementwise wrapping addition of the `u64` words.
impl Add for Lane {
    type Output = Lane;

    #[inline(always)]
    fn add(self, rhs: Lane) -> Lane {
        Lane(core::array::from_fn(|i| self.0[i].wrapping_add(rhs.0[i])))
    }
}

/// Elementwise logical right shift of the `u64` words.
impl Shr<u32> for Lane {
    type Output = Lane;

    #[inline(always)]
    fn shr(self, bits: u32) -> Lane {
        Lane(self.0.map(|w| w >> bits))
    }
}

impl BitXor for Lane {
    type Output = Lane;

    #[inline(always)]
    fn bitxor(self, rhs: Lane) -> Lane {
        Lane(core::array::from_fn(|i| self.0[i] ^ rhs.0[i]))
    }
}
