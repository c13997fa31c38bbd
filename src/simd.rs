use std::fmt;
use std::sync::OnceLock;

/// Byte-window primitive every permutation backend provides.
///
/// `align_right::<N>(lower, upper)` treats `lower || upper` as one 32 byte
/// value (lower half in the low bytes) and returns the 16 byte window that
/// starts `N` bytes into it. All implementations must agree bit-for-bit.
pub trait AlignRight {
    fn align_right<const AMOUNT: i32>(lower: u128, upper: u128) -> u128;
}

/// Strategy used for the byte-lane permutations.
///
/// Chosen once per process (see [`Backend::active`]), or passed explicitly to
/// [`Engine::generate_with`](crate::Engine::generate_with). Every backend
/// yields the same stream.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum Backend {
    /// Portable shift-and-or over `u128` halves, available everywhere.
    Scalar,

    /// `palignr` on x86_64, needs SSSE3 at runtime
    Ssse3,

    /// `ext` on aarch64, baseline on every aarch64 CPU
    Neon,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Scalar, Backend::Ssse3, Backend::Neon];

    /// Picks the fastest backend usable on the running machine.
    pub fn detect() -> Backend {
        if Backend::Ssse3.is_available() {
            return Backend::Ssse3;
        }

        if Backend::Neon.is_available() {
            return Backend::Neon;
        }

        Backend::Scalar
    }

    /// Process-wide backend, detected on first use.
    pub fn active() -> Backend {
        static ACTIVE: OnceLock<Backend> = OnceLock::new();

        *ACTIVE.get_or_init(|| {
            let backend = Backend::detect();
            tracing::debug!(%backend, "selected lane permutation backend");

            backend
        })
    }

    pub fn is_available(self) -> bool {
        match self {
            Backend::Scalar => true,
            Backend::Ssse3 => ssse3_detected(),
            Backend::Neon => cfg!(all(feature = "simd", target_arch = "aarch64", target_endian = "little")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Ssse3 => "ssse3",
            Backend::Neon => "neon",
        }
    }
}

fn ssse3_detected() -> bool {
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        is_x86_feature_detected!("ssse3")
    }

    #[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
    {
        false
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) struct Scalar;

impl AlignRight for Scalar {
    #[inline(always)]
    fn align_right<const AMOUNT: i32>(lower: u128, upper: u128) -> u128 {
        const { assert!(AMOUNT >= 0 && AMOUNT < 16, "align amount must be within 0..16 bytes") };

        if AMOUNT == 0 {
            return lower;
        }

        let bits = AMOUNT as u32 * 8;
        (lower >> bits) | (upper << (128 - bits))
    }
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub(crate) use ssse3::Ssse3;

#[cfg(all(feature = "simd", target_arch = "aarch64", target_endian = "little"))]
pub(crate) use neon::Neon;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod ssse3 {
    use super::AlignRight;
    use core::arch::x86_64::*;

    /// Only reachable through a [`Backend::Ssse3`](super::Backend) that passed
    /// `is_available`, i.e. SSSE3 was detected at runtime.
    pub(crate) struct Ssse3;

    impl AlignRight for Ssse3 {
        #[inline(always)]
        fn align_right<const AMOUNT: i32>(lower: u128, upper: u128) -> u128 {
            const { assert!(AMOUNT >= 0 && AMOUNT < 16, "align amount must be within 0..16 bytes") };

            // SAFETY: callers only select this backend once SSSE3 support was
            // confirmed, and the loads/stores go through an unaligned u64 pair.
            unsafe {
                let lo = _mm_set_epi64x((lower >> 64) as i64, lower as i64);
                let hi = _mm_set_epi64x((upper >> 64) as i64, upper as i64);

                // palignr(a, b) windows over `a || b` with `b` in the low bytes
                let r = _mm_alignr_epi8::<AMOUNT>(hi, lo);

                let mut out = [0u64; 2];
                _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, r);

                (u128::from(out[1]) << 64) | u128::from(out[0])
            }
        }
    }
}

#[cfg(all(feature = "simd", target_arch = "aarch64", target_endian = "little"))]
mod neon {
    use super::AlignRight;
    use core::arch::aarch64::*;

    pub(crate) struct Neon;

    impl AlignRight for Neon {
        #[inline(always)]
        fn align_right<const AMOUNT: i32>(lower: u128, upper: u128) -> u128 {
            const { assert!(AMOUNT >= 0 && AMOUNT < 16, "align amount must be within 0..16 bytes") };

            // SAFETY: NEON is part of the aarch64 baseline.
            unsafe {
                let lo = vreinterpretq_u8_u64(vcombine_u64(
                    vcreate_u64(lower as u64),
                    vcreate_u64((lower >> 64) as u64),
                ));
                let hi = vreinterpretq_u8_u64(vcombine_u64(
                    vcreate_u64(upper as u64),
                    vcreate_u64((upper >> 64) as u64),
                ));

                let r = vreinterpretq_u64_u8(vextq_u8::<AMOUNT>(lo, hi));

                (u128::from(vgetq_lane_u64::<1>(r)) << 64) | u128::from(vgetq_lane_u64::<0>(r))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Every window of `lower || upper`, computed through backend `B`.
    fn all_windows<B: AlignRight>(lower: u128, upper: u128) -> [u128; 16] {
        [
            B::align_right::<0>(lower, upper),
            B::align_right::<1>(lower, upper),
            B::align_right::<2>(lower, upper),
            B::align_right::<3>(lower, upper),
            B::align_right::<4>(lower, upper),
            B::align_right::<5>(lower, upper),
            B::align_right::<6>(lower, upper),
            B::align_right::<7>(lower, upper),
            B::align_right::<8>(lower, upper),
            B::align_right::<9>(lower, upper),
            B::align_right::<10>(lower, upper),
            B::align_right::<11>(lower, upper),
            B::align_right::<12>(lower, upper),
            B::align_right::<13>(lower, upper),
            B::align_right::<14>(lower, upper),
            B::align_right::<15>(lower, upper),
        ]
    }

    /// Byte-by-byte window over the concatenation, independent of any backend.
    fn window_by_bytes(lower: u128, upper: u128, amount: usize) -> u128 {
        let mut cat = [0u8; 32];
        cat[..16].copy_from_slice(&lower.to_le_bytes());
        cat[16..].copy_from_slice(&upper.to_le_bytes());

        let mut out = [0u8; 16];
        out.copy_from_slice(&cat[amount..amount + 16]);

        u128::from_le_bytes(out)
    }

    fn native_windows(backend: Backend, lower: u128, upper: u128) -> Option<[u128; 16]> {
        if !backend.is_available() {
            return None;
        }

        match backend {
            Backend::Scalar => Some(all_windows::<Scalar>(lower, upper)),

            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Backend::Ssse3 => Some(all_windows::<Ssse3>(lower, upper)),

            #[cfg(all(feature = "simd", target_arch = "aarch64", target_endian = "little"))]
            Backend::Neon => Some(all_windows::<Neon>(lower, upper)),

            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    mod detection {
        use super::*;

        #[test]
        fn test_detected_backend_is_available() {
            assert!(Backend::detect().is_available());
            assert!(Backend::active().is_available());
        }

        #[test]
        fn test_active_is_stable_across_calls() {
            assert_eq!(Backend::active(), Backend::active());
        }

        #[test]
        fn test_scalar_is_always_available() {
            assert!(Backend::Scalar.is_available());
        }

        #[cfg(all(feature = "simd", target_arch = "aarch64", target_endian = "little"))]
        #[test]
        fn test_neon_is_detected_on_aarch64() {
            assert_eq!(Backend::detect(), Backend::Neon);
            assert!(!Backend::Ssse3.is_available());
        }

        #[cfg(not(feature = "simd"))]
        #[test]
        fn test_scalar_only_without_simd_feature() {
            assert_eq!(Backend::detect(), Backend::Scalar);
            assert!(!Backend::Ssse3.is_available());
            assert!(!Backend::Neon.is_available());
        }
    }

    mod scalar {
        use super::*;

        #[test]
        fn test_align_zero_returns_lower() {
            assert_eq!(Scalar::align_right::<0>(7, 9), 7);
        }

        #[test]
        fn test_align_pulls_upper_bytes_in_from_the_top() {
            let lower = u128::from_le_bytes(core::array::from_fn(|i| i as u8));
            let upper = u128::from_le_bytes(core::array::from_fn(|i| 16 + i as u8));

            let r = Scalar::align_right::<4>(lower, upper).to_le_bytes();
            let expected: [u8; 16] = core::array::from_fn(|i| 4 + i as u8);

            assert_eq!(r, expected);
        }

        #[test]
        fn test_align_boundary_inputs_match_byte_reference() {
            let cases = [(0u128, 0u128), (u128::MAX, u128::MAX), (1, 0), (0, 1), (1 << 127, 0), (0, 1 << 127)];

            for (lower, upper) in cases {
                let got = all_windows::<Scalar>(lower, upper);

                for (amount, w) in got.iter().enumerate() {
                    assert_eq!(*w, window_by_bytes(lower, upper, amount), "amount {amount}");
                }
            }
        }
    }

    mod cross_backend {
        use super::*;

        #[test]
        fn test_single_bit_inputs_agree_on_every_backend() {
            for bit in 0..128 {
                let lower = 1u128 << bit;
                let upper = 1u128 << (127 - bit);
                let reference = all_windows::<Scalar>(lower, upper);

                for backend in Backend::ALL {
                    if let Some(got) = native_windows(backend, lower, upper) {
                        assert_eq!(got, reference, "backend {backend} bit {bit}");
                    }
                }
            }
        }

        proptest! {
            #[test]
            fn scalar_matches_byte_reference(lower: u128, upper: u128) {
                let got = all_windows::<Scalar>(lower, upper);

                for (amount, w) in got.iter().enumerate() {
                    prop_assert_eq!(*w, window_by_bytes(lower, upper, amount));
                }
            }

            #[test]
            fn native_backends_match_scalar(lower: u128, upper: u128) {
                let reference = all_windows::<Scalar>(lower, upper);

                for backend in Backend::ALL {
                    if let Some(got) = native_windows(backend, lower, upper) {
                        prop_assert_eq!(got, reference, "backend {}", backend);
                    }
                }
            }
        }
    }
}
