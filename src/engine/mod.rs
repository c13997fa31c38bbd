pub(crate) mod full;
pub(crate) mod half;

use crate::error::{Error, Result};
use crate::lane::Lane;
use crate::simd::{Backend, Scalar};

/// Per-step counter increment, low word first.
pub(crate) const INCREMENT: Lane = Lane::from_words([7, 5, 3, 1]);

/// Fractional expansion of the golden ratio, used as the bare seed state.
const PHI: [u64; 16] = [
    0x9E3779B97F4A7C15, 0xF39CC0605CEDC834, 0x1082276BF3A27251, 0xF86C6A11D0C18E95,
    0x2767F0B153D27B7F, 0x0347045B5BF1827F, 0x01886F0928403002, 0xC1D64BA40F335E36,
    0xF06AD7AE9717877E, 0x85839D6EFFBD7DC6, 0x64D325D1C5371682, 0xCADD0CCCFDFFBBE1,
    0x626E33B8D04B4331, 0xBBF73C790D94F79D, 0x471C4AB3ED3D82A5, 0xFEC507705E4AE6E5,
];

mod private {
    use crate::simd::AlignRight;

    pub trait Kernel {
        const BLOCK: usize;

        /// Runs `size / BLOCK` steps. Block `k` is copied into `out` when
        /// `out` still has room for it. `size` has already been validated.
        fn steps<B: AlignRight>(&mut self, out: Option<&mut [u8]>, size: usize);
    }
}

pub(crate) use private::Kernel;

/// A lane state machine emitting one fixed-size block per step.
///
/// Output lags the state by one step: the block written for step `k` is the
/// combination computed during step `k - 1`.
pub trait Engine: Kernel + Clone + Sized {
    /// Output bytes produced per step.
    const BLOCK_SIZE: usize = <Self as Kernel>::BLOCK;

    /// Short engine name used in log events.
    const NAME: &'static str;

    /// Builds a warmed-up state from four seed words.
    fn initialize(seed: [u64; 4]) -> Self;

    /// Same as [`Engine::initialize`], reading the seed as four little-endian words.
    fn from_seed_bytes(seed: [u8; 32]) -> Self {
        Self::initialize(core::array::from_fn(|i| {
            let mut word = [0u8; 8];
            word.copy_from_slice(&seed[i * 8..i * 8 + 8]);

            u64::from_le_bytes(word)
        }))
    }

    /// Advances the state by `size` bytes using the process-wide backend.
    ///
    /// With a non-empty `out`, the stream bytes are written into `out[..size]`.
    /// With `out` absent or empty the bytes are discarded. Returns the number
    /// of bytes written.
    fn generate(&mut self, out: Option<&mut [u8]>, size: usize) -> Result<usize> {
        self.generate_with(Backend::active(), out, size)
    }

    /// Like [`Engine::generate`] but through an explicit backend.
    fn generate_with(&mut self, backend: Backend, out: Option<&mut [u8]>, size: usize) -> Result<usize> {
        // an empty buffer means discard mode, same as `None`
        let out = out.filter(|buf| !buf.is_empty());
        validate::<Self>(backend, out.as_deref().map(<[u8]>::len), size)?;

        let written = if out.is_some() { size } else { 0 };
        run(self, backend, out, size);

        Ok(written)
    }

    /// Skips `size` bytes of the stream.
    fn discard(&mut self, size: usize) -> Result<()> {
        self.generate(None, size).map(|_| ())
    }
}

fn validate<E: Engine>(backend: Backend, len: Option<usize>, size: usize) -> Result<()> {
    if size % E::BLOCK_SIZE != 0 {
        tracing::debug!(engine = E::NAME, size, block = E::BLOCK_SIZE, "rejected unaligned size");
        return Err(Error::UnalignedSize { size, block: E::BLOCK_SIZE });
    }

    if let Some(len) = len {
        if len < size {
            tracing::debug!(engine = E::NAME, len, size, "rejected short buffer");
            return Err(Error::BufferTooSmall { len, size });
        }
    }

    if !backend.is_available() {
        tracing::debug!(engine = E::NAME, %backend, "rejected unavailable backend");
        return Err(Error::Unsupported { backend });
    }

    Ok(())
}

/// Dispatches once per call into a loop monomorphized for `backend`.
///
/// `backend` must be available; unavailable backends fall back to scalar,
/// which yields identical output.
pub(crate) fn run<K: Kernel>(kernel: &mut K, backend: Backend, out: Option<&mut [u8]>, size: usize) {
    debug_assert!(backend.is_available());

    match backend {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        // SAFETY: an available `Ssse3` backend means SSSE3 was detected at runtime
        Backend::Ssse3 if backend.is_available() => unsafe { run_ssse3(kernel, out, size) },

        #[cfg(all(feature = "simd", target_arch = "aarch64", target_endian = "little"))]
        Backend::Neon => kernel.steps::<crate::simd::Neon>(out, size),

        _ => kernel.steps::<Scalar>(out, size),
    }
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[target_feature(enable = "ssse3")]
unsafe fn run_ssse3<K: Kernel>(kernel: &mut K, out: Option<&mut [u8]>, size: usize) {
    kernel.steps::<crate::simd::Ssse3>(out, size)
}

/// Discard-mode warm-up shared by both engines: each round advances by
/// `bytes` without capturing output, then `reseed` rebuilds the state lanes.
#[inline(always)]
pub(super) fn warm_up<E: Engine>(engine: &mut E, rounds: usize, bytes: usize, reseed: impl Fn(&mut E)) {
    let backend = Backend::active();

    for _ in 0..rounds {
        run(engine, backend, None, bytes);
        reseed(engine);
    }

    tracing::trace!(engine = E::NAME, rounds, "warm-up complete");
}

/// Shared step loop: copy the pending block out, then step.
#[inline(always)]
pub(super) fn drive<S, const BLOCK: usize>(
    state: &mut S,
    mut out: Option<&mut [u8]>,
    size: usize,
    emit: impl Fn(&S, &mut [u8]),
    step: impl Fn(&mut S),
) {
    let mut offset = 0usize;

    while offset < size {
        if let Some(block) = out.as_deref_mut().and_then(|buf| buf.get_mut(offset..offset + BLOCK)) {
            emit(state, block);
        }

        step(state);
        offset += BLOCK;
    }
}

/// Seed lane: every other word is XORed with a seed word.
#[inline(always)]
pub(super) const fn seed_lane(base: usize, even: u64, odd: u64) -> Lane {
    Lane::from_words([PHI[base] ^ even, PHI[base + 1], PHI[base + 2] ^ odd, PHI[base + 3]])
}
