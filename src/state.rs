use crate::engine::{run, Engine};
use crate::simd::Backend;

pub(crate) const BUF_LEN: usize = 512;

const _: () = assert!(BUF_LEN % crate::engine::full::FULL_BLOCK == 0);
const _: () = assert!(BUF_LEN % crate::engine::half::HALF_BLOCK == 0);

/// Buffered reader over an [`Engine`].
///
/// Hands out the engine's byte stream in arbitrary-sized pieces. Everything
/// it returns, concatenated, is exactly what [`Engine::generate`] produces for
/// the same seed.
#[repr(align(32))]
#[derive(Clone)]
pub struct LaneRng<E: Engine> {
    buf: [u8; BUF_LEN],
    engine: E,
    backend: Backend,
    pos: usize,
}

impl<E: Engine> LaneRng<E> {
    #[inline]
    pub fn new(engine: E) -> Self {
        Self {
            buf: [0u8; BUF_LEN],
            engine,
            backend: Backend::active(),
            pos: BUF_LEN,
        }
    }

    #[inline]
    pub fn seeded(seed: [u64; 4]) -> Self {
        Self::new(E::initialize(seed))
    }

    /// Engine state as of the last block pulled from it.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[inline(always)]
    fn refill(&mut self) {
        run(&mut self.engine, self.backend, Some(&mut self.buf), BUF_LEN);
        self.pos = 0;
    }

    #[inline(always)]
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];

        if BUF_LEN - self.pos >= N {
            out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
            self.pos += N;
        } else {
            self.fill_bytes(&mut out);
        }

        out
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take::<8>())
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take::<4>())
    }

    /// Fills `dest` with the next `dest.len()` stream bytes.
    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        let buffered = (BUF_LEN - self.pos).min(dest.len());
        dest[..buffered].copy_from_slice(&self.buf[self.pos..self.pos + buffered]);
        self.pos += buffered;

        let rest = &mut dest[buffered..];
        if rest.is_empty() {
            return;
        }

        // buffer is drained, so whole blocks can go straight into `dest`
        let direct = rest.len() - rest.len() % E::BLOCK_SIZE;
        if direct > 0 {
            run(&mut self.engine, self.backend, Some(&mut rest[..direct]), direct);
        }

        let tail = &mut rest[direct..];
        if !tail.is_empty() {
            self.refill();
            tail.copy_from_slice(&self.buf[..tail.len()]);
            self.pos = tail.len();
        }
    }

    /// Drops the next `bytes` stream bytes, discarding whole blocks
    /// without materializing them.
    pub fn skip(&mut self, bytes: usize) {
        let buffered = (BUF_LEN - self.pos).min(bytes);
        self.pos += buffered;

        let rest = bytes - buffered;
        if rest == 0 {
            return;
        }

        let direct = rest - rest % E::BLOCK_SIZE;
        if direct > 0 {
            run(&mut self.engine, self.backend, None, direct);
        }

        let tail = rest - direct;
        if tail > 0 {
            self.refill();
            self.pos = tail;
        }
    }

    /// Uniform value in `range`, unbiased via rejection sampling.
    #[inline]
    pub fn range_u64<R: IntoRangeU64>(&mut self, range: R) -> u64 {
        let (start, span) = range.into_bounds();

        if span == 0 {
            return self.next_u64();
        }

        // widening multiply, reject the low products that would bias the top word
        let threshold = span.wrapping_neg() % span;

        loop {
            let m = u128::from(self.next_u64()) * u128::from(span);

            if (m as u64) >= threshold {
                return start + (m >> 64) as u64;
            }
        }
    }

    #[inline]
    pub fn range_u32<R: IntoRangeU32>(&mut self, range: R) -> u32 {
        let (start, span) = range.into_bounds();

        if span == 0 {
            return self.next_u32();
        }

        let threshold = span.wrapping_neg() % span;

        loop {
            let m = u64::from(self.next_u32()) * u64::from(span);

            if (m as u32) >= threshold {
                return start + (m >> 32) as u32;
            }
        }
    }
}

impl<E: Engine + core::fmt::Debug> core::fmt::Debug for LaneRng<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LaneRng")
            .field("engine", &self.engine)
            .field("backend", &self.backend)
            .field("buffered", &(BUF_LEN - self.pos))
            .finish()
    }
}

pub trait IntoRangeU64 {
    /// Returns `(start, span)`; a span of `0` stands for the full `u64` range.
    fn into_bounds(self) -> (u64, u64);
}

impl IntoRangeU64 for core::ops::Range<u64> {
    fn into_bounds(self) -> (u64, u64) {
        assert!(self.start < self.end, "range_u64: empty exclusive range");

        (self.start, self.end - self.start)
    }
}

impl IntoRangeU64 for core::ops::RangeInclusive<u64> {
    fn into_bounds(self) -> (u64, u64) {
        let (start, end) = self.into_inner();
        assert!(start <= end, "range_u64: empty inclusive range");

        // full 64-bit range wraps the span to 0
        (start, (end - start).wrapping_add(1))
    }
}

pub trait IntoRangeU32 {
    /// Returns `(start, span)`; a span of `0` stands for the full `u32` range.
    fn into_bounds(self) -> (u32, u32);
}

impl IntoRangeU32 for core::ops::Range<u32> {
    fn into_bounds(self) -> (u32, u32) {
        assert!(self.start < self.end, "range_u32: empty exclusive range");

        (self.start, self.end - self.start)
    }
}

impl IntoRangeU32 for core::ops::RangeInclusive<u32> {
    fn into_bounds(self) -> (u32, u32) {
        let (start, end) = self.into_inner();
        assert!(start <= end, "range_u32: empty inclusive range");

        (start, (end - start).wrapping_add(1))
    }
}

#[cfg(feature = "rand_core")]
impl<E: Engine> rand_core::RngCore for LaneRng<E> {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        LaneRng::next_u32(self)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        LaneRng::next_u64(self)
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        LaneRng::fill_bytes(self, dest)
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        LaneRng::fill_bytes(self, dest);
        Ok(())
    }
}

#[cfg(feature = "rand_core")]
impl<E: Engine> rand_core::SeedableRng for LaneRng<E> {
    type Seed = [u8; 32];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(E::from_seed_bytes(seed))
    }
}
