//! # Full engine
//!
//! Four state lanes, four output lanes and a counter lane. Every step emits
//! the 128 bytes the previous step combined, then recombines:
//!
//! ```md
//! s1 += c, s3 += c, c += {7,5,3,1}
//!
//! u = (s0 >> 1, s1 >> 3, s2 >> 1, s3 >> 3)
//! t = (rot20(s0), rot12(s1), rot20(s2), rot12(s3))
//! s = t + u
//!
//! o = (u0 ^ t1, u2 ^ t3, s0 ^ s3, s2 ^ s1)
//! ```
//!
use super::{drive, seed_lane, warm_up, Engine, Kernel, INCREMENT};
use crate::lane::{Lane, LANE_BYTES};
use crate::simd::AlignRight;

pub(crate) const FULL_BLOCK: usize = 128;
const _: () = assert!(FULL_BLOCK == 4 * LANE_BYTES);

const WARM_UP_ROUNDS: usize = 13;
const WARM_UP_STEPS: usize = 1;

/// State of the full-size engine, 128 bytes per step.
#[repr(align(32))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullState {
    state: [Lane; 4],
    output: [Lane; 4],
    counter: Lane,
}

impl FullState {
    pub fn new(seed0: u64, seed1: u64, seed2: u64, seed3: u64) -> Self {
        <Self as Engine>::initialize([seed0, seed1, seed2, seed3])
    }

    #[inline(always)]
    fn emit(&self, block: &mut [u8]) {
        for (chunk, lane) in block.chunks_exact_mut(LANE_BYTES).zip(self.output.iter()) {
            lane.write_le(chunk);
        }
    }

    #[inline(always)]
    fn step<B: AlignRight>(&mut self) {
        let [s0, mut s1, s2, mut s3] = self.state;

        s1 = s1 + self.counter;
        s3 = s3 + self.counter;
        self.counter = self.counter + INCREMENT;

        let u0 = s0 >> 1;
        let u1 = s1 >> 3;
        let u2 = s2 >> 1;
        let u3 = s3 >> 3;

        let t0 = s0.rotate_by_20::<B>();
        let t1 = s1.rotate_by_12::<B>();
        let t2 = s2.rotate_by_20::<B>();
        let t3 = s3.rotate_by_12::<B>();

        let n0 = t0 + u0;
        let n1 = t1 + u1;
        let n2 = t2 + u2;
        let n3 = t3 + u3;

        self.state = [n0, n1, n2, n3];
        self.output = [u0 ^ t1, u2 ^ t3, n0 ^ n3, n2 ^ n1];
    }
}

impl Kernel for FullState {
    const BLOCK: usize = FULL_BLOCK;

    #[inline(always)]
    fn steps<B: AlignRight>(&mut self, out: Option<&mut [u8]>, size: usize) {
        drive::<Self, FULL_BLOCK>(self, out, size, Self::emit, Self::step::<B>);
    }
}

impl Engine for FullState {
    const NAME: &'static str = "full";

    fn initialize(seed: [u64; 4]) -> Self {
        let [s0, s1, s2, s3] = seed;

        let mut engine = Self {
            state: [
                seed_lane(0, s0, s1),
                seed_lane(4, s2, s3),
                seed_lane(8, s2, s3),
                seed_lane(12, s0, s1),
            ],
            output: [Lane::ZERO; 4],
            counter: Lane::ZERO,
        };

        warm_up(&mut engine, WARM_UP_ROUNDS, WARM_UP_STEPS * FULL_BLOCK, |e| {
            let [o0, o1, o2, o3] = e.output;
            e.state = [o3, o2, o1, o0];
        });

        engine
    }
}
