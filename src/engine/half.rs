//! # Half engine
//!
//! Two state lanes, one output lane and a counter lane, 32 bytes per step.
//! Its own state machine, not a slice of the full engine: the same seed yields
//! an unrelated stream.
//!
//! ```md
//! s1 += c, c += {7,5,3,1}
//! u = (s0 >> 1, s1 >> 3), t = (rot20(s0), rot12(s1))
//! s = t + u, o = u0 ^ t1
//! ```
//!
use super::{drive, seed_lane, warm_up, Engine, Kernel, INCREMENT};
use crate::lane::{Lane, LANE_BYTES};
use crate::simd::AlignRight;

pub(crate) const HALF_BLOCK: usize = LANE_BYTES;

const WARM_UP_ROUNDS: usize = 4;
const WARM_UP_STEPS: usize = 5;

/// State of the half-size engine, 32 bytes per step.
#[repr(align(32))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfState {
    state: [Lane; 2],
    output: Lane,
    counter: Lane,
}

impl HalfState {
    pub fn new(seed0: u64, seed1: u64, seed2: u64, seed3: u64) -> Self {
        <Self as Engine>::initialize([seed0, seed1, seed2, seed3])
    }

    #[inline(always)]
    fn emit(&self, block: &mut [u8]) {
        self.output.write_le(block);
    }

    #[inline(always)]
    fn step<B: AlignRight>(&mut self) {
        let [s0, mut s1] = self.state;

        s1 = s1 + self.counter;
        self.counter = self.counter + INCREMENT;

        let u0 = s0 >> 1;
        let u1 = s1 >> 3;

        let t0 = s0.rotate_by_20::<B>();
        let t1 = s1.rotate_by_12::<B>();

        self.state = [t0 + u0, t1 + u1];
        self.output = u0 ^ t1;
    }
}

impl Kernel for HalfState {
    const BLOCK: usize = HALF_BLOCK;

    #[inline(always)]
    fn steps<B: AlignRight>(&mut self, out: Option<&mut [u8]>, size: usize) {
        drive::<Self, HALF_BLOCK>(self, out, size, Self::emit, Self::step::<B>);
    }
}

impl Engine for HalfState {
    const NAME: &'static str = "half";

    fn initialize(seed: [u64; 4]) -> Self {
        let [s0, s1, s2, s3] = seed;

        let mut engine = Self {
            state: [seed_lane(0, s0, s1), seed_lane(4, s2, s3)],
            output: Lane::ZERO,
            counter: Lane::ZERO,
        };

        warm_up(&mut engine, WARM_UP_ROUNDS, WARM_UP_STEPS * HALF_BLOCK, |e| {
            e.state = [e.state[1], e.output];
        });

        engine
    }
}
