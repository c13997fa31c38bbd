//! Deterministic byte-stream generator built from 256-bit lane arithmetic.
//!
//! Two engines share the lane primitives and nothing else:
//!
//! - [`FullState`]: four state lanes, 128 bytes per step
//! - [`HalfState`]: two state lanes, 32 bytes per step
//!
//! Each step only adds, shifts and permutes bytes, so the stream is identical
//! on every target and through every permutation [`Backend`]. It is **not**
//! a cryptographic generator.
//!
//! ```
//! use lanespin::{Engine, FullState};
//!
//! let mut state = FullState::new(0xDEADBEEF, 0x69420, 0x123456789101112, 0x13371337);
//! let mut buf = [0u8; 256];
//!
//! assert_eq!(state.generate(Some(&mut buf), 256), Ok(256));
//!
//! // advancing without a buffer skips the stream
//! state.discard(1024).unwrap();
//!
//! // sizes must be whole blocks
//! assert!(state.generate(None, 100).is_err());
//! ```
//!
//! [`LaneRng`] layers a buffer on top for word and range draws:
//!
//! ```
//! use lanespin::{HalfState, LaneRng};
//!
//! let mut rng = LaneRng::<HalfState>::seeded([1, 2, 3, 4]);
//! let roll = rng.range_u32(1..=6);
//!
//! assert!((1..=6).contains(&roll));
//! ```
mod engine;
mod error;
mod lane;
mod simd;
mod state;

pub use engine::full::FullState;
pub use engine::half::HalfState;
pub use engine::Engine;
pub use error::{Error, Result};
pub use lane::Lane;
pub use simd::Backend;
pub use state::{IntoRangeU32, IntoRangeU64, LaneRng};
