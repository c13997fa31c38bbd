//! Error types returned by the engines.

use crate::simd::Backend;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by [`Engine::generate`](crate::Engine::generate).
///
/// Every variant is raised before any lane arithmetic runs, so a failed call
/// leaves the state exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Requested size is not a whole number of engine blocks.
    #[error("size {size} is not a multiple of the {block}-byte block size")]
    UnalignedSize { size: usize, block: usize },

    /// Output buffer cannot hold the requested number of bytes.
    #[error("buffer of {len} bytes is smaller than the requested size {size}")]
    BufferTooSmall { len: usize, size: usize },

    /// Requested permutation backend is not usable on this machine.
    #[error("permutation backend `{backend}` is not available on this target")]
    Unsupported { backend: Backend },
}
