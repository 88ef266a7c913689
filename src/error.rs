use thiserror::Error;

/// Error type for Kuwahara filter operations
///
/// All variants are configuration errors detected once per invocation,
/// before any pixel is processed. There is no per-pixel failure mode:
/// out-of-bounds reads are absorbed by coordinate clamping, and degenerate
/// (empty) circular sectors are handled internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KuwaharaError {
    /// The window size is even or below the smallest meaningful window
    ///
    /// An odd size guarantees a well-defined center pixel and a symmetric
    /// half-extent on each side of it.
    #[error("Window size ({size}) must be an odd number of at least 3")]
    InvalidWindowSize { size: u32 },

    /// The circular partition has fewer than two sectors
    #[error("Sector count ({sectors}) must be at least 2")]
    InvalidSectorCount { sectors: u32 },

    /// The adaptive mode was asked for zero growth iterations
    #[error("Growth steps ({steps}) must be at least 1")]
    InvalidGrowthSteps { steps: u32 },

    /// The input image has no pixels
    ///
    /// Clamped coordinate access has no valid pixel to fall back to in an
    /// empty buffer, so zero-area inputs are rejected up front.
    #[error("Image is empty: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}
