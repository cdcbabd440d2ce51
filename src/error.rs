//! # Errors
//!
//! Everything that can fail in the reverb fails at construction or lookup
//! time. The per-sample path (`process_frame`) is total and never returns
//! an error, because real-time audio code has nowhere to report one.

use thiserror::Error;

/// Errors raised while building the engine or addressing parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReverbError {
    /// A delay line was asked to hold fewer than one sample.
    #[error("invalid delay capacity: {capacity} samples (must be at least 1)")]
    InvalidCapacity { capacity: usize },

    /// The buffer for a delay line of this many samples could not be
    /// allocated (too large for the address space, or the allocator refused).
    #[error("cannot allocate a delay buffer of {capacity} samples")]
    BufferTooLarge { capacity: usize },

    /// A parameter name did not match any declared parameter.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
}
