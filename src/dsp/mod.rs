//! # DSP (Digital Signal Processing) Core
//!
//! Host-independent building blocks of the reverb:
//!
//! - **`delay_line`**: a fixed-capacity ring buffer whose active length sets
//!   the delay, with the input and the damped output written back into the
//!   same slot.
//!
//! - **`engine`**: two delay lines (left and right), the three parameters
//!   and the dry/wet mixing law.

pub mod delay_line;
pub mod engine;
