//! # Feedback Delay Line (Ring Buffer)
//!
//! A feedback delay line stores audio samples in a circular buffer and
//! plays each one back exactly `active_len` samples after it was written.
//! Whatever comes out is scaled by a feedback gain and written straight
//! back in alongside the new input, so every echo produces another, quieter
//! echo one period later. Stacking those decaying echoes is what makes a
//! plain delay sound like a room.
//!
//! ## How This Ring Buffer Differs From a Tap Delay
//!
//! A tap delay keeps a fixed-size buffer and moves a *read head* to change
//! the delay time. This delay line instead has a single head that reads and
//! writes the same slot, and changes the delay time by shrinking or growing
//! the portion of the buffer the head travels over:
//!
//! ```text
//!  capacity ───────────────────────────────────────────────►
//! ┌────┬────┬────┬────┬────┬────┬────┬────┬────┬────┬────┐
//! │    │    │ ▲  │    │    │    │    │    │    │    │    │
//! └────┴────┴─┼──┴────┴────┴────┴────┴────┴────┴────┴────┘
//!  ◄──────── active_len ────────►   (unused tail)
//!             │
//!         write_pos: read old sample, write new one, step forward
//! ```
//!
//! Because the head visits a slot only once per trip around the active
//! region, the sample it reads was written exactly `active_len` samples ago.
//!
//! ## The Per-Sample Step
//!
//! 1. **Read** `buffer[write_pos]` (the delayed sample).
//! 2. **Write** `input + feedback * delayed` into the *same* slot.
//! 3. **Advance** `write_pos`, wrapping at `active_len`.
//!
//! The read-before-write order at one index is the whole topology. Swapping
//! steps 1 and 2 would hand back `input + feedback * delayed` instead of the
//! delayed sample, so the dry signal would leak straight into the wet path
//! (and with no feedback the line would stop delaying at all).

use crate::error::ReverbError;

/// A fixed-capacity circular buffer with a variable active length.
///
/// The buffer is allocated once in [`DelayLine::new`] and never resized, so
/// changing the room size during playback never touches the allocator.
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// The circular buffer storing audio samples, zeroed on construction.
    buffer: Vec<f32>,

    /// Where the head currently sits. Always `< active_len`.
    write_pos: usize,

    /// How many slots of `buffer` the head cycles through. Always in
    /// `1..=buffer.len()`, so the modulo in `process()` can never divide
    /// by zero.
    active_len: usize,
}

impl DelayLine {
    /// Create a delay line holding up to `capacity` samples.
    ///
    /// The active length starts at the full capacity. A capacity of zero is
    /// rejected: a delay line with no storage cannot delay anything, and it
    /// would make the wrap arithmetic divide by zero. A capacity the
    /// allocator can't satisfy is reported as `BufferTooLarge` rather than
    /// aborting.
    pub fn new(capacity: usize) -> Result<Self, ReverbError> {
        if capacity == 0 {
            return Err(ReverbError::InvalidCapacity { capacity });
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| ReverbError::BufferTooLarge { capacity })?;
        buffer.resize(capacity, 0.0);

        Ok(Self {
            buffer,
            write_pos: 0,
            active_len: capacity,
        })
    }

    /// The fixed number of samples this line can hold.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// The current delay, in samples.
    pub fn active_len(&self) -> usize {
        self.active_len
    }

    /// The head position, in `0..active_len`.
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Change the delay length, clamped to `1..=capacity`.
    ///
    /// A requested length of 0 becomes 1 (a one-sample delay). If the head
    /// is beyond the new end of the active region it wraps back inside, so
    /// the next `process()` call always lands on a valid slot.
    pub fn set_active_len(&mut self, len: usize) {
        self.active_len = len.clamp(1, self.buffer.len());
        if self.write_pos >= self.active_len {
            self.write_pos %= self.active_len;
        }
    }

    /// Run one sample through the feedback loop and return the delayed sample.
    ///
    /// # Arguments
    /// * `input` - The new sample entering the line.
    /// * `feedback` - How much of the delayed sample is written back. With
    ///   `0.0` the line is a plain delay; with `0.5` each repeat is half as
    ///   loud as the one before.
    #[inline]
    pub fn process(&mut self, input: f32, feedback: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        self.buffer[self.write_pos] = input + feedback * delayed;
        self.write_pos = (self.write_pos + 1) % self.active_len;
        delayed
    }

    /// Clear the buffer to silence and rewind the head.
    ///
    /// Called when the host stops playback so old reverb tails don't leak
    /// into the next play. The active length is kept.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
