//! # Reverb Engine
//!
//! Two feedback delay lines (one per channel) plus the three parameters
//! that steer them. Each frame, both channels go through their delay line
//! and are blended with the dry input:
//!
//! ```text
//! wet = delay_line.process(input, damping)
//! out = (1 - mix) * input + mix * wet
//! ```
//!
//! ## Parameter Mapping
//!
//! | Parameter | Drives                      | Mapping                          |
//! |-----------|-----------------------------|----------------------------------|
//! | room size | delay length (in samples)   | `round(capacity * room_size)`, ≥ 1 |
//! | damping   | feedback gain               | used as-is                       |
//! | mix       | dry/wet crossfade           | linear                           |
//!
//! The capacity is derived from the host's sample rate, so a room size of
//! 0.5 with a one-second maximum is half a second at 44.1 kHz and at 96 kHz
//! alike.

use crate::dsp::delay_line::DelayLine;
use crate::error::ReverbError;
use crate::store::ParameterStore;

/// The three user-facing values, each normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParameters {
    pub room_size: f32,
    pub damping: f32,
    pub mix: f32,
}

impl ReverbParameters {
    /// Values a freshly loaded reverb starts with.
    pub const DEFAULT: Self = Self {
        room_size: 0.5,
        damping: 0.5,
        mix: 0.3,
    };

    /// Clamp every field into `[0, 1]`. NaN becomes 0.
    pub fn clamped(self) -> Self {
        Self {
            room_size: clamp_unit(self.room_size),
            damping: clamp_unit(self.damping),
            mix: clamp_unit(self.mix),
        }
    }
}

impl Default for ReverbParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Number of samples needed to hold `seconds` of audio at `sample_rate`.
///
/// Anything that doesn't produce at least one sample (zero, negative, NaN,
/// infinite) comes back as 0 so `DelayLine::new` rejects it. Huge finite
/// products saturate to `usize::MAX`, which the allocation then refuses.
fn capacity_for(sample_rate: f32, seconds: f32) -> usize {
    let samples = (f64::from(sample_rate) * f64::from(seconds)).round();
    if samples.is_finite() && samples >= 1.0 {
        samples as usize
    } else {
        0
    }
}

/// Linear dry/wet crossfade.
///
/// The endpoints return one side untouched: at `mix = 0` a runaway (infinite)
/// wet signal must not leak into the dry output through `0 * inf = NaN`, and
/// likewise for the dry side at `mix = 1`.
#[inline]
fn blend(dry: f32, wet: f32, mix: f32) -> f32 {
    if mix <= 0.0 {
        dry
    } else if mix >= 1.0 {
        wet
    } else {
        (1.0 - mix) * dry + mix * wet
    }
}

/// A stereo feedback delay reverb.
///
/// Owns its buffers outright: one engine per plugin instance, constructed
/// once the host has told us the sample rate.
#[derive(Debug, Clone)]
pub struct ReverbEngine {
    left: DelayLine,
    right: DelayLine,
    params: ReverbParameters,
}

impl ReverbEngine {
    /// Build an engine able to delay up to `max_delay_seconds` at `sample_rate`.
    ///
    /// Both delay lines are allocated and zeroed here. Parameters start at
    /// [`ReverbParameters::DEFAULT`].
    pub fn new(sample_rate: f32, max_delay_seconds: f32) -> Result<Self, ReverbError> {
        let capacity = capacity_for(sample_rate, max_delay_seconds);

        let mut engine = Self {
            left: DelayLine::new(capacity)?,
            right: DelayLine::new(capacity)?,
            params: ReverbParameters::DEFAULT,
        };
        engine.update_delay_lengths();

        Ok(engine)
    }

    /// The current (clamped) parameter values.
    pub fn parameters(&self) -> ReverbParameters {
        self.params
    }

    /// Samples each delay line can hold.
    pub fn capacity(&self) -> usize {
        self.left.capacity()
    }

    /// The current delay length in samples, shared by both channels.
    pub fn active_len(&self) -> usize {
        self.left.active_len()
    }

    pub fn left(&self) -> &DelayLine {
        &self.left
    }

    pub fn right(&self) -> &DelayLine {
        &self.right
    }

    /// Set all three parameters, clamping each into `[0, 1]`.
    ///
    /// Cheap enough to call every sample: no allocation, just a multiply,
    /// a round and a clamp per channel.
    pub fn set_parameters(&mut self, room_size: f32, damping: f32, mix: f32) {
        self.params = ReverbParameters {
            room_size,
            damping,
            mix,
        }
        .clamped();
        self.update_delay_lengths();
    }

    /// Pull the latest values out of a shared [`ParameterStore`].
    ///
    /// This is the audio-thread side of the control handoff: the store is
    /// read with atomic loads, so this never blocks.
    pub fn apply(&mut self, store: &ParameterStore) {
        let p = store.snapshot();
        self.set_parameters(p.room_size, p.damping, p.mix);
    }

    fn update_delay_lengths(&mut self) {
        let len = (self.capacity() as f64 * f64::from(self.params.room_size)).round() as usize;
        // DelayLine clamps to 1..=capacity, which covers room_size = 0.
        self.left.set_active_len(len);
        self.right.set_active_len(len);
    }

    /// Process one stereo frame and return the output frame.
    #[inline]
    pub fn process_frame(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let ReverbParameters { damping, mix, .. } = self.params;

        let wet_l = self.left.process(in_l, damping);
        let wet_r = self.right.process(in_r, damping);

        (blend(in_l, wet_l, mix), blend(in_r, wet_r, mix))
    }

    /// Silence both delay lines without reallocating.
    pub fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    /// How many samples the reverb keeps ringing after the input stops.
    ///
    /// Each trip around the loop scales the echo by `damping`, so after N
    /// trips it sits at `damping^N`. Solving `damping^N = 0.001` (-60 dB)
    /// gives `N = -3 / log10(damping)` trips of `active_len` samples each.
    /// Returns `None` when damping is 1 and the tail never decays.
    pub fn tail_samples(&self) -> Option<u32> {
        let damping = self.params.damping;
        let period = self.active_len() as f32;

        if damping >= 1.0 {
            None
        } else if damping > 0.001 {
            let repeats = -3.0 / damping.log10();
            Some((repeats * period) as u32)
        } else {
            // No feedback: a single echo, one period later.
            Some(period as u32)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    use crate::params::ParamId;

    /// 100 Hz with a one-second maximum keeps impulse tests short.
    fn small_engine() -> ReverbEngine {
        ReverbEngine::new(100.0, 1.0).unwrap()
    }

    #[test]
    fn test_defaults_after_construction() {
        let engine = ReverbEngine::new(44100.0, 1.0).unwrap();

        assert_eq!(engine.parameters(), ReverbParameters::DEFAULT);
        assert_eq!(engine.capacity(), 44100);
        assert_eq!(engine.active_len(), 22050);
    }

    #[test]
    fn test_capacity_follows_sample_rate() {
        assert_eq!(ReverbEngine::new(48000.0, 1.0).unwrap().capacity(), 48000);
        assert_eq!(ReverbEngine::new(96000.0, 0.5).unwrap().capacity(), 48000);
        assert_eq!(ReverbEngine::new(44100.0, 2.0).unwrap().capacity(), 88200);
    }

    #[test]
    fn test_degenerate_capacity_is_rejected() {
        for (rate, seconds) in [
            (0.0, 1.0),
            (44100.0, 0.0),
            (-44100.0, 1.0),
            (f32::NAN, 1.0),
            (44100.0, f32::INFINITY),
        ] {
            assert_eq!(
                ReverbEngine::new(rate, seconds).unwrap_err(),
                ReverbError::InvalidCapacity { capacity: 0 },
                "rate {rate}, seconds {seconds}"
            );
        }
    }

    #[test]
    fn test_oversized_capacity_is_an_error() {
        assert_eq!(
            ReverbEngine::new(f32::MAX, 1.0).unwrap_err(),
            ReverbError::BufferTooLarge { capacity: usize::MAX }
        );
    }

    #[test]
    fn test_length_scaling() {
        let mut engine = ReverbEngine::new(44100.0, 1.0).unwrap();

        engine.set_parameters(0.5, 0.5, 0.3);
        assert_eq!(engine.active_len(), 22050);

        engine.set_parameters(0.01, 0.5, 0.3);
        assert_eq!(engine.active_len(), 441);

        engine.set_parameters(1.0, 0.5, 0.3);
        assert_eq!(engine.active_len(), 44100);

        // Room size 0 would be a zero-length line; it is held at one sample.
        engine.set_parameters(0.0, 0.5, 0.3);
        assert_eq!(engine.active_len(), 1);
        assert_eq!(engine.right().active_len(), 1);
    }

    #[test]
    fn test_parameters_are_clamped() {
        let mut engine = small_engine();

        engine.set_parameters(2.0, -1.0, f32::NAN);

        assert_eq!(
            engine.parameters(),
            ReverbParameters {
                room_size: 1.0,
                damping: 0.0,
                mix: 0.0,
            }
        );
        assert_eq!(engine.active_len(), 100);
    }

    #[test]
    fn test_bypass_law() {
        let mut engine = small_engine();
        engine.set_parameters(0.3, 0.9, 0.0);

        for i in 0..500 {
            let l = (i as f32 * 0.37).sin();
            let r = (i as f32 * 0.11).cos() * 0.5;
            assert_eq!(engine.process_frame(l, r), (l, r), "frame {i}");
        }
    }

    /// Full feedback on a one-sample line doubles the stored value every
    /// frame until it overflows to infinity. The dry output must not notice.
    #[test]
    fn test_bypass_survives_runaway_feedback() {
        let mut engine = ReverbEngine::new(1.0, 1.0).unwrap();
        engine.set_parameters(1.0, 1.0, 0.0);

        for frame in 0..8 {
            assert_eq!(engine.process_frame(3e38, -3e38), (3e38, -3e38), "frame {frame}");
        }
    }

    /// The same runaway with a huge dry input at mix = 1: the output is the
    /// delay line's value, never NaN from `0 * dry`.
    #[test]
    fn test_full_wet_ignores_infinite_dry() {
        let mut engine = ReverbEngine::new(1.0, 1.0).unwrap();
        engine.set_parameters(1.0, 0.0, 1.0);

        assert_eq!(engine.process_frame(f32::INFINITY, 0.0), (0.0, 0.0));
        assert_eq!(engine.process_frame(0.0, 0.0).0, f32::INFINITY);
    }

    /// With mix = 1 the engine must output exactly what a lone delay line
    /// with the same settings would, whatever the damping.
    #[test]
    fn test_full_wet_law() {
        for damping in [0.0, 0.2, 0.7, 1.0] {
            let mut engine = small_engine();
            engine.set_parameters(0.25, damping, 1.0);

            let mut left = DelayLine::new(100).unwrap();
            let mut right = DelayLine::new(100).unwrap();
            left.set_active_len(25);
            right.set_active_len(25);

            for i in 0..300 {
                let l = ((i * 7) % 13) as f32 / 13.0 - 0.5;
                let r = ((i * 3) % 5) as f32 / 5.0;
                let expected = (left.process(l, damping), right.process(r, damping));
                assert_eq!(engine.process_frame(l, r), expected, "damping {damping}, frame {i}");
            }
        }
    }

    #[test]
    fn test_impulse_response() {
        let mut engine = small_engine();
        engine.set_parameters(0.5, 0.0, 1.0);
        let len = engine.active_len();
        assert_eq!(len, 50);

        for frame in 0..4 * len {
            let input = if frame == 0 { 1.0 } else { 0.0 };
            let (out_l, out_r) = engine.process_frame(input, 0.0);

            let expected = if frame == len { 1.0 } else { 0.0 };
            assert_eq!(out_l, expected, "frame {frame}");
            assert_eq!(out_r, 0.0, "right channel leaked at frame {frame}");
        }
    }

    /// The echo arriving at frame `(k + 1) * len` should have been through
    /// the feedback gain `k` times.
    #[test]
    fn test_feedback_decay() {
        let damping = 0.6_f32;
        let mut engine = small_engine();
        engine.set_parameters(0.2, damping, 1.0);
        let len = engine.active_len();

        let outputs: Vec<f32> = (0..8 * len)
            .map(|frame| {
                let input = if frame == 0 { 1.0 } else { 0.0 };
                engine.process_frame(input, input).0
            })
            .collect();

        for k in 0..7 {
            let echo = outputs[(k + 1) * len];
            let expected = damping.powi(k as i32);
            assert!(
                (echo - expected).abs() < 1e-6,
                "repeat {k}: expected {expected}, got {echo}"
            );
        }

        // Everything between the echoes stays silent.
        for (frame, out) in outputs.iter().enumerate() {
            if frame % len != 0 || frame == 0 {
                assert_eq!(*out, 0.0, "frame {frame}");
            }
        }
    }

    #[test]
    fn test_reset_silences_tail() {
        let mut engine = small_engine();
        engine.set_parameters(0.1, 0.9, 1.0);
        for _ in 0..5 {
            engine.process_frame(1.0, 1.0);
        }

        engine.reset();

        for _ in 0..200 {
            assert_eq!(engine.process_frame(0.0, 0.0), (0.0, 0.0));
        }
        assert_eq!(engine.active_len(), 10);
    }

    #[test]
    fn test_tail_samples() {
        let mut engine = small_engine();

        engine.set_parameters(0.5, 0.0, 0.3);
        assert_eq!(engine.tail_samples(), Some(50));

        // 0.1^3 = 0.001, so three trips of 50 samples.
        engine.set_parameters(0.5, 0.1, 0.3);
        let tail = engine.tail_samples().unwrap();
        assert!((149..=150).contains(&tail), "got {tail}");

        engine.set_parameters(0.5, 1.0, 0.3);
        assert_eq!(engine.tail_samples(), None);
    }

    #[test]
    fn test_apply_reads_store() {
        let store = ParameterStore::new();
        store.set(ParamId::RoomSize, 0.25);
        store.set(ParamId::Damping, 0.1);
        store.set(ParamId::Mix, 0.9);

        let mut engine = small_engine();
        engine.apply(&store);

        assert_eq!(
            engine.parameters(),
            ReverbParameters {
                room_size: 0.25,
                damping: 0.1,
                mix: 0.9,
            }
        );
        assert_eq!(engine.active_len(), 25);
    }

    /// A control thread hammers the store while the audio thread keeps
    /// applying it and processing frames.
    #[test]
    fn test_store_handoff_across_threads() {
        let store = Arc::new(ParameterStore::new());
        let writer_store = Arc::clone(&store);

        let writer = thread::spawn(move || {
            for i in 0..2_000 {
                let v = (i % 101) as f32 / 100.0;
                writer_store.set(ParamId::RoomSize, v);
                writer_store.set(ParamId::Damping, 1.0 - v);
                writer_store.set(ParamId::Mix, v * 2.0);
            }
        });

        let mut engine = small_engine();
        for i in 0..20_000 {
            engine.apply(&store);
            engine.process_frame((i as f32).sin(), 0.0);
            assert!(engine.left().write_pos() < engine.active_len());
            assert!(engine.active_len() <= engine.capacity());
        }

        writer.join().unwrap();
        engine.apply(&store);
        assert_eq!(engine.parameters(), store.snapshot());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Set(f32, f32, f32),
        Frame(f32, f32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-0.5f32..1.5, -0.5f32..1.5, -0.5f32..1.5).prop_map(|(r, d, m)| Op::Set(r, d, m)),
            (-1.0f32..1.0, -1.0f32..1.0).prop_map(|(l, r)| Op::Frame(l, r)),
        ]
    }

    proptest! {
        #[test]
        fn write_pos_stays_in_bounds(ops in prop::collection::vec(op_strategy(), 1..256)) {
            let mut engine = ReverbEngine::new(64.0, 1.0).unwrap();

            for op in ops {
                match op {
                    Op::Set(room, damping, mix) => engine.set_parameters(room, damping, mix),
                    Op::Frame(l, r) => {
                        engine.process_frame(l, r);
                    }
                }

                for line in [engine.left(), engine.right()] {
                    prop_assert!(line.write_pos() < line.active_len());
                    prop_assert!(line.active_len() >= 1);
                    prop_assert!(line.active_len() <= line.capacity());
                }
            }
        }
    }
}
