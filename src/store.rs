//! # Parameter Store
//!
//! Validated storage for the three reverb parameters, shared between a
//! control thread (UI, scripting) and the audio thread.
//!
//! Each value lives in its own `AtomicF32`. The control side writes with
//! `set`, the audio side reads with `snapshot` once per frame; neither ever
//! takes a lock, so the audio thread can't be stalled by a slow UI. The
//! three fields are independent knobs, so a frame that sees a new room size
//! alongside the previous mix is harmless.

use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;

use crate::dsp::engine::ReverbParameters;
use crate::error::ReverbError;
use crate::params::ParamId;

#[derive(Debug)]
pub struct ParameterStore {
    values: [AtomicF32; 3],
}

impl ParameterStore {
    /// A store holding every parameter's default.
    pub fn new() -> Self {
        Self {
            values: ParamId::ALL.map(|id| AtomicF32::new(id.spec().default)),
        }
    }

    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()].load(Ordering::Relaxed)
    }

    /// Store `value`, silently clamped to the parameter's declared range.
    pub fn set(&self, id: ParamId, value: f32) {
        self.values[id.index()].store(id.spec().clamp(value), Ordering::Relaxed);
    }

    /// Look a parameter up by display name or id.
    pub fn get_by_name(&self, name: &str) -> Result<f32, ReverbError> {
        Ok(self.get(name.parse()?))
    }

    pub fn set_by_name(&self, name: &str, value: f32) -> Result<(), ReverbError> {
        self.set(name.parse()?, value);
        Ok(())
    }

    /// All three values at once, ready for the engine.
    pub fn snapshot(&self) -> ReverbParameters {
        ReverbParameters {
            room_size: self.get(ParamId::RoomSize),
            damping: self.get(ParamId::Damping),
            mix: self.get(ParamId::Mix),
        }
    }

    /// Put every parameter back to its default.
    pub fn reset(&self) {
        for id in ParamId::ALL {
            self.set(id, id.spec().default);
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
