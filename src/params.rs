//! # Parameters
//!
//! The reverb has three knobs. Each is declared once, in [`SPECS`], with a
//! stable id, a display name, a default, a range and a step size. Both the
//! lock-free [`ParameterStore`](crate::store::ParameterStore) and the
//! host-facing [`PluginParams`] are built from that table, so the control
//! surface and the DAW always agree on names and ranges.
//!
//! ## Stable IDs
//!
//! The `#[id = "..."]` strings on [`PluginParams`] are what the host stores
//! in projects and presets. Once published, never change them or existing
//! sessions will lose their settings. They must match [`ParamSpec::id`].
//!
//! ## Parameter Smoothing
//!
//! Host automation can jump a value from one sample to the next. All three
//! parameters ramp linearly to new values so a change of room size or mix
//! never produces a click. The DSP core itself applies values immediately;
//! smoothing is purely a property of the plugin wrapper.

use std::fmt;
use std::str::FromStr;

use nih_plug::prelude::*;

use crate::dsp::engine::ReverbParameters;
use crate::error::ReverbError;

/// Names the three reverb parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    RoomSize,
    Damping,
    Mix,
}

impl ParamId {
    /// All parameters, in display order.
    pub const ALL: [ParamId; 3] = [ParamId::RoomSize, ParamId::Damping, ParamId::Mix];

    /// The static declaration for this parameter.
    pub fn spec(self) -> &'static ParamSpec {
        &SPECS[self.index()]
    }

    pub(crate) fn index(self) -> usize {
        match self {
            ParamId::RoomSize => 0,
            ParamId::Damping => 1,
            ParamId::Mix => 2,
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

/// Accepts either the display name ("Room Size") or the stable id ("room"),
/// ignoring ASCII case.
impl FromStr for ParamId {
    type Err = ReverbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ParamId::ALL
            .into_iter()
            .find(|id| {
                let spec = id.spec();
                spec.name.eq_ignore_ascii_case(s) || spec.id.eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| ReverbError::UnknownParameter(s.to_owned()))
    }
}

/// Declaration of one user-facing parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Stable id used by hosts to save and recall the value.
    pub id: &'static str,
    /// Human-readable name shown in the DAW and on the control surface.
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    /// Granularity of user edits.
    pub step: f32,
}

impl ParamSpec {
    /// Clamp `value` into `[min, max]`. NaN becomes `min`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Round `value` to the nearest step, then clamp.
    pub fn snap(&self, value: f32) -> f32 {
        let steps = ((value - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }

    /// Where `value` sits inside the range, from 0.0 at `min` to 1.0 at `max`.
    pub fn normalize(&self, value: f32) -> f32 {
        (self.clamp(value) - self.min) / (self.max - self.min)
    }

    /// Inverse of [`normalize`](Self::normalize).
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.clamp(self.min + normalized * (self.max - self.min))
    }
}

/// Declarations for every parameter, indexed by [`ParamId`].
pub static SPECS: [ParamSpec; 3] = [
    // Scales the delay length: 0 is a one-sample "room", 1 the full buffer.
    ParamSpec {
        id: "room",
        name: "Room Size",
        default: ReverbParameters::DEFAULT.room_size,
        min: 0.0,
        max: 1.0,
        step: 0.01,
    },
    // Feedback gain: how much of each echo survives the next trip.
    ParamSpec {
        id: "damp",
        name: "Damping",
        default: ReverbParameters::DEFAULT.damping,
        min: 0.0,
        max: 1.0,
        step: 0.01,
    },
    // Linear dry/wet crossfade.
    ParamSpec {
        id: "mix",
        name: "Mix",
        default: ReverbParameters::DEFAULT.mix,
        min: 0.0,
        max: 1.0,
        step: 0.01,
    },
];

/// All user-facing parameters for the Simple Reverb plugin.
///
/// The `#[derive(Params)]` macro registers these with the host, handles
/// preset serialization and drives the smoothers.
#[derive(Params)]
pub struct PluginParams {
    /// **Room Size**: longer delay, bigger space.
    ///
    /// Smoothed over 50ms: the delay length moves in whole samples, and a
    /// slower ramp keeps the head from skipping large chunks of the buffer.
    #[id = "room"]
    pub room_size: FloatParam,

    /// **Damping**: feedback gain.
    ///
    /// At 1.0 the tail never decays, which is allowed here: the core has no
    /// stability cap, and the host is told the tail is infinite.
    #[id = "damp"]
    pub damping: FloatParam,

    /// **Mix**: dry/wet balance.
    #[id = "mix"]
    pub mix: FloatParam,
}

impl PluginParams {
    /// The current (unsmoothed) values as engine parameters.
    pub fn values(&self) -> ReverbParameters {
        ReverbParameters {
            room_size: self.room_size.value(),
            damping: self.damping.value(),
            mix: self.mix.value(),
        }
    }
}

impl Default for PluginParams {
    fn default() -> Self {
        Self {
            room_size: float_param(ParamId::RoomSize, 50.0)
                .with_value_to_string(formatters::v2s_f32_rounded(2)),
            damping: float_param(ParamId::Damping, 20.0)
                .with_value_to_string(formatters::v2s_f32_rounded(2)),
            mix: float_param(ParamId::Mix, 20.0)
                .with_unit("%")
                // Display as percentage: 0.30 → "30.0%"
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),
        }
    }
}

/// Build a linear `FloatParam` from its declaration.
fn float_param(id: ParamId, smoothing_ms: f32) -> FloatParam {
    let spec = id.spec();
    FloatParam::new(
        spec.name,
        spec.default,
        FloatRange::Linear {
            min: spec.min,
            max: spec.max,
        },
    )
    .with_smoother(SmoothingStyle::Linear(smoothing_ms))
    .with_step_size(spec.step)
}
