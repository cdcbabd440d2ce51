//! # Simple Reverb: A Feedback Delay-Line Reverb Plugin
//!
//! A stereo "Schroeder-style" reverb built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug). Outputs Audio Unit
//! (AUv2), VST3 and CLAP formats from a single codebase.
//!
//! ## Signal Flow (per channel)
//!
//! ```text
//! Input ──┬─────────────────────────────────────── × (1 - mix) ───┐
//!         │                                                       │
//!         │    ┌───────────────────────────────────────────┐      │
//!         │    │              FEEDBACK LOOP                │      │
//!         │    │                                           │      │
//!         └──►(+)──► [Delay Line, room_size × capacity] ───┼──┐   │
//!              ▲                                           │  │   │
//!              └──────────────── × damping ◄───────────────┘  │   │
//!                                                             │   │
//!                                                  × mix ─────┴─►(+)──► Output
//! ```
//!
//! ## Crate Layout
//!
//! - [`dsp`]: the delay line and the stereo engine; no host types.
//! - [`params`]: parameter declarations and the host-facing `PluginParams`.
//! - [`store`]: lock-free parameter storage for non-host control threads.
//! - [`control`]: slider model mapping pointer input to parameter writes.
//!
//! The plugin itself (`SimpleReverb`) is a thin wrapper that feeds host
//! buffers and smoothed host parameters into a [`ReverbEngine`]. It takes
//! its parameters from the host, so it never builds a [`ParameterStore`] or
//! [`ControlSurface`]. Those two are library API for embedding the engine
//! outside a plugin host: a UI or scripting thread writes the store (directly
//! or through the control surface) and the audio thread calls
//! [`ReverbEngine::apply`] once per frame.

pub mod control;
pub mod dsp;
pub mod error;
pub mod params;
pub mod store;

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

pub use control::ControlSurface;
pub use dsp::delay_line::DelayLine;
pub use dsp::engine::{ReverbEngine, ReverbParameters};
pub use error::ReverbError;
pub use params::{ParamId, ParamSpec, PluginParams};
pub use store::ParameterStore;

/// Longest delay the room size knob can reach, in seconds. The buffer
/// holds this much audio at whatever sample rate the host runs at.
pub const MAX_DELAY_SECONDS: f32 = 1.0;

/// The plugin struct.
///
/// Parameters are shared with the host through an `Arc` and may be read
/// from any thread. The engine (and with it every delay buffer) is owned by
/// the audio thread and only touched in `initialize()`, `reset()` and
/// `process()`.
struct SimpleReverb {
    params: Arc<PluginParams>,

    /// `None` until the host tells us the sample rate in `initialize()`.
    engine: Option<ReverbEngine>,
}

impl Default for SimpleReverb {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            engine: None,
        }
    }
}

impl Plugin for SimpleReverb {
    const NAME: &'static str = "Simple Reverb";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // The engine has exactly two delay lines, so stereo is the only layout.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(2),
        main_output_channels: NonZeroU32::new(2),
        aux_input_ports: &[],
        aux_output_ports: &[],
        names: PortNames::const_default(),
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Room size changes land on the exact sample the host automates them.
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate the delay buffers for the host's sample rate.
    ///
    /// Called again whenever the sample rate changes, in which case the old
    /// engine (and its tail) is replaced. Returning `false` tells the host
    /// this configuration can't be used.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        match ReverbEngine::new(buffer_config.sample_rate, MAX_DELAY_SECONDS) {
            Ok(mut engine) => {
                nih_plug::nih_log!(
                    "reverb engine ready: {} Hz, {} samples per channel",
                    buffer_config.sample_rate,
                    engine.capacity()
                );
                let p = self.params.values();
                engine.set_parameters(p.room_size, p.damping, p.mix);
                self.engine = Some(engine);
                true
            }
            Err(err) => {
                nih_plug::nih_error!(
                    "cannot initialize at {} Hz: {err}",
                    buffer_config.sample_rate
                );
                self.engine = None;
                false
            }
        }
    }

    /// Playback stopped: drop the tail so the next play starts clean.
    fn reset(&mut self) {
        if let Some(engine) = &mut self.engine {
            engine.reset();
        }
    }

    /// Run every frame of the buffer through the engine, in place.
    ///
    /// The smoothed parameter values are applied before each frame, so a
    /// knob movement in the middle of a buffer ramps in sample by sample.
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let Some(engine) = self.engine.as_mut() else {
            return ProcessStatus::Normal;
        };

        for mut frame in buffer.iter_samples() {
            let room_size = self.params.room_size.smoothed.next();
            let damping = self.params.damping.smoothed.next();
            let mix = self.params.mix.smoothed.next();
            engine.set_parameters(room_size, damping, mix);

            let in_l = frame.get_mut(0).map_or(0.0, |s| *s);
            let in_r = frame.get_mut(1).map_or(in_l, |s| *s);

            let (out_l, out_r) = engine.process_frame(in_l, in_r);

            if let Some(s) = frame.get_mut(0) {
                *s = out_l;
            }
            if let Some(s) = frame.get_mut(1) {
                *s = out_r;
            }
        }

        // Keep the host calling process() after the input goes silent,
        // for as long as the feedback loop is still audible.
        match engine.tail_samples() {
            Some(samples) => ProcessStatus::Tail(samples),
            None => ProcessStatus::KeepAlive,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for SimpleReverb {
    const CLAP_ID: &'static str = "com.loveless-audio.simple-reverb";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A stereo feedback delay-line reverb with room size, damping and mix");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Reverb,
    ];
}

impl Vst3Plugin for SimpleReverb {
    // 16 ASCII bytes, unique to this plugin.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssReverb_v001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Reverb];
}

nih_export_clap!(SimpleReverb);
nih_export_vst3!(SimpleReverb);

// Wrap the CLAP plugin into AUv2 for hosts that only load Audio Units.
clap_wrapper::export_auv2!();
