//! # Control Surface
//!
//! A rendering-agnostic model of the reverb's on-screen controls: three
//! horizontal bar sliders stacked vertically, one per parameter.
//!
//! ```text
//!  (x, y) ┌████████████░░░░░░░░░░░░┐  Room Size: 0.50
//!         └────────────────────────┘
//!         ┌████████████░░░░░░░░░░░░┐  Damping: 0.50
//!         └────────────────────────┘
//!         ┌███████░░░░░░░░░░░░░░░░░┐  Mix: 0.30
//!         └────────────────────────┘
//! ```
//!
//! The filled width of each bar is proportional to the value. Pressing on a
//! bar jumps the value to the pointer and starts a drag; while dragging, the
//! pointer's x position maps linearly onto the parameter's range (even when
//! it leaves the bar vertically). Whatever draws the widgets only has to
//! forward pointer events here and paint the [`SliderView`]s that come back.

use crate::params::ParamId;
use crate::store::ParameterStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// One bar slider bound to a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    pub param: ParamId,
    pub rect: Rect,
}

impl Slider {
    /// The parameter value for a pointer at screen `x`, snapped to the step.
    pub fn value_at(&self, x: f32) -> f32 {
        let spec = self.param.spec();
        let normalized = ((x - self.rect.x) / self.rect.width).clamp(0.0, 1.0);
        spec.snap(spec.denormalize(normalized))
    }

    /// How much of the bar to fill for `value`.
    pub fn fill_width(&self, value: f32) -> f32 {
        self.rect.width * self.param.spec().normalize(value)
    }
}

/// Everything needed to draw one slider.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderView {
    pub param: ParamId,
    pub rect: Rect,
    pub fill_width: f32,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct ControlSurface {
    sliders: [Slider; 3],
    /// Index of the slider being dragged.
    active: Option<usize>,
}

impl ControlSurface {
    /// The default layout: 200x20 bars starting at (20, 30), 40px apart.
    pub fn new() -> Self {
        Self::with_layout(20.0, 30.0, 200.0, 20.0, 40.0)
    }

    /// Stack the sliders from `(x, y)` downwards, `spacing` apart.
    pub fn with_layout(x: f32, y: f32, width: f32, height: f32, spacing: f32) -> Self {
        let mut row = 0.0;
        let sliders = ParamId::ALL.map(|param| {
            let rect = Rect {
                x,
                y: y + row * spacing,
                width,
                height,
            };
            row += 1.0;
            Slider { param, rect }
        });

        Self {
            sliders,
            active: None,
        }
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    /// The parameter currently being dragged, if any.
    pub fn active(&self) -> Option<ParamId> {
        self.active.map(|i| self.sliders[i].param)
    }

    /// Which slider, if any, is under the pointer.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<ParamId> {
        self.slider_at(x, y).map(|i| self.sliders[i].param)
    }

    fn slider_at(&self, x: f32, y: f32) -> Option<usize> {
        self.sliders.iter().position(|s| s.rect.contains(x, y))
    }

    /// Pointer pressed. A hit starts a drag and writes the value under the
    /// pointer; a miss does nothing.
    pub fn press(&mut self, x: f32, y: f32, store: &ParameterStore) -> Option<ParamId> {
        let index = self.slider_at(x, y)?;
        self.active = Some(index);

        let slider = &self.sliders[index];
        store.set(slider.param, slider.value_at(x));
        Some(slider.param)
    }

    /// Pointer moved with the button held.
    pub fn drag(&mut self, x: f32, store: &ParameterStore) {
        if let Some(index) = self.active {
            let slider = &self.sliders[index];
            store.set(slider.param, slider.value_at(x));
        }
    }

    pub fn release(&mut self) {
        self.active = None;
    }

    /// Current label text and bar fill for every slider.
    pub fn views(&self, store: &ParameterStore) -> Vec<SliderView> {
        self.sliders
            .iter()
            .map(|slider| {
                let value = store.get(slider.param);
                SliderView {
                    param: slider.param,
                    rect: slider.rect,
                    fill_width: slider.fill_width(value),
                    label: format!("{}: {:.2}", slider.param.spec().name, value),
                }
            })
            .collect()
    }
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::new()
    }
}
