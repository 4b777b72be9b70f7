use glam::{Vec2, Vec4};

use crate::event::SizeEvent;
use crate::renderer::QuadUniforms;

/// Number of paint ticks in one full green cycle.
pub const GREEN_STEPS: u32 = 100;
const GREEN_STEP: f32 = 1.0 / GREEN_STEPS as f32;

/// Everything the demo mutates between frames.
///
/// Lives for the whole process and is only touched from the event loop;
/// GPU objects come and go with visibility, this does not.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadState {
    // Green is derived from a tick count so the cycle length never drifts
    // with float accumulation.
    green_tick: u32,
    touch: Vec2,
    viewport: SizeEvent,
}

impl QuadState {
    pub fn new() -> Self {
        Self {
            green_tick: 0,
            touch: Vec2::ZERO,
            viewport: SizeEvent::default(),
        }
    }

    pub fn green(&self) -> f32 {
        self.green_tick as f32 * GREEN_STEP
    }

    /// Moves green one step up, wrapping back to 0.0 after the last step.
    pub fn advance_green(&mut self) -> f32 {
        self.green_tick = (self.green_tick + 1) % GREEN_STEPS;
        self.green()
    }

    pub fn color(&self) -> Vec4 {
        Vec4::new(0.0, self.green(), 0.0, 1.0)
    }

    pub fn touch(&self) -> Vec2 {
        self.touch
    }

    pub fn set_touch(&mut self, x: f32, y: f32) {
        self.touch = Vec2::new(x, y);
    }

    pub fn viewport(&self) -> SizeEvent {
        self.viewport
    }

    /// Stores the new viewport and puts the pointer back at its midpoint.
    pub fn resize(&mut self, size: SizeEvent) {
        self.viewport = size;
        let (cx, cy) = size.center();
        self.touch = Vec2::new(cx, cy);
    }

    /// Pointer position as a fraction of the viewport, origin top-left.
    pub fn normalized_offset(&self) -> Vec2 {
        if self.viewport.is_empty() {
            return Vec2::ZERO;
        }
        let dims = Vec2::new(self.viewport.width_px as f32, self.viewport.height_px as f32);
        self.touch / dims
    }

    /// Advances the color cycle and returns the uniforms for the next draw.
    pub fn frame_uniforms(&mut self) -> QuadUniforms {
        self.advance_green();
        QuadUniforms::new(self.color(), self.normalized_offset())
    }
}

impl Default for QuadState {
    fn default() -> Self {
        Self::new()
    }
}
