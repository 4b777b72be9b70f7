use std::fmt;

use crate::lifecycle::LifecycleEvent;

/// Events delivered by the host, in delivery order, to the demo loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Lifecycle(LifecycleEvent),
    Size(SizeEvent),
    Paint(PaintEvent),
    Touch(TouchEvent),
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::Lifecycle(e) => write!(f, "lifecycle {}", e),
            HostEvent::Size(e) => write!(f, "size {}x{}px ({:.2} px/pt)", e.width_px, e.height_px, e.pixels_per_pt),
            HostEvent::Paint(e) => write!(f, "paint external={}", e.external),
            HostEvent::Touch(e) => write!(f, "touch {:?} #{} at ({:.1}, {:.1})", e.kind, e.sequence, e.x, e.y),
        }
    }
}

/// Viewport dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeEvent {
    pub width_px: u32,
    pub height_px: u32,
    pub pixels_per_pt: f32,
}

impl SizeEvent {
    pub fn new(width_px: u32, height_px: u32, pixels_per_pt: f32) -> Self {
        Self { width_px, height_px, pixels_per_pt }
    }

    /// Pixel midpoint, rounded down to whole pixels on each axis.
    pub fn center(&self) -> (f32, f32) {
        ((self.width_px / 2) as f32, (self.height_px / 2) as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.width_px == 0 || self.height_px == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintEvent {
    /// Set when the host asked for the redraw on its own rather than in
    /// answer to a paint this program requested.
    pub external: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    Begin,
    Move,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub x: f32,
    pub y: f32,
    pub sequence: u64,
    pub kind: TouchKind,
}
