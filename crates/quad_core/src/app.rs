use std::time::{Duration, Instant};

use anyhow::Result;

use crate::event::{HostEvent, PaintEvent, SizeEvent, TouchEvent};
use crate::fps::FpsCounter;
use crate::lifecycle::{Cross, LifecycleEvent, Stage};
use crate::renderer::QuadUniforms;
use crate::state::QuadState;

/// Everything a scene needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub uniforms: QuadUniforms,
    pub viewport: SizeEvent,
    /// Frames presented during the last second, for the overlay.
    pub fps: u32,
}

/// Draw context handed over by the host when the app becomes visible.
///
/// A scene owns its GPU objects for exactly one visible period: they are
/// created in `on_start` and released in `on_stop`.
pub trait Scene {
    fn on_start(&mut self, viewport: SizeEvent) -> Result<()>;

    fn on_paint(&mut self, frame: &Frame) -> Result<()>;

    /// Shows what `on_paint` drew.
    fn publish(&mut self) -> Result<()>;

    fn on_stop(&mut self);
}

/// What the host should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Deliver a non-external paint event as soon as possible.
    RequestPaint,
}

/// The demo's event loop body: consumes host events one at a time, in the
/// order they were delivered.
pub struct Demo<S> {
    scene: Option<S>,
    state: QuadState,
    fps: FpsCounter,
}

impl<S: Scene> Demo<S> {
    pub fn new(fps_report_every: Duration) -> Self {
        Self {
            scene: None,
            state: QuadState::new(),
            fps: FpsCounter::new(fps_report_every),
        }
    }

    pub fn state(&self) -> &QuadState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.scene.is_some()
    }

    /// Handles any event that carries no draw context.
    pub fn handle(&mut self, event: HostEvent) -> Flow {
        self.handle_at(event, Instant::now())
    }

    pub fn handle_at(&mut self, event: HostEvent, now: Instant) -> Flow {
        match event {
            HostEvent::Lifecycle(e) => self.handle_lifecycle(e, None),
            HostEvent::Size(e) => {
                tracing::debug!("event is size. e = {}", event);
                self.on_size(e);
                Flow::Continue
            }
            HostEvent::Paint(e) => self.on_paint(e, now),
            HostEvent::Touch(e) => {
                tracing::debug!("event is touch. e = {}", event);
                self.on_touch(e);
                Flow::Continue
            }
        }
    }

    /// Handles a lifecycle transition. `draw_context` is only consumed when
    /// the transition makes the app visible.
    pub fn handle_lifecycle(&mut self, event: LifecycleEvent, draw_context: Option<S>) -> Flow {
        tracing::debug!("event is lifecycle. e = {}", event);
        match event.crosses(Stage::Visible) {
            Cross::On => {
                tracing::debug!("Crosses = {}", Cross::On);
                let Some(mut scene) = draw_context else {
                    tracing::warn!("app became visible without a draw context");
                    return Flow::Continue;
                };
                if let Err(e) = scene.on_start(self.state.viewport()) {
                    // No retry: the scene stays attached but has nothing to draw.
                    tracing::error!("{:#}", e);
                }
                self.scene = Some(scene);
                Flow::RequestPaint
            }
            Cross::Off => {
                tracing::debug!("Crosses = {}", Cross::Off);
                if let Some(mut scene) = self.scene.take() {
                    scene.on_stop();
                }
                self.fps.reset();
                Flow::Continue
            }
            Cross::None => {
                tracing::debug!("Crosses = other");
                Flow::Continue
            }
        }
    }

    fn on_size(&mut self, size: SizeEvent) {
        self.state.resize(size);
    }

    fn on_touch(&mut self, touch: TouchEvent) {
        self.state.set_touch(touch.x, touch.y);
    }

    fn on_paint(&mut self, paint: PaintEvent, now: Instant) -> Flow {
        tracing::trace!("event is paint. external = {}", paint.external);
        // We repaint as fast as the host allows, so paints the host sends on
        // its own would only double up frames.
        if paint.external {
            return Flow::Continue;
        }
        let Some(scene) = self.scene.as_mut() else {
            return Flow::Continue;
        };

        let frame = Frame {
            uniforms: self.state.frame_uniforms(),
            viewport: self.state.viewport(),
            fps: self.fps.fps(),
        };
        match scene.on_paint(&frame) {
            Ok(()) => {
                if let Err(e) = scene.publish() {
                    tracing::warn!("publish failed: {:#}", e);
                }
                self.fps.tick(now);
                if self.fps.should_report(now) {
                    tracing::info!("FPS: {}", self.fps.fps());
                }
            }
            Err(e) => tracing::warn!("paint failed: {:#}", e),
        }
        Flow::RequestPaint
    }
}

impl<S: Scene> Default for Demo<S> {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
