use anyhow::Result;
use quad_core::app::{Demo, Flow};
use quad_core::event::{HostEvent, PaintEvent, SizeEvent, TouchEvent, TouchKind};
use quad_core::gpu::{GpuContext, GpuScene};
use quad_core::lifecycle::{LifecycleEvent, Stage};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::DemoConfig;

/// Translates winit callbacks into `HostEvent`s for the demo loop.
pub struct DemoWindow {
    config: DemoConfig,
    window: Option<Arc<Window>>,
    demo: Demo<GpuScene>,
    stage: Stage,
    // Set while a redraw we asked for is outstanding; any other
    // RedrawRequested came from the platform.
    paint_requested: bool,
    mouse: MouseFinger,
}

/// Left-button mouse drags standing in for a single finger on desktop.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MouseFinger {
    cursor: PhysicalPosition<f64>,
    down: bool,
}

impl MouseFinger {
    fn new() -> Self {
        Self { cursor: PhysicalPosition::new(0.0, 0.0), down: false }
    }

    fn button(&mut self, state: ElementState) -> TouchEvent {
        self.down = state == ElementState::Pressed;
        let kind = if self.down { TouchKind::Begin } else { TouchKind::End };
        touch_event(kind, self.cursor, 0)
    }

    /// Only a move with the button held becomes a touch.
    fn moved(&mut self, position: PhysicalPosition<f64>) -> Option<TouchEvent> {
        self.cursor = position;
        self.down.then(|| touch_event(TouchKind::Move, position, 0))
    }
}

/// A redraw is ours only if we asked for one since the last redraw.
fn take_paint(paint_requested: &mut bool) -> PaintEvent {
    PaintEvent { external: !std::mem::take(paint_requested) }
}

fn touch_kind(phase: TouchPhase) -> TouchKind {
    match phase {
        TouchPhase::Started => TouchKind::Begin,
        TouchPhase::Moved => TouchKind::Move,
        TouchPhase::Ended | TouchPhase::Cancelled => TouchKind::End,
    }
}

fn touch_event(kind: TouchKind, position: PhysicalPosition<f64>, sequence: u64) -> TouchEvent {
    TouchEvent { x: position.x as f32, y: position.y as f32, sequence, kind }
}

impl DemoWindow {
    pub fn new(config: DemoConfig) -> Self {
        let demo = Demo::new(config.fps_log_interval());
        Self {
            config,
            window: None,
            demo,
            stage: Stage::Dead,
            paint_requested: false,
            mouse: MouseFinger::new(),
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn dispatch(&mut self, event: HostEvent) {
        let flow = self.demo.handle(event);
        self.apply(flow);
    }

    fn transition(&mut self, to: Stage, draw_context: Option<GpuScene>) {
        let event = LifecycleEvent::new(self.stage, to);
        self.stage = to;
        let flow = self.demo.handle_lifecycle(event, draw_context);
        self.apply(flow);
    }

    fn apply(&mut self, flow: Flow) {
        if flow == Flow::RequestPaint {
            if let Some(window) = &self.window {
                self.paint_requested = true;
                window.request_redraw();
            }
        }
    }

    fn size_event(window: &Window, size: PhysicalSize<u32>) -> HostEvent {
        HostEvent::Size(SizeEvent::new(size.width, size.height, window.scale_factor() as f32))
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(window) = &self.window {
            return Some(window.clone());
        }
        let window_attributes = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        match event_loop.create_window(window_attributes) {
            Ok(window) => {
                tracing::info!("Window created successfully");
                let window = Arc::new(window);
                self.window = Some(window.clone());
                Some(window)
            }
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                None
            }
        }
    }
}

impl ApplicationHandler for DemoWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.create_window(event_loop) else {
            event_loop.exit();
            return;
        };
        if self.stage < Stage::Alive {
            self.transition(Stage::Alive, None);
        }

        // Size first so the scene starts with the real viewport.
        self.dispatch(Self::size_event(&window, window.inner_size()));

        match pollster::block_on(GpuContext::new(window.clone(), self.config.vsync)) {
            Ok(gpu) => {
                let scene = GpuScene::new(gpu, self.config.show_fps);
                self.transition(Stage::Visible, Some(scene));
            }
            Err(e) => {
                tracing::error!("Failed to create GPU context: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if self.stage >= Stage::Visible {
            self.transition(Stage::Alive, None);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Window close requested");
                self.transition(Stage::Dead, None);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = self.window.clone() {
                    self.dispatch(Self::size_event(&window, size));
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.window.clone() {
                    self.dispatch(Self::size_event(&window, window.inner_size()));
                }
            }
            WindowEvent::Focused(focused) => {
                if focused && self.stage == Stage::Visible {
                    self.transition(Stage::Focused, None);
                } else if !focused && self.stage == Stage::Focused {
                    self.transition(Stage::Visible, None);
                }
            }
            WindowEvent::RedrawRequested => {
                let paint = take_paint(&mut self.paint_requested);
                self.dispatch(HostEvent::Paint(paint));
            }
            WindowEvent::Touch(Touch { phase, location, id, .. }) => {
                self.dispatch(HostEvent::Touch(touch_event(touch_kind(phase), location, id)));
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                let touch = self.mouse.button(state);
                self.dispatch(HostEvent::Touch(touch));
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(touch) = self.mouse.moved(position) {
                    self.dispatch(HostEvent::Touch(touch));
                }
            }
            other => tracing::trace!("unhandled event. e = {:?}", other),
        }
    }
}
