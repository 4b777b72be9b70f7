use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use quad_core::app::{Demo, Flow, Frame, Scene};
use quad_core::event::{HostEvent, PaintEvent, SizeEvent, TouchEvent, TouchKind};
use quad_core::lifecycle::{LifecycleEvent, Stage};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Start(SizeEvent),
    Paint(Frame),
    Publish,
    Stop,
}

// Records every call so tests can assert on the exact order.
struct RecordingScene {
    calls: Rc<RefCell<Vec<Call>>>,
    fail_start: bool,
    fail_paint: bool,
}

impl RecordingScene {
    fn new(calls: Rc<RefCell<Vec<Call>>>) -> Self {
        Self { calls, fail_start: false, fail_paint: false }
    }
}

impl Scene for RecordingScene {
    fn on_start(&mut self, viewport: SizeEvent) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call::Start(viewport));
        if self.fail_start {
            anyhow::bail!("shader compile failed");
        }
        Ok(())
    }

    fn on_paint(&mut self, frame: &Frame) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call::Paint(*frame));
        if self.fail_paint {
            anyhow::bail!("surface acquire failed");
        }
        Ok(())
    }

    fn publish(&mut self) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call::Publish);
        Ok(())
    }

    fn on_stop(&mut self) {
        self.calls.borrow_mut().push(Call::Stop);
    }
}

fn visible() -> LifecycleEvent {
    LifecycleEvent::new(Stage::Alive, Stage::Visible)
}

fn hidden() -> LifecycleEvent {
    LifecycleEvent::new(Stage::Visible, Stage::Alive)
}

fn paint() -> HostEvent {
    HostEvent::Paint(PaintEvent { external: false })
}

fn touch(x: f32, y: f32) -> HostEvent {
    HostEvent::Touch(TouchEvent { x, y, sequence: 0, kind: TouchKind::Move })
}

#[test]
fn becoming_visible_starts_and_requests_paint() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut demo = Demo::default();
    let size = SizeEvent::new(320, 240, 1.0);
    assert_eq!(demo.handle(HostEvent::Size(size)), Flow::Continue);
    let flow = demo.handle_lifecycle(visible(), Some(RecordingScene::new(calls.clone())));
    assert_eq!(flow, Flow::RequestPaint);
    assert!(demo.is_visible());
    assert_eq!(*calls.borrow(), vec![Call::Start(size)]);
}

#[test]
fn paint_draws_publishes_and_asks_for_more() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut demo = Demo::default();
    demo.handle(HostEvent::Size(SizeEvent::new(200, 100, 1.0)));
    demo.handle_lifecycle(visible(), Some(RecordingScene::new(calls.clone())));
    demo.handle(touch(150.0, 25.0));

    assert_eq!(demo.handle(paint()), Flow::RequestPaint);
    let recorded = calls.borrow();
    assert_eq!(recorded.len(), 3);
    match &recorded[1] {
        Call::Paint(frame) => {
            assert_eq!(frame.uniforms.offset, [0.75, 0.25]);
            assert!((frame.uniforms.color[1] - 0.01).abs() < 1e-6);
            assert_eq!(frame.viewport, SizeEvent::new(200, 100, 1.0));
        }
        other => panic!("expected paint, got {:?}", other),
    }
    assert_eq!(recorded[2], Call::Publish);
}

#[test]
fn external_paint_is_skipped() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut demo = Demo::default();
    demo.handle_lifecycle(visible(), Some(RecordingScene::new(calls.clone())));
    let flow = demo.handle(HostEvent::Paint(PaintEvent { external: true }));
    assert_eq!(flow, Flow::Continue);
    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(demo.state().green(), 0.0);
}

#[test]
fn paint_without_context_is_skipped() {
    let mut demo: Demo<RecordingScene> = Demo::default();
    assert_eq!(demo.handle(paint()), Flow::Continue);
    assert_eq!(demo.state().green(), 0.0);
}

#[test]
fn becoming_invisible_stops_scene() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut demo = Demo::default();
    demo.handle_lifecycle(visible(), Some(RecordingScene::new(calls.clone())));
    assert_eq!(demo.handle(HostEvent::Lifecycle(hidden())), Flow::Continue);
    assert!(!demo.is_visible());
    assert_eq!(*calls.borrow().last().unwrap(), Call::Stop);
    // nothing is drawn once hidden
    assert_eq!(demo.handle(paint()), Flow::Continue);
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn failed_start_keeps_painting() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut demo = Demo::default();
    let mut scene = RecordingScene::new(calls.clone());
    scene.fail_start = true;
    assert_eq!(demo.handle_lifecycle(visible(), Some(scene)), Flow::RequestPaint);
    assert_eq!(demo.handle(paint()), Flow::RequestPaint);
    assert_eq!(calls.borrow().len(), 3);
}

#[test]
fn failed_paints_are_not_counted_as_frames() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut demo = Demo::new(Duration::from_secs(1));
    let mut scene = RecordingScene::new(calls.clone());
    scene.fail_paint = true;
    demo.handle_lifecycle(visible(), Some(scene));
    let start = Instant::now();
    for i in 0..5u64 {
        assert_eq!(demo.handle_at(paint(), start + Duration::from_millis(i * 10)), Flow::RequestPaint);
    }
    let recorded = calls.borrow();
    assert!(!recorded.contains(&Call::Publish));
    let fps: Vec<u32> = recorded
        .iter()
        .filter_map(|c| match c {
            Call::Paint(f) => Some(f.fps),
            _ => None,
        })
        .collect();
    assert_eq!(fps, vec![0; 5]);
}

#[test]
fn focus_changes_do_not_restart() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut demo = Demo::default();
    demo.handle_lifecycle(visible(), Some(RecordingScene::new(calls.clone())));
    let flow = demo.handle(HostEvent::Lifecycle(LifecycleEvent::new(Stage::Visible, Stage::Focused)));
    assert_eq!(flow, Flow::Continue);
    assert!(demo.is_visible());
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn visible_without_context_stays_hidden() {
    let mut demo: Demo<RecordingScene> = Demo::default();
    assert_eq!(demo.handle(HostEvent::Lifecycle(visible())), Flow::Continue);
    assert!(!demo.is_visible());
}

#[test]
fn resize_after_touch_recenters() {
    let mut demo: Demo<RecordingScene> = Demo::default();
    demo.handle(touch(5.0, 6.0));
    demo.handle(HostEvent::Size(SizeEvent::new(1080, 1921, 3.0)));
    assert_eq!(demo.state().touch().to_array(), [540.0, 960.0]);
    demo.handle(touch(7.0, 8.0));
    assert_eq!(demo.state().touch().to_array(), [7.0, 8.0]);
}

#[test]
fn overlay_sees_previous_second_of_frames() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut demo = Demo::new(Duration::from_secs(1));
    demo.handle_lifecycle(visible(), Some(RecordingScene::new(calls.clone())));
    let start = Instant::now();
    for i in 0..10u64 {
        demo.handle_at(paint(), start + Duration::from_millis(i * 10));
    }
    let last_fps = calls
        .borrow()
        .iter()
        .rev()
        .find_map(|c| match c {
            Call::Paint(f) => Some(f.fps),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_fps, 9);
}

#[test]
fn green_cycles_through_paints() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut demo = Demo::default();
    demo.handle_lifecycle(visible(), Some(RecordingScene::new(calls.clone())));
    for _ in 0..100 {
        demo.handle(paint());
    }
    assert_eq!(demo.state().green(), 0.0);
}
