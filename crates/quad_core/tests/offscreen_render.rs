use glam::{Vec2, Vec4};
use quad_core::event::SizeEvent;
use quad_core::offscreen::OffscreenTarget;
use quad_core::overlay::FpsOverlay;
use quad_core::renderer::{QuadRenderer, QuadUniforms};
use quad_core::state::QuadState;

const W: u32 = 256;
const H: u32 = 256;

// CI machines without any adapter (not even a software one) skip these.
fn target() -> Option<OffscreenTarget> {
    match pollster::block_on(OffscreenTarget::new(W, H)) {
        Ok(t) => Some(t),
        Err(e) => {
            eprintln!("skipping offscreen test: {}", e);
            None
        }
    }
}

fn pixel(rgba: &[u8], x: u32, y: u32) -> (i32, i32, i32) {
    let idx = ((y * W + x) * 4) as usize;
    (rgba[idx] as i32, rgba[idx + 1] as i32, rgba[idx + 2] as i32)
}

#[test]
fn centered_pointer_draws_quad_up_and_right_of_center() {
    let Some(target) = target() else { return };
    let renderer = QuadRenderer::new(target.device(), target.format()).unwrap();
    let uniforms = QuadUniforms::new(Vec4::new(0.0, 1.0, 0.0, 1.0), Vec2::new(0.5, 0.5));
    let rgba = target.render(&renderer, &uniforms, None).unwrap();
    assert_eq!(rgba.len(), (W * H * 4) as usize);

    // quad spans clip x,y in [0, 0.4]: pixels x 128..179, y 77..128
    let (r, g, b) = pixel(&rgba, 150, 100);
    assert!(r < 30 && g > 200 && b < 30, "unexpected quad color {},{},{}", r, g, b);

    let (r, g, b) = pixel(&rgba, 20, 20);
    assert!(r > 240 && g > 240 && b > 240, "background not white: {},{},{}", r, g, b);
    let (r, g, b) = pixel(&rgba, 100, 150);
    assert!(r > 240 && g > 240 && b > 240, "background not white: {},{},{}", r, g, b);
}

#[test]
fn quad_corner_follows_pointer() {
    let Some(target) = target() else { return };
    let renderer = QuadRenderer::new(target.device(), target.format()).unwrap();
    let mut state = QuadState::new();
    state.resize(SizeEvent::new(W, H, 1.0));
    state.set_touch(64.0, 192.0);
    // 50 steps puts green at 0.5
    for _ in 0..49 {
        state.advance_green();
    }
    let uniforms = state.frame_uniforms();
    let rgba = target.render(&renderer, &uniforms, None).unwrap();

    // bottom-left corner sits on the pointer: pixels x 64..115, y 141..192
    let (r, g, b) = pixel(&rgba, 90, 170);
    assert!(r < 30 && (g - 128).abs() <= 2 && b < 30, "unexpected quad color {},{},{}", r, g, b);
    let (r, g, b) = pixel(&rgba, 150, 100);
    assert!(r > 240 && g > 240 && b > 240, "center should be clear: {},{},{}", r, g, b);
    renderer.release();
}

#[test]
fn green_is_stored_linearly() {
    let Some(target) = target() else { return };
    let renderer = QuadRenderer::new(target.device(), target.format()).unwrap();
    let uniforms = QuadUniforms::new(Vec4::new(0.0, 0.5, 0.0, 1.0), Vec2::new(0.5, 0.5));
    let rgba = target.render(&renderer, &uniforms, None).unwrap();
    let (_, g, _) = pixel(&rgba, 150, 100);
    assert!((g - 128).abs() <= 2, "green 0.5 stored as {}", g);
    renderer.release();
}

#[test]
fn fps_overlay_sits_bottom_left() {
    let Some(target) = target() else { return };
    let renderer = QuadRenderer::new(target.device(), target.format()).unwrap();
    let mut overlay = FpsOverlay::new(target.device(), target.format()).unwrap();
    overlay.update(target.device(), target.queue(), 60, SizeEvent::new(W, H, 1.0));
    let uniforms = QuadUniforms::new(Vec4::new(0.0, 1.0, 0.0, 1.0), Vec2::new(0.5, 0.5));
    let rgba = target.render(&renderer, &uniforms, Some(&overlay)).unwrap();

    // "FPS:60" is 31x8 texels drawn at 2x, 8px in from the corner:
    // pixels x 8..70, y 232..248
    let (r, g, b) = pixel(&rgba, 9, 233);
    assert!(
        (60..130).contains(&r) && (60..130).contains(&g) && (60..130).contains(&b),
        "panel should darken the white clear: {},{},{}",
        r,
        g,
        b
    );
    // top bar of the 'F' is lit; upside down this texel would be panel
    let (r, g, b) = pixel(&rgba, 17, 235);
    assert!(r > 240 && g > 240 && b > 240, "glyph texel not lit: {},{},{}", r, g, b);
    let (r, g, b) = pixel(&rgba, 240, 20);
    assert!(r > 240 && g > 240 && b > 240, "top-right should stay white: {},{},{}", r, g, b);
    let (r, g, b) = pixel(&rgba, 80, 240);
    assert!(r > 240 && g > 240 && b > 240, "right of the panel should stay white: {},{},{}", r, g, b);

    overlay.release();
    renderer.release();
}
