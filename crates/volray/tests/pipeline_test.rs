//! End-to-end pipeline test against a headless GPU.
//!
//! Ignored by default: CI machines without a graphics adapter cannot run
//! it. Run manually with `cargo test -- --ignored`.

use pollster::FutureExt;
use volray::*;

#[test]
#[ignore = "requires a GPU adapter"]
fn test_headless_pipeline() {
    let mut engine = RenderEngine::new_headless(256, 256, ShaderSet::embedded())
        .block_on()
        .expect("failed to create headless engine");

    engine.set_volume(&volray::demo::synthesize(64));
    assert!(engine.has_volume());

    let curve = TransferCurve::default();
    let mut options = RenderOptions::default();
    options.background = Vec4::ZERO;
    let scene = FrameScene {
        rotation: Mat4::IDENTITY,
        curve: &curve,
        options,
    };

    engine.render_frame(&scene).expect("frame failed");
    let pixels = engine.read_pixels().expect("readback failed");
    assert_eq!(pixels.len(), 256 * 256 * 4);

    // The screen corner lies outside the bounding cube's silhouette and
    // must keep the background exactly.
    assert_eq!(&pixels[0..4], &[0, 0, 0, 0]);

    // The center ray passes through the demo volume's dense core; under
    // maximum-intensity projection it resolves near white.
    let center = (128 * 256 + 128) * 4;
    assert!(
        pixels[center] > 200,
        "center pixel unexpectedly dark: {}",
        pixels[center]
    );

    // Resizing reallocates the entry/exit targets and leaves the transfer
    // LUT at its fixed width.
    engine.resize(640, 480);
    assert_eq!(engine.target_dimensions(), (640, 480));
    assert_eq!(engine.lut_width(), 512);
    engine.render_frame(&scene).expect("frame after resize failed");
    let pixels = engine.read_pixels().expect("readback after resize failed");
    assert_eq!(pixels.len(), 640 * 480 * 4);
}
