//! Integration tests for the volray facade.
//!
//! GPU-free checks only; the rendering pipeline itself is covered by
//! `pipeline_test.rs` (ignored unless a GPU adapter is present).

use volray::*;

/// Combined sequential checks over the public API, following the
/// crate-wide convention of one test function per concern group.
#[test]
fn test_api_basics() {
    // Transfer curve: the eight-point default with knots
    // [0,0,0.06,0.09,0.25,0.28,0.36,0.44,1,1]. Parameter 0.075 falls in
    // span [0.06, 0.09) and blends the second and third colors halfway.
    {
        let curve = TransferCurve::default();
        let got = curve.evaluate(0.075);
        let expected = curve.colors()[1].lerp(curve.colors()[2], 0.5);
        assert!((got - expected).length() < 1e-6);
    }

    // Trackball: a drag that returns to its anchor leaves the rotation
    // untouched.
    {
        let mut tb = Trackball::new(1280.0, 720.0);
        tb.start_tracking(Vec2::new(640.0, 360.0));
        tb.move_to(Vec2::new(640.0, 360.0));
        assert_eq!(tb.rotation(), Quat::IDENTITY);
        tb.stop_tracking();
    }

    // Settings: out-of-range control values clamp instead of erroring.
    {
        let mut options = RenderOptions::default();
        options.ray.set_step_length(99.0);
        assert_eq!(options.ray.step_length, 1.0);
        options.ray.set_step_length(0.0);
        assert_eq!(options.ray.step_length, 0.0001);
        options.ray.set_density(1e9);
        assert_eq!(options.ray.density, 1000.0);
        options.lens.set_zoom(99.0);
        assert_eq!(options.lens.zoom(), 4.0);
    }

    // Camera: the perspective field of view follows 2 / 2^zoom and
    // shrinks as zoom grows.
    {
        let mut camera = Camera::new(1.0);
        let mut last = f32::INFINITY;
        for step in 0..=8 {
            camera.zoom = step as f32 * 0.5;
            let fovy = camera.fovy();
            assert!((fovy - 2.0 / 2.0f32.powf(camera.zoom)).abs() < 1e-6);
            assert!(fovy < last);
            last = fovy;
        }
    }

    // Configuration: a missing root variable is an error; a set one
    // resolves the shader directory beneath it.
    {
        std::env::remove_var(ROOT_ENV_VAR);
        assert!(RootDir::from_env().is_err());

        std::env::set_var(ROOT_ENV_VAR, "/tmp/volray-root");
        let root = RootDir::from_env().unwrap();
        assert!(root
            .shader_dir()
            .ends_with("crates/volray-render/src/shaders"));
        std::env::remove_var(ROOT_ENV_VAR);
    }

    // Volume construction validates its invariants through the facade.
    {
        assert!(Volume::from_parts(UVec3::splat(4), Vec3::ONE, vec![0; 64]).is_ok());
        assert!(Volume::from_parts(UVec3::splat(4), Vec3::ONE, vec![0; 63]).is_err());
    }

    // The demo volume is a valid, unit-extent field.
    {
        let vol = volray::demo::synthesize(32);
        assert_eq!(vol.dim(), UVec3::splat(32));
        assert!((vol.extent() - Vec3::ONE).length() < 1e-6);
    }
}
