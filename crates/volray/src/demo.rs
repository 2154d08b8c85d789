//! Procedural demo volume.
//!
//! File parsing is a collaborator outside this repository, so the viewer
//! ships with a synthesized scalar field: a soft ball with a dense core
//! and a thin outer shell, enough to exercise every compositing mode.

use glam::{UVec3, Vec3};

use volray_core::volume::Volume;

/// Grid resolution of the demo volume.
pub const DEMO_DIM: u32 = 128;

/// Synthesizes the demo volume at [`DEMO_DIM`] resolution.
#[must_use]
pub fn demo_volume() -> Volume {
    synthesize(DEMO_DIM)
}

/// Synthesizes the demo field at an arbitrary resolution.
#[must_use]
pub fn synthesize(n: u32) -> Volume {
    let mut data = Vec::with_capacity((n * n * n) as usize);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let p = (Vec3::new(x as f32, y as f32, z as f32) + 0.5) / n as f32;
                data.push((density_at(p) * 255.0).round() as u8);
            }
        }
    }
    Volume::from_parts(UVec3::splat(n), Vec3::splat(1.0 / n as f32), data)
        .expect("synthesized data matches its dimensions")
}

/// Density at a volume-local coordinate in `[0, 1]^3`.
fn density_at(p: Vec3) -> f32 {
    let r = (p - Vec3::splat(0.5)).length();

    // Dense core.
    let core = smooth_step(0.18, 0.10, r);
    // Soft body falling off toward the hull.
    let body = 0.55 * smooth_step(0.42, 0.22, r);
    // Thin shell near the surface.
    let shell = 0.35 * smooth_step(0.03, 0.0, (r - 0.38).abs());

    (core + body + shell).min(1.0)
}

/// 1 at `edge_in`, 0 at `edge_out`, smooth in between. Edges may be given
/// in either order.
fn smooth_step(edge_out: f32, edge_in: f32, x: f32) -> f32 {
    if (edge_out - edge_in).abs() < f32::EPSILON {
        return if x <= edge_in { 1.0 } else { 0.0 };
    }
    let t = ((x - edge_out) / (edge_in - edge_out)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_and_spacing() {
        let vol = synthesize(32);
        assert_eq!(vol.dim(), UVec3::splat(32));
        assert_eq!(vol.len(), 32 * 32 * 32);
        // Unit physical extent regardless of resolution.
        assert!((vol.extent() - Vec3::ONE).length() < 1e-6);
    }

    #[test]
    fn test_core_is_dense_and_corners_empty() {
        let vol = synthesize(64);
        assert!(vol.sample(Vec3::splat(0.5)) > 0.9);
        assert!(vol.sample(Vec3::splat(0.02)) < 0.05);
    }

    #[test]
    fn test_density_decreases_from_center_to_mid() {
        let vol = synthesize(64);
        let center = vol.sample(Vec3::splat(0.5));
        let mid = vol.sample(Vec3::new(0.5, 0.5, 0.72));
        assert!(center > mid);
    }
}
