//! The scalar volume and its host-side sampler.

use glam::{UVec3, Vec3};

use crate::error::{CoreError, CoreResult};

/// A 3-D scalar field sampled on a regular grid.
///
/// Voxels are stored x-fastest, one byte each, holding normalized density
/// (0 maps to 0.0, 255 to 1.0). The volume is immutable once constructed;
/// reloading data means constructing a new `Volume`.
#[derive(Debug, Clone)]
pub struct Volume {
    dim: UVec3,
    spacing: Vec3,
    data: Vec<u8>,
}

impl Volume {
    /// Builds a volume from already-parsed grid data.
    ///
    /// Fails when a dimension is zero, a spacing component is not strictly
    /// positive, or `data.len()` does not equal `dim.x * dim.y * dim.z`.
    pub fn from_parts(dim: UVec3, spacing: Vec3, data: Vec<u8>) -> CoreResult<Self> {
        if dim.x == 0 || dim.y == 0 || dim.z == 0 {
            return Err(CoreError::VolumeDimensions {
                dim: (dim.x, dim.y, dim.z),
            });
        }
        if spacing.x <= 0.0 || spacing.y <= 0.0 || spacing.z <= 0.0 {
            return Err(CoreError::VolumeSpacing {
                spacing: (spacing.x, spacing.y, spacing.z),
            });
        }
        let expected = dim.x as usize * dim.y as usize * dim.z as usize;
        if data.len() != expected {
            return Err(CoreError::VolumeSize {
                dim: (dim.x, dim.y, dim.z),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { dim, spacing, data })
    }

    /// Grid dimensions in voxels.
    #[must_use]
    pub fn dim(&self) -> UVec3 {
        self.dim
    }

    /// Physical spacing between adjacent voxels.
    #[must_use]
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Physical extent of the whole grid.
    #[must_use]
    pub fn extent(&self) -> Vec3 {
        self.dim.as_vec3() * self.spacing
    }

    /// Total voxel count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the volume holds no voxels. Construction forbids this, so
    /// this is always false for a built `Volume`; kept for the usual
    /// `len`/`is_empty` pairing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The raw voxel bytes, x-fastest.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Fetches one voxel, clamping coordinates to the grid.
    #[must_use]
    pub fn voxel(&self, x: u32, y: u32, z: u32) -> u8 {
        let x = x.min(self.dim.x - 1) as usize;
        let y = y.min(self.dim.y - 1) as usize;
        let z = z.min(self.dim.z - 1) as usize;
        let nx = self.dim.x as usize;
        let ny = self.dim.y as usize;
        self.data[(z * ny + y) * nx + x]
    }

    /// Fetches one voxel as a normalized scalar in `[0, 1]`.
    #[must_use]
    pub fn scalar(&self, x: u32, y: u32, z: u32) -> f32 {
        f32::from(self.voxel(x, y, z)) / 255.0
    }

    /// Trilinear-filtered sample at a volume-local coordinate in `[0, 1]^3`.
    ///
    /// Matches GPU sampler semantics: texel centers sit at `(i + 0.5) / n`
    /// and coordinates outside the grid clamp to the edge, so this agrees
    /// with a linear-filtered, clamp-to-edge 3-D texture fetch up to
    /// floating-point rounding.
    #[must_use]
    pub fn sample(&self, p: Vec3) -> f32 {
        let u = p.x * self.dim.x as f32 - 0.5;
        let v = p.y * self.dim.y as f32 - 0.5;
        let w = p.z * self.dim.z as f32 - 0.5;

        let x0 = u.floor();
        let y0 = v.floor();
        let z0 = w.floor();
        let fx = u - x0;
        let fy = v - y0;
        let fz = w - z0;

        let clamp = |c: f32, n: u32| -> u32 {
            if c <= 0.0 {
                0
            } else {
                (c as u32).min(n - 1)
            }
        };
        let x0i = clamp(x0, self.dim.x);
        let x1i = clamp(x0 + 1.0, self.dim.x);
        let y0i = clamp(y0, self.dim.y);
        let y1i = clamp(y0 + 1.0, self.dim.y);
        let z0i = clamp(z0, self.dim.z);
        let z1i = clamp(z0 + 1.0, self.dim.z);

        let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;

        let c00 = lerp(self.scalar(x0i, y0i, z0i), self.scalar(x1i, y0i, z0i), fx);
        let c10 = lerp(self.scalar(x0i, y1i, z0i), self.scalar(x1i, y1i, z0i), fx);
        let c01 = lerp(self.scalar(x0i, y0i, z1i), self.scalar(x1i, y0i, z1i), fx);
        let c11 = lerp(self.scalar(x0i, y1i, z1i), self.scalar(x1i, y1i, z1i), fx);

        let c0 = lerp(c00, c10, fy);
        let c1 = lerp(c01, c11, fy);
        lerp(c0, c1, fz)
    }

    /// Central-difference gradient of the scalar field at a volume-local
    /// coordinate. Points toward increasing density.
    #[must_use]
    pub fn gradient(&self, p: Vec3) -> Vec3 {
        let h = Vec3::ONE / self.dim.as_vec3();
        Vec3::new(
            self.sample(p + Vec3::new(h.x, 0.0, 0.0)) - self.sample(p - Vec3::new(h.x, 0.0, 0.0)),
            self.sample(p + Vec3::new(0.0, h.y, 0.0)) - self.sample(p - Vec3::new(0.0, h.y, 0.0)),
            self.sample(p + Vec3::new(0.0, 0.0, h.z)) - self.sample(p - Vec3::new(0.0, 0.0, h.z)),
        ) / (2.0 * h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_volume() -> Volume {
        // 4x4x4 ramp along x: voxel value = x * 85 (0, 85, 170, 255).
        let mut data = Vec::with_capacity(64);
        for _z in 0..4 {
            for _y in 0..4 {
                for x in 0..4u32 {
                    data.push((x * 85) as u8);
                }
            }
        }
        Volume::from_parts(UVec3::splat(4), Vec3::ONE, data).unwrap()
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Volume::from_parts(UVec3::new(2, 2, 2), Vec3::ONE, vec![0; 7]);
        assert!(matches!(err, Err(CoreError::VolumeSize { expected: 8, .. })));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = Volume::from_parts(UVec3::new(0, 2, 2), Vec3::ONE, vec![]);
        assert!(matches!(err, Err(CoreError::VolumeDimensions { .. })));
    }

    #[test]
    fn test_negative_spacing_rejected() {
        let err = Volume::from_parts(UVec3::ONE, Vec3::new(1.0, -1.0, 1.0), vec![0]);
        assert!(matches!(err, Err(CoreError::VolumeSpacing { .. })));
    }

    #[test]
    fn test_voxel_layout_x_fastest() {
        let data: Vec<u8> = (0..8).collect();
        let vol = Volume::from_parts(UVec3::splat(2), Vec3::ONE, data).unwrap();
        assert_eq!(vol.voxel(1, 0, 0), 1);
        assert_eq!(vol.voxel(0, 1, 0), 2);
        assert_eq!(vol.voxel(0, 0, 1), 4);
        assert_eq!(vol.voxel(1, 1, 1), 7);
    }

    #[test]
    fn test_voxel_clamps_out_of_range() {
        let vol = gradient_volume();
        assert_eq!(vol.voxel(100, 0, 0), vol.voxel(3, 0, 0));
    }

    #[test]
    fn test_sample_at_texel_center_is_exact() {
        let vol = gradient_volume();
        // Texel center of voxel (2, 0, 0) is at x = 2.5/4.
        let s = vol.sample(Vec3::new(2.5 / 4.0, 0.5 / 4.0, 0.5 / 4.0));
        assert!((s - 170.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_interpolates_between_centers() {
        let vol = gradient_volume();
        // Halfway between voxel centers 1 and 2 along x.
        let s = vol.sample(Vec3::new(2.0 / 4.0, 0.5 / 4.0, 0.5 / 4.0));
        let expected = (85.0 + 170.0) / 2.0 / 255.0;
        assert!((s - expected).abs() < 1e-6);
    }

    #[test]
    fn test_sample_clamps_to_edge() {
        let vol = gradient_volume();
        let inside = vol.sample(Vec3::new(0.999, 0.5, 0.5));
        let outside = vol.sample(Vec3::new(5.0, 0.5, 0.5));
        assert!((inside - outside).abs() < 1e-6);
    }

    #[test]
    fn test_gradient_points_up_the_ramp() {
        let vol = gradient_volume();
        let g = vol.gradient(Vec3::splat(0.5));
        assert!(g.x > 0.0);
        assert!(g.y.abs() < 1e-4);
        assert!(g.z.abs() < 1e-4);
    }

    #[test]
    fn test_extent() {
        let vol = Volume::from_parts(
            UVec3::new(10, 20, 30),
            Vec3::new(0.5, 1.0, 2.0),
            vec![0; 6000],
        )
        .unwrap();
        assert_eq!(vol.extent(), Vec3::new(5.0, 20.0, 60.0));
    }
}
