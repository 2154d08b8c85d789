//! Compositing modes and the reference ray march.
//!
//! Each mode implements a uniform accumulate-and-terminate contract, so a
//! new mode is one more enum variant and never a change to the march loop.
//! The WGSL ray-cast shader mirrors this module case for case; the host
//! implementation here is the semantics of record and is what the tests
//! drive.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::settings::RaySettings;
use crate::transfer::TransferCurve;
use crate::volume::Volume;

/// Accumulated opacity at which a front-to-back march stops early.
pub const OPACITY_SATURATION: f32 = 0.99;

/// Scalar threshold the isosurface modes search for.
pub const ISO_THRESHOLD: f32 = 0.5;

/// How samples along a ray combine into one pixel color.
///
/// Discriminants are the shader-side mode ids; negative values are debug
/// visualizations of intermediate textures and never march.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(i32)]
pub enum ColorMode {
    /// Debug: entry-point volume coordinates shown as red/green.
    TexcoordAsRg = -1,
    /// Debug: the entry (front-face) texture.
    FrontTexture = -2,
    /// Debug: the exit (back-face) texture.
    BackTexture = -3,
    /// Debug: the transfer-function lookup texture, keyed by screen x.
    TransferFunctionTexture = -4,
    /// Maximum-intensity projection.
    #[default]
    MaxIntensity = 0,
    /// Front-to-back alpha compositing with early termination.
    FrontToBackAlpha = 1,
    /// First iso-crossing, Blinn-Phong shaded.
    IsosurfaceBlinnPhong = 2,
    /// First iso-crossing, reflection shaded.
    IsosurfaceReflection = 3,
}

impl ColorMode {
    /// All modes, in the order the UI cycles through them.
    pub const ALL: [ColorMode; 8] = [
        ColorMode::TexcoordAsRg,
        ColorMode::FrontTexture,
        ColorMode::BackTexture,
        ColorMode::TransferFunctionTexture,
        ColorMode::MaxIntensity,
        ColorMode::FrontToBackAlpha,
        ColorMode::IsosurfaceBlinnPhong,
        ColorMode::IsosurfaceReflection,
    ];

    /// The integer the ray-cast shader receives.
    #[must_use]
    pub fn shader_id(self) -> i32 {
        self as i32
    }

    /// Whether this mode bypasses the march to visualize an intermediate.
    #[must_use]
    pub fn is_debug(self) -> bool {
        self.shader_id() < 0
    }

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ColorMode::TexcoordAsRg => "Debug: Texcoord as RG",
            ColorMode::FrontTexture => "Debug: Front Face Texture",
            ColorMode::BackTexture => "Debug: Back Face Texture",
            ColorMode::TransferFunctionTexture => "Debug: Transfer Function Texture",
            ColorMode::MaxIntensity => "Maximum Intensity",
            ColorMode::FrontToBackAlpha => "Front To Back Alpha",
            ColorMode::IsosurfaceBlinnPhong => "Isosurface (Blinn-Phong)",
            ColorMode::IsosurfaceReflection => "Isosurface (Reflection)",
        }
    }

    /// The next mode in UI order, wrapping.
    #[must_use]
    pub fn next(self) -> Self {
        let at = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(at + 1) % Self::ALL.len()]
    }

    /// The previous mode in UI order, wrapping.
    #[must_use]
    pub fn prev(self) -> Self {
        let at = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(at + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// One sample delivered to a compositor by the march loop.
#[derive(Debug, Clone, Copy)]
pub struct RaySample {
    /// Volume-local sample position.
    pub position: Vec3,
    /// Trilinear-filtered scalar at `position`.
    pub scalar: f32,
}

/// Whether the march should continue after a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Stop,
}

/// Constant per-ray inputs shared by every compositor variant.
pub struct CompositeParams<'a> {
    pub volume: &'a Volume,
    pub curve: &'a TransferCurve,
    /// Density multiplier from the settings.
    pub density: f32,
    /// March step length.
    pub step_length: f32,
    /// Normalized ray direction, entry toward exit.
    pub direction: Vec3,
}

/// Per-ray accumulation state, one variant per marching color mode.
#[derive(Debug, Clone)]
pub enum Compositor {
    MaxIntensity {
        max_scalar: f32,
    },
    FrontToBackAlpha {
        /// Premultiplied RGB plus accumulated opacity.
        accum: Vec4,
    },
    Isosurface {
        reflective: bool,
        previous: f32,
        hit: Option<RaySample>,
    },
}

impl Compositor {
    /// The compositor for a marching mode; `None` for debug modes.
    #[must_use]
    pub fn for_mode(mode: ColorMode) -> Option<Self> {
        match mode {
            ColorMode::MaxIntensity => Some(Compositor::MaxIntensity { max_scalar: 0.0 }),
            ColorMode::FrontToBackAlpha => Some(Compositor::FrontToBackAlpha {
                accum: Vec4::ZERO,
            }),
            ColorMode::IsosurfaceBlinnPhong => Some(Compositor::Isosurface {
                reflective: false,
                previous: 0.0,
                hit: None,
            }),
            ColorMode::IsosurfaceReflection => Some(Compositor::Isosurface {
                reflective: true,
                previous: 0.0,
                hit: None,
            }),
            _ => None,
        }
    }

    /// Folds one sample into the accumulation state.
    pub fn accumulate(&mut self, sample: RaySample, params: &CompositeParams<'_>) -> Step {
        match self {
            Compositor::MaxIntensity { max_scalar } => {
                *max_scalar = max_scalar.max(sample.scalar);
                Step::Continue
            }
            Compositor::FrontToBackAlpha { accum } => {
                let looked_up = params.curve.evaluate(sample.scalar);
                // Opacity correction keeps the image stable under
                // step-length refinement.
                let alpha =
                    (looked_up.w * params.density * params.step_length).clamp(0.0, 1.0);
                let remaining = 1.0 - accum.w;
                accum.x += remaining * looked_up.x * alpha;
                accum.y += remaining * looked_up.y * alpha;
                accum.z += remaining * looked_up.z * alpha;
                accum.w += remaining * alpha;
                if accum.w >= OPACITY_SATURATION {
                    Step::Stop
                } else {
                    Step::Continue
                }
            }
            Compositor::Isosurface { previous, hit, .. } => {
                if hit.is_none() && *previous < ISO_THRESHOLD && sample.scalar >= ISO_THRESHOLD {
                    *hit = Some(sample);
                    return Step::Stop;
                }
                *previous = sample.scalar;
                Step::Continue
            }
        }
    }

    /// Resolves the accumulated state into a premultiplied RGBA color.
    #[must_use]
    pub fn finish(&self, params: &CompositeParams<'_>) -> Vec4 {
        match self {
            Compositor::MaxIntensity { max_scalar } => {
                let c = (params.curve.evaluate(*max_scalar) * params.density)
                    .clamp(Vec4::ZERO, Vec4::ONE);
                Vec4::new(c.x * c.w, c.y * c.w, c.z * c.w, c.w)
            }
            Compositor::FrontToBackAlpha { accum } => *accum,
            Compositor::Isosurface { reflective, hit, .. } => match hit {
                None => Vec4::ZERO,
                Some(sample) => {
                    let normal = surface_normal(params.volume, sample.position);
                    let base = params.curve.evaluate(sample.scalar);
                    let rgb = if *reflective {
                        shade_reflection(normal, params.direction, base.truncate())
                    } else {
                        shade_blinn_phong(normal, params.direction, base.truncate())
                    };
                    Vec4::new(rgb.x, rgb.y, rgb.z, 1.0)
                }
            },
        }
    }
}

/// Outward surface normal from the scalar gradient (density is higher
/// inside, so the normal is the negated gradient).
fn surface_normal(volume: &Volume, p: Vec3) -> Vec3 {
    let g = volume.gradient(p);
    if g.length_squared() > 1e-12 {
        -g.normalize()
    } else {
        Vec3::Z
    }
}

/// Blinn-Phong with a headlight riding the ray.
fn shade_blinn_phong(normal: Vec3, ray_dir: Vec3, base: Vec3) -> Vec3 {
    let light = -ray_dir;
    let view = -ray_dir;
    let halfway = (light + view).normalize_or_zero();
    let diffuse = normal.dot(light).max(0.0);
    let specular = normal.dot(halfway).max(0.0).powf(32.0);
    (base * (0.1 + 0.9 * diffuse) + Vec3::splat(0.4 * specular))
        .clamp(Vec3::ZERO, Vec3::ONE)
}

/// Mirror the view direction about the normal and shade into a two-tone
/// procedural environment.
fn shade_reflection(normal: Vec3, ray_dir: Vec3, base: Vec3) -> Vec3 {
    let reflected = ray_dir - 2.0 * ray_dir.dot(normal) * normal;
    let sky = Vec3::new(0.6, 0.7, 0.9);
    let ground = Vec3::new(0.2, 0.15, 0.1);
    let env = ground.lerp(sky, reflected.y * 0.5 + 0.5);
    (base * 0.3 + env * 0.7).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Output gamma and inversion, applied to the composited ray color only
/// (never to uncovered background pixels).
#[must_use]
pub fn post_process(color: Vec4, settings: &RaySettings) -> Vec4 {
    let mut rgb = color.truncate();
    if settings.gamma_correction {
        rgb = rgb.powf(1.0 / 2.2);
    }
    if settings.color_inversion {
        rgb = Vec3::ONE - rgb;
    }
    Vec4::new(rgb.x, rgb.y, rgb.z, color.w)
}

/// Reference ray march: the host-side twin of the ray-cast fragment
/// shader, stepping from `entry` toward `exit` in `step_length`
/// increments and compositing through the transfer curve.
///
/// Returns the final pixel color blended over `background`. Rays without
/// bounding-geometry coverage return the background exactly.
#[must_use]
pub fn march_ray(
    entry: Option<Vec3>,
    exit: Option<Vec3>,
    volume: &Volume,
    curve: &TransferCurve,
    settings: &RaySettings,
    background: Vec4,
) -> Vec4 {
    let (Some(p0), Some(p1)) = (entry, exit) else {
        return background;
    };
    let Some(mut compositor) = Compositor::for_mode(settings.color_mode) else {
        return background;
    };

    let length = (p1 - p0).length();
    let direction = if length > 0.0 {
        (p1 - p0) / length
    } else {
        Vec3::ZERO
    };
    let params = CompositeParams {
        volume,
        curve,
        density: settings.density,
        step_length: settings.step_length,
        direction,
    };
    let steps = (length / settings.step_length).ceil() as usize;

    for i in 0..steps {
        let position = p0 + direction * (settings.step_length * i as f32);
        let sample = RaySample {
            position,
            scalar: volume.sample(position),
        };
        if compositor.accumulate(sample, &params) == Step::Stop {
            break;
        }
    }

    let composited = post_process(compositor.finish(&params), settings);
    // Premultiplied source over background.
    let src_rgb = composited.truncate();
    let blended = src_rgb + background.truncate() * (1.0 - composited.w);
    Vec4::new(blended.x, blended.y, blended.z, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    fn sphere_volume(n: u32) -> Volume {
        // Density 1 inside a centered sphere of radius 0.35, 0 outside.
        let mut data = Vec::with_capacity((n * n * n) as usize);
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    let p = (Vec3::new(x as f32, y as f32, z as f32) + 0.5) / n as f32
                        - Vec3::splat(0.5);
                    data.push(if p.length() < 0.35 { 255 } else { 0 });
                }
            }
        }
        Volume::from_parts(UVec3::splat(n), Vec3::ONE, data).unwrap()
    }

    fn params<'a>(
        volume: &'a Volume,
        curve: &'a TransferCurve,
        settings: &RaySettings,
    ) -> CompositeParams<'a> {
        CompositeParams {
            volume,
            curve,
            density: settings.density,
            step_length: settings.step_length,
            direction: Vec3::Z,
        }
    }

    fn grayscale_curve() -> TransferCurve {
        TransferCurve::from_points(&[(0.0, Vec4::ZERO), (1.0, Vec4::ONE)]).unwrap()
    }

    #[test]
    fn test_mode_ids_match_shader_contract() {
        assert_eq!(ColorMode::TexcoordAsRg.shader_id(), -1);
        assert_eq!(ColorMode::FrontTexture.shader_id(), -2);
        assert_eq!(ColorMode::BackTexture.shader_id(), -3);
        assert_eq!(ColorMode::TransferFunctionTexture.shader_id(), -4);
        assert_eq!(ColorMode::MaxIntensity.shader_id(), 0);
        assert_eq!(ColorMode::FrontToBackAlpha.shader_id(), 1);
        assert_eq!(ColorMode::IsosurfaceBlinnPhong.shader_id(), 2);
        assert_eq!(ColorMode::IsosurfaceReflection.shader_id(), 3);
    }

    #[test]
    fn test_mode_cycling_wraps() {
        let mut mode = ColorMode::MaxIntensity;
        for _ in 0..ColorMode::ALL.len() {
            mode = mode.next();
        }
        assert_eq!(mode, ColorMode::MaxIntensity);
        assert_eq!(ColorMode::TexcoordAsRg.prev(), ColorMode::IsosurfaceReflection);
    }

    #[test]
    fn test_no_coverage_returns_background_exactly() {
        let volume = sphere_volume(16);
        let curve = grayscale_curve();
        let settings = RaySettings {
            gamma_correction: true,
            ..RaySettings::default()
        };
        let background = Vec4::new(0.1, 0.2, 0.3, 0.0);
        let got = march_ray(None, None, &volume, &curve, &settings, background);
        assert_eq!(got, background);
    }

    #[test]
    fn test_max_intensity_invariant_to_direction() {
        let volume = sphere_volume(32);
        let curve = grayscale_curve();
        let settings = RaySettings {
            color_mode: ColorMode::MaxIntensity,
            density: 1.0,
            ..RaySettings::default()
        };
        let p0 = Vec3::new(0.5, 0.5, 0.05);
        let p1 = Vec3::new(0.5, 0.5, 0.95);
        let forward = march_ray(Some(p0), Some(p1), &volume, &curve, &settings, Vec4::ZERO);
        let backward = march_ray(Some(p1), Some(p0), &volume, &curve, &settings, Vec4::ZERO);
        assert!((forward - backward).length() < 1e-3);
    }

    #[test]
    fn test_front_to_back_stable_under_refinement() {
        let volume = sphere_volume(32);
        let curve = grayscale_curve();
        let coarse = RaySettings {
            color_mode: ColorMode::FrontToBackAlpha,
            step_length: 0.01,
            density: 20.0,
            gamma_correction: false,
            ..RaySettings::default()
        };
        let fine = RaySettings {
            step_length: 0.005,
            ..coarse
        };
        let p0 = Vec3::new(0.5, 0.5, 0.0);
        let p1 = Vec3::new(0.5, 0.5, 1.0);
        let a = march_ray(Some(p0), Some(p1), &volume, &curve, &coarse, Vec4::ZERO);
        let b = march_ray(Some(p0), Some(p1), &volume, &curve, &fine, Vec4::ZERO);
        assert!(
            (a - b).length() < 0.1,
            "halving the step moved the color by {}",
            (a - b).length()
        );
    }

    #[test]
    fn test_front_to_back_saturates_and_stops() {
        let curve = TransferCurve::from_points(&[(0.0, Vec4::ONE), (1.0, Vec4::ONE)]).unwrap();
        let volume = sphere_volume(8);
        let settings = RaySettings {
            color_mode: ColorMode::FrontToBackAlpha,
            density: 1000.0,
            step_length: 0.01,
            ..RaySettings::default()
        };
        let p = params(&volume, &curve, &settings);
        let mut compositor = Compositor::for_mode(ColorMode::FrontToBackAlpha).unwrap();
        let sample = RaySample {
            position: Vec3::splat(0.5),
            scalar: 1.0,
        };
        // Alpha 1 per sample: the very first accumulate saturates.
        assert_eq!(compositor.accumulate(sample, &p), Step::Stop);
        let Compositor::FrontToBackAlpha { accum } = compositor else {
            unreachable!()
        };
        assert!(accum.w >= OPACITY_SATURATION);
    }

    #[test]
    fn test_isosurface_hits_sphere_from_both_sides() {
        let volume = sphere_volume(32);
        let curve = grayscale_curve();
        let settings = RaySettings {
            color_mode: ColorMode::IsosurfaceBlinnPhong,
            step_length: 0.005,
            ..RaySettings::default()
        };
        let p = CompositeParams {
            direction: Vec3::Z,
            ..params(&volume, &curve, &settings)
        };
        let mut compositor = Compositor::for_mode(settings.color_mode).unwrap();
        let mut hit_position = None;
        for i in 0..200 {
            let position = Vec3::new(0.5, 0.5, 0.005 * i as f32);
            let sample = RaySample {
                position,
                scalar: volume.sample(position),
            };
            if compositor.accumulate(sample, &p) == Step::Stop {
                hit_position = Some(position);
                break;
            }
        }
        let hit = hit_position.expect("ray through the sphere center must hit");
        // Sphere radius 0.35: the first crossing sits near z = 0.15.
        assert!((hit.z - 0.15).abs() < 0.05);
        let color = compositor.finish(&p);
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn test_isosurface_miss_is_transparent() {
        let volume = sphere_volume(16);
        let curve = grayscale_curve();
        let settings = RaySettings {
            color_mode: ColorMode::IsosurfaceBlinnPhong,
            ..RaySettings::default()
        };
        let background = Vec4::new(0.25, 0.25, 0.25, 0.0);
        // A ray grazing the corner never crosses the threshold.
        let got = march_ray(
            Some(Vec3::new(0.02, 0.02, 0.0)),
            Some(Vec3::new(0.02, 0.02, 1.0)),
            &volume,
            &curve,
            &settings,
            background,
        );
        assert!((got.truncate() - background.truncate()).length() < 1e-6);
    }

    #[test]
    fn test_post_process_gamma_and_inversion() {
        let settings = RaySettings {
            gamma_correction: true,
            color_inversion: true,
            ..RaySettings::default()
        };
        let out = post_process(Vec4::new(0.25, 0.25, 0.25, 1.0), &settings);
        let expected = 1.0 - 0.25f32.powf(1.0 / 2.2);
        assert!((out.x - expected).abs() < 1e-6);
        assert_eq!(out.w, 1.0);
    }

    #[test]
    fn test_debug_modes_have_no_compositor() {
        for mode in ColorMode::ALL {
            assert_eq!(Compositor::for_mode(mode).is_none(), mode.is_debug());
        }
    }
}
