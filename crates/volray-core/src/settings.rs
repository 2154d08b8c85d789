//! User-facing render settings.
//!
//! All mutable control state lives here. The input/UI layer edits a staged
//! [`RenderOptions`]; the frame loop copies it once at frame start, so a
//! frame's three passes always see one consistent snapshot. Out-of-range
//! values are clamped, never rejected.

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::compositing::ColorMode;

/// Valid range for the ray march step length.
pub const STEP_LENGTH_RANGE: (f32, f32) = (0.0001, 1.0);

/// Valid range for the density multiplier.
pub const DENSITY_RANGE: (f32, f32) = (0.1, 1000.0);

/// Valid range for the camera zoom scalar.
pub const ZOOM_RANGE: (f32, f32) = (0.0, 4.0);

/// Camera lens mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LensMode {
    /// Parallel projection; zoom scales the view extent.
    Orthographic,
    /// Perspective projection; zoom narrows the field of view.
    #[default]
    Perspective,
}

impl LensMode {
    /// The other lens.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            LensMode::Orthographic => LensMode::Perspective,
            LensMode::Perspective => LensMode::Orthographic,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            LensMode::Orthographic => "Orthographic",
            LensMode::Perspective => "Perspective",
        }
    }
}

/// Settings consumed by the ray-cast pass. Read-only during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaySettings {
    /// March increment along the ray, in volume-local units.
    pub step_length: f32,
    /// Density multiplier applied during compositing.
    pub density: f32,
    /// How samples combine into a pixel.
    pub color_mode: ColorMode,
    /// Apply output gamma (1/2.2) to the composited color.
    pub gamma_correction: bool,
    /// Invert the final RGB.
    pub color_inversion: bool,
}

impl RaySettings {
    /// Sets the step length, clamped to [`STEP_LENGTH_RANGE`].
    pub fn set_step_length(&mut self, value: f32) {
        self.step_length = value.clamp(STEP_LENGTH_RANGE.0, STEP_LENGTH_RANGE.1);
    }

    /// Sets the density multiplier, clamped to [`DENSITY_RANGE`].
    pub fn set_density(&mut self, value: f32) {
        self.density = value.clamp(DENSITY_RANGE.0, DENSITY_RANGE.1);
    }
}

impl Default for RaySettings {
    fn default() -> Self {
        Self {
            step_length: 0.005,
            density: 20.0,
            color_mode: ColorMode::default(),
            gamma_correction: true,
            color_inversion: false,
        }
    }
}

/// Lens state consumed by the camera each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LensSettings {
    /// Projection kind.
    pub lens: LensMode,
    /// Zoom scalar, kept in [`ZOOM_RANGE`] by every mutator.
    zoom: f32,
}

impl LensSettings {
    /// Current zoom.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Sets the zoom, clamped to [`ZOOM_RANGE`].
    pub fn set_zoom(&mut self, value: f32) {
        self.zoom = value.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
    }

    /// Applies a scroll-wheel delta (one notch changes zoom by 1/8).
    pub fn scroll(&mut self, delta: f32) {
        self.set_zoom(self.zoom + delta / 8.0);
    }
}

impl Default for LensSettings {
    fn default() -> Self {
        Self {
            lens: LensMode::default(),
            zoom: 0.25,
        }
    }
}

/// The staged, user-editable settings snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Ray-cast pass settings.
    pub ray: RaySettings,
    /// Camera lens state.
    pub lens: LensSettings,
    /// Color behind pixels the volume does not cover.
    pub background: Vec4,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            ray: RaySettings::default(),
            lens: LensSettings::default(),
            background: Vec4::new(0.1, 0.1, 0.1, 0.0),
        }
    }
}
