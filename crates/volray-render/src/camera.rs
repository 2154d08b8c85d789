//! Camera and view management.
//!
//! The camera never moves: the eye sits at `(0, 0, 2)` looking at the
//! origin, and all interaction rotates the bounding geometry instead. Only
//! the lens changes, driven by [`LensSettings`].

use glam::{Mat4, Vec3};

use volray_core::settings::{LensMode, LensSettings};

/// Near clipping plane, both lenses.
pub const Z_NEAR: f32 = 0.1;

/// Far clipping plane, both lenses.
pub const Z_FAR: f32 = 100.0;

/// A fixed-eye camera with a selectable lens.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Projection kind.
    pub lens: LensMode,
    /// Zoom scalar; [`LensSettings`] guarantees it lies in `[0, 4]`.
    pub zoom: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Camera {
    /// Creates a camera with default lens state.
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        let lens = LensSettings::default();
        Self {
            lens: lens.lens,
            zoom: lens.zoom(),
            aspect,
        }
    }

    /// Adopts the lens settings snapshot for this frame.
    pub fn apply(&mut self, settings: &LensSettings) {
        self.lens = settings.lens;
        self.zoom = settings.zoom();
    }

    /// Sets the aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Vertical field of view in radians: `2 / 2^zoom`. Halves for every
    /// unit of zoom, so larger zoom narrows the view.
    #[must_use]
    pub fn fovy(&self) -> f32 {
        2.0 / 2.0f32.powf(self.zoom)
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y)
    }

    /// Returns the projection matrix for the current lens.
    ///
    /// Both lenses derive their extent from `2 / 2^zoom` — as a field of
    /// view in radians for the perspective lens, as an orthographic
    /// half-height in world units — which makes zooming feel different
    /// between them. Intentional; the formulas are part of the contract.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.lens {
            LensMode::Perspective => Mat4::perspective_rh(self.fovy(), self.aspect, Z_NEAR, Z_FAR),
            LensMode::Orthographic => {
                let half_height = 2.0 / 2.0f32.powf(self.zoom);
                let half_width = half_height * self.aspect;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    Z_NEAR,
                    Z_FAR,
                )
            }
        }
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
