//! Virtual-sphere trackball interaction.

use glam::{Mat4, Quat, Vec2, Vec3};

/// Converts mouse drags into an accumulated rotation.
///
/// Screen points are projected onto a virtual hemisphere of `radius`
/// around `center`; the rotation between the anchor and the current
/// projection is composed onto the accumulated rotation. Two states:
/// idle and tracking.
#[derive(Debug, Clone)]
pub struct Trackball {
    rotation: Quat,
    tracking: bool,
    anchor: Vec3,
    radius: f32,
    center: Vec2,
}

impl Trackball {
    /// A trackball for a viewport of the given size, hemisphere centered
    /// in the viewport with radius half the smaller extent.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            rotation: Quat::IDENTITY,
            tracking: false,
            anchor: Vec3::Z,
            radius: (width.min(height) / 2.0).max(1.0),
            center: Vec2::new(width, height) / 2.0,
        }
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn tracking(&self) -> bool {
        self.tracking
    }

    /// The accumulated rotation as a matrix, for the geometry pass.
    #[must_use]
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.normalize())
    }

    /// The accumulated rotation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Begins a drag at a screen point.
    pub fn start_tracking(&mut self, point: Vec2) {
        self.tracking = true;
        self.anchor = self.project_to_sphere(point);
    }

    /// Ends the drag. The accumulated rotation persists.
    pub fn stop_tracking(&mut self) {
        self.tracking = false;
    }

    /// Advances the drag to a new screen point, composing the incremental
    /// rotation between the previous and new hemisphere projections onto
    /// the accumulated rotation. No-op when idle or when the projections
    /// coincide.
    pub fn move_to(&mut self, point: Vec2) {
        if !self.tracking {
            return;
        }
        let current = self.project_to_sphere(point);
        let axis = self.anchor.cross(current);
        let axis_len = axis.length();
        if axis_len < 1e-6 {
            return;
        }
        let angle = self.anchor.dot(current).clamp(-1.0, 1.0).acos();
        if angle < 1e-6 {
            return;
        }
        let increment = Quat::from_axis_angle(axis / axis_len, angle);
        self.rotation = (increment * self.rotation).normalize();
        self.anchor = current;
    }

    /// Re-centers the hemisphere, e.g. at the press position.
    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    /// Adapts to a new viewport. Radius and center follow the viewport;
    /// the accumulated rotation is untouched.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.radius = (width.min(height) / 2.0).max(1.0);
        self.center = Vec2::new(width, height) / 2.0;
    }

    /// Maps a screen point onto the unit hemisphere facing the viewer.
    /// Screen y grows downward, sphere y upward. Points beyond the radius
    /// land on the rim.
    fn project_to_sphere(&self, point: Vec2) -> Vec3 {
        let x = (point.x - self.center.x) / self.radius;
        let y = (self.center.y - point.y) / self.radius;
        let d2 = x * x + y * y;
        if d2 >= 1.0 {
            let d = d2.sqrt();
            Vec3::new(x / d, y / d, 0.0)
        } else {
            Vec3::new(x, y, (1.0 - d2).sqrt())
        }
    }
}

impl Default for Trackball {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_drag_to_same_point_is_identity() {
        let mut tb = Trackball::new(800.0, 600.0);
        tb.start_tracking(Vec2::new(400.0, 300.0));
        tb.move_to(Vec2::new(500.0, 300.0));
        let before = tb.rotation();
        tb.move_to(Vec2::new(500.0, 300.0));
        assert_eq!(tb.rotation(), before);
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let mut tb = Trackball::new(800.0, 600.0);
        tb.move_to(Vec2::new(100.0, 100.0));
        assert_eq!(tb.rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_horizontal_drag_rotates_about_y() {
        let mut tb = Trackball::new(800.0, 600.0);
        tb.start_tracking(Vec2::new(400.0, 300.0));
        tb.move_to(Vec2::new(450.0, 300.0));
        let (axis, angle) = tb.rotation().to_axis_angle();
        assert!(angle > 0.0);
        assert!(axis.x.abs() < 1e-5);
        assert!(axis.z.abs() < 1e-5);
        // Dragging right must spin the geometry as a real trackball would:
        // anchor (0,0,1) toward (s,0,c) crosses to an axis along -y... the
        // cross of +z with +x-ish is +y.
        assert!(axis.y > 0.0);
    }

    #[test]
    fn test_rotation_persists_after_release() {
        let mut tb = Trackball::new(800.0, 600.0);
        tb.start_tracking(Vec2::new(400.0, 300.0));
        tb.move_to(Vec2::new(460.0, 340.0));
        let held = tb.rotation();
        tb.stop_tracking();
        assert_eq!(tb.rotation(), held);
        assert!(!tb.tracking());
    }

    #[test]
    fn test_resize_keeps_rotation() {
        let mut tb = Trackball::new(1280.0, 720.0);
        tb.start_tracking(Vec2::new(640.0, 360.0));
        tb.move_to(Vec2::new(700.0, 400.0));
        tb.stop_tracking();
        let held = tb.rotation();
        tb.set_viewport(640.0, 480.0);
        assert_eq!(tb.rotation(), held);
    }

    #[test]
    fn test_points_beyond_radius_project_to_rim() {
        let tb = Trackball::new(200.0, 200.0);
        let p = tb.project_to_sphere(Vec2::new(1000.0, 100.0));
        assert!((p.length() - 1.0).abs() < 1e-6);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn test_increments_compose() {
        // Two half drags land where one full drag does.
        let mut one = Trackball::new(800.0, 600.0);
        one.start_tracking(Vec2::new(400.0, 300.0));
        one.move_to(Vec2::new(440.0, 300.0));
        one.move_to(Vec2::new(480.0, 300.0));

        let mut two = Trackball::new(800.0, 600.0);
        two.start_tracking(Vec2::new(400.0, 300.0));
        two.move_to(Vec2::new(480.0, 300.0));

        assert!(one.rotation().angle_between(two.rotation()) < 1e-4);
    }

    proptest! {
        /// Accumulated rotations stay unit quaternions, so the geometry
        /// pass always receives a pure rotation.
        #[test]
        fn prop_rotation_stays_normalized(
            drags in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0), 1..40)
        ) {
            let mut tb = Trackball::new(800.0, 600.0);
            tb.start_tracking(Vec2::new(400.0, 300.0));
            for (x, y) in drags {
                tb.move_to(Vec2::new(x, y));
            }
            prop_assert!((tb.rotation().length() - 1.0).abs() < 1e-4);
        }
    }
}
