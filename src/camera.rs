use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Vertical field of view used when none is configured.
pub const DEFAULT_FOV_DEGREES: f32 = 45.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

/// Frame-scoped view of the scene: view and projection transforms plus the
/// world-space eye position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    position: Vec3,
    direction: Vec3,
    up: Vec3,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Camera at +Z looking down -Z with a square 45° perspective.
    pub fn new() -> Self {
        Self::look_to(Vec3::Z, Vec3::NEG_Z, Vec3::Y).with_perspective(
            DEFAULT_FOV_DEGREES,
            1.0,
            DEFAULT_NEAR,
            DEFAULT_FAR,
        )
    }

    /// Builds the view from an eye position and forward vector.
    ///
    /// When `direction` is parallel to `up` another up axis is chosen, so a
    /// camera looking straight down still has a finite view matrix. The
    /// projection is left as identity.
    pub fn look_to(position: Vec3, direction: Vec3, up: Vec3) -> Self {
        let direction = direction.normalize_or_zero();
        let up = if direction.cross(up).length_squared() > 1e-12 {
            up
        } else if direction.y.abs() < 0.9 {
            Vec3::Y
        } else {
            Vec3::NEG_Z
        };
        Self {
            position,
            direction,
            up,
            view: Mat4::look_to_rh(position, direction, up),
            projection: Mat4::IDENTITY,
        }
    }

    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self::look_to(position, target - position, up)
    }

    /// Replaces the projection with an OpenGL-style perspective.
    pub fn with_perspective(mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        self.projection =
            Mat4::perspective_rh_gl(fov_degrees.to_radians(), aspect.max(0.01), near, far);
        self
    }

    /// Updates the projection for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        let aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        *self = self.with_perspective(DEFAULT_FOV_DEGREES, aspect, DEFAULT_NEAR, DEFAULT_FAR);
    }

    /// Circles the origin at `radius` in the XZ plane, `seconds` radians in.
    pub fn orbit(&mut self, seconds: f32, radius: f32) {
        let position = Vec3::new(seconds.sin() * radius, 0.0, seconds.cos() * radius);
        let projection = self.projection;
        *self = Self::look_at(position, Vec3::ZERO, self.up);
        self.projection = projection;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit forward vector.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert_eq!(camera.position(), Vec3::Z);
        assert_eq!(camera.direction(), Vec3::NEG_Z);
        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin_in_view - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn default_camera_uses_default_perspective() {
        let expected = Mat4::perspective_rh_gl(
            DEFAULT_FOV_DEGREES.to_radians(),
            1.0,
            DEFAULT_NEAR,
            DEFAULT_FAR,
        );
        assert_eq!(*Camera::default().projection_matrix(), expected);
    }

    #[test]
    fn straight_down_view_stays_finite() {
        let camera = Camera::look_at(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -3.0, 0.0), Vec3::Y);
        assert_eq!(camera.direction(), Vec3::NEG_Y);
        assert!(camera.view_matrix().is_finite());
        let below = camera.view_matrix().transform_point3(Vec3::new(0.0, -3.0, 0.0));
        assert!((below - Vec3::new(0.0, 0.0, -8.0)).length() < 1e-5);

        let up = Camera::look_to(Vec3::ZERO, Vec3::Y, Vec3::Y);
        assert!(up.view_matrix().is_finite());
    }

    #[test]
    fn look_at_points_at_target() {
        let camera = Camera::look_at(Vec3::new(0.0, 2.0, 6.0), Vec3::ZERO, Vec3::Y);
        let expected = (Vec3::ZERO - Vec3::new(0.0, 2.0, 6.0)).normalize();
        assert!((camera.direction() - expected).length() < 1e-6);
    }

    #[test]
    fn orbit_keeps_radius_and_projection() {
        let mut camera = Camera::default();
        camera.resize(800, 600);
        let projection = *camera.projection_matrix();
        camera.orbit(1.3, 10.0);
        assert!((camera.position().length() - 10.0).abs() < 1e-4);
        assert_eq!(camera.position().y, 0.0);
        assert_eq!(*camera.projection_matrix(), projection);
        assert!(camera.direction().dot(-camera.position().normalize()) > 0.999);
    }

    #[test]
    fn resize_with_zero_height_falls_back_to_square() {
        let mut camera = Camera::default();
        camera.resize(640, 0);
        let square = Camera::default().with_perspective(
            DEFAULT_FOV_DEGREES,
            1.0,
            DEFAULT_NEAR,
            DEFAULT_FAR,
        );
        assert_eq!(camera.projection_matrix(), square.projection_matrix());
    }
}
