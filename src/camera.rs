//! Perspective camera for scene mode.

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Fixed perspective camera looking down -Z at the scene origin.
///
/// The scene itself turns slowly (`spin` radians per tick about X and Y);
/// the camera does not move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Scene rotation per tick about X and Y, radians.
    pub spin: Vec2,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 100.0),
            fov_y: 75.0,
            near: 0.1,
            far: 1000.0,
            spin: Vec2::new(0.0002, 0.0003),
        }
    }

    /// View matrix, looking along -Z.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Scene rotation after `ticks` ticks of spin.
    pub fn scene_rotation(&self, ticks: u64) -> Mat4 {
        let t = ticks as f32;
        Mat4::from_quat(Quat::from_euler(glam::EulerRot::XYZ, self.spin.x * t, self.spin.y * t, 0.0))
    }

    /// Ray from the camera through a window pixel.
    ///
    /// Returns `(origin, unit direction)`. `pixel` is measured from the top
    /// left corner; `viewport` is the window size in pixels.
    pub fn screen_ray(&self, pixel: Vec2, viewport: Vec2) -> (Vec3, Vec3) {
        let size = viewport.max(Vec2::ONE);
        let ndc = Vec2::new(pixel.x / size.x * 2.0 - 1.0, -(pixel.y / size.y) * 2.0 + 1.0);

        let inverse = self.view_proj(size.x / size.y).inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        (self.position, (far - near).try_normalize().unwrap_or(Vec3::NEG_Z))
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
    fn test_center_ray_points_forward() {
        let camera = Camera::new();
        let (origin, dir) = camera.screen_ray(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));
        assert_eq!(origin, Vec3::new(0.0, 0.0, 100.0));
        assert!((dir - Vec3::NEG_Z).length() < 1e-4, "dir {dir:?}");
    }

    #[test]
    fn test_corner_rays_diverge() {
        let camera = Camera::new();
        let viewport = Vec2::new(800.0, 600.0);
        let (_, top_left) = camera.screen_ray(Vec2::ZERO, viewport);
        let (_, bottom_right) = camera.screen_ray(viewport, viewport);
        assert!(top_left.x < 0.0 && top_left.y > 0.0);
        assert!(bottom_right.x > 0.0 && bottom_right.y < 0.0);
        assert!((top_left.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_vertical_fov_edge() {
        // Top-center pixel sits on the edge of the 75 degree frustum.
        let camera = Camera::new();
        let (_, dir) = camera.screen_ray(Vec2::new(400.0, 0.0), Vec2::new(800.0, 600.0));
        let angle = dir.angle_between(Vec3::NEG_Z).to_degrees();
        assert!((angle - 37.5).abs() < 0.05, "angle {angle}");
    }

    #[test]
    fn test_scene_rotation_starts_at_identity() {
        let camera = Camera::new();
        assert!(camera.scene_rotation(0).abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }
}
