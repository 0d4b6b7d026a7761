//! Trigger sources: where a click puts a firework.
//!
//! A click arrives as a pixel position. A [`Projector`] maps it into the
//! simulation's space: canvas mode uses the pixel directly, scene mode casts
//! a camera ray and picks a point along it.

use crate::camera::Camera;
use crate::space::Space;
use glam::{Vec2, Vec3};
use rand::{Rng, RngCore};

/// A pointer event that should spawn a firework.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    /// Pixel position from the top-left of the window.
    pub pixel: Vec2,
    /// Window size in pixels at the time of the click.
    pub viewport: Vec2,
}

impl Trigger {
    pub fn new(pixel: Vec2, viewport: Vec2) -> Self {
        Self { pixel, viewport }
    }
}

/// Maps a trigger into simulation space.
pub trait Projector<V: Space> {
    fn project(&self, trigger: &Trigger, rng: &mut dyn RngCore) -> V;
}

/// Canvas mode: simulation space is window pixels.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenProjector;

impl Projector<Vec2> for ScreenProjector {
    fn project(&self, trigger: &Trigger, _rng: &mut dyn RngCore) -> Vec2 {
        trigger.pixel
    }
}

/// Scene mode: a point on the camera ray with a randomized depth.
#[derive(Debug, Clone)]
pub struct RayProjector {
    pub camera: Camera,
    /// How far along the ray the burst is placed.
    pub distance: f32,
    /// The burst's z is replaced by a uniform value in `[-depth_jitter, depth_jitter]`.
    pub depth_jitter: f32,
}

impl RayProjector {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            distance: 50.0,
            depth_jitter: 25.0,
        }
    }
}

impl Projector<Vec3> for RayProjector {
    fn project(&self, trigger: &Trigger, rng: &mut dyn RngCore) -> Vec3 {
        let (origin, dir) = self.camera.screen_ray(trigger.pixel, trigger.viewport);
        let mut point = origin + dir * self.distance;
        point.z = if self.depth_jitter > 0.0 {
            rng.gen_range(-self.depth_jitter..=self.depth_jitter)
        } else {
            0.0
        };
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_screen_projector_is_identity() {
        let mut rng = SmallRng::seed_from_u64(1);
        let t = Trigger::new(Vec2::new(12.0, 34.0), Vec2::new(800.0, 600.0));
        assert_eq!(ScreenProjector.project(&t, &mut rng), Vec2::new(12.0, 34.0));
    }

    #[test]
    fn test_ray_projector_depth_jitter() {
        let mut rng = SmallRng::seed_from_u64(2);
        let projector = RayProjector::new(Camera::new());
        let t = Trigger::new(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));
        for _ in 0..200 {
            let p = projector.project(&t, &mut rng);
            assert!(p.x.abs() < 1e-3 && p.y.abs() < 1e-3);
            assert!((-25.0..=25.0).contains(&p.z));
        }
    }

    #[test]
    fn test_ray_projector_follows_click() {
        let mut rng = SmallRng::seed_from_u64(3);
        let projector = RayProjector {
            depth_jitter: 0.0,
            ..RayProjector::new(Camera::new())
        };
        let viewport = Vec2::new(800.0, 600.0);
        let right = projector.project(&Trigger::new(Vec2::new(700.0, 300.0), viewport), &mut rng);
        let up = projector.project(&Trigger::new(Vec2::new(400.0, 100.0), viewport), &mut rng);
        assert!(right.x > 0.0);
        assert!(up.y > 0.0);
        assert_eq!(right.z, 0.0);
    }
}
