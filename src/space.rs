//! Dimensionality of the simulation.
//!
//! The engine is written once against [`Space`] and instantiated with either
//! [`Vec2`] (canvas mode, pixel coordinates, y down) or [`Vec3`] (scene mode,
//! world units, y up).

use glam::{Vec2, Vec3};
use rand::Rng;
use std::f32::consts::TAU;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

/// Vector type a particle lives in.
pub trait Space:
    Copy
    + Debug
    + PartialEq
    + Default
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + MulAssign<f32>
    + Send
    + Sync
    + 'static
{
    /// Number of components.
    const DIMENSIONS: usize;

    /// The zero vector.
    const ZERO: Self;

    /// Uniformly distributed unit vector.
    ///
    /// In 2D the angle is uniform in `[0, 2π)`. In 3D the azimuth is uniform in
    /// `[0, 2π)` and the cosine of the polar angle is uniform in `[-1, 1]`,
    /// which covers the sphere evenly instead of clustering at the poles.
    fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Build from the first `DIMENSIONS` components of `xyz`.
    fn from_xyz(xyz: [f32; 3]) -> Self;

    /// Widen to 3D for renderers. 2D vectors get `z = 0`.
    fn to_vec3(self) -> Vec3;

    /// Euclidean length.
    fn length(self) -> f32;
}

impl Space for Vec2 {
    const DIMENSIONS: usize = 2;
    const ZERO: Self = Vec2::ZERO;

    fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..TAU);
        Vec2::new(angle.cos(), angle.sin())
    }

    fn from_xyz(xyz: [f32; 3]) -> Self {
        Vec2::new(xyz[0], xyz[1])
    }

    fn to_vec3(self) -> Vec3 {
        self.extend(0.0)
    }

    fn length(self) -> f32 {
        Vec2::length(self)
    }
}

impl Space for Vec3 {
    const DIMENSIONS: usize = 3;
    const ZERO: Self = Vec3::ZERO;

    fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let theta = rng.gen_range(0.0..TAU);
        let cos_phi: f32 = rng.gen_range(-1.0..=1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();

        Vec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
    }

    fn from_xyz(xyz: [f32; 3]) -> Self {
        Vec3::from_array(xyz)
    }

    fn to_vec3(self) -> Vec3 {
        self
    }

    fn length(self) -> f32 {
        Vec3::length(self)
    }
}
