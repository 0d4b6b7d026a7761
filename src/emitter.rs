//! Emission policy: turning one trigger into a burst of particles.
//!
//! An [`Emitter`] decides how many particles a trigger produces and what each
//! one starts with. Everything random about a particle is drawn here:
//!
//! | Quantity | Distribution |
//! |----------|--------------|
//! | count | uniform integer in [`Emitter::count`] (inclusive) |
//! | direction | uniform on the circle (2D) or sphere (3D) |
//! | speed | uniform in [`Emitter::speed`] |
//! | color | uniform over the active colors |
//! | lifespan | uniform in [`Emitter::max_life`], in ticks |
//!
//! # Example
//!
//! ```ignore
//! let emitter = Emitter::canvas().with_count(60..=60);
//! let batch: Vec<Particle<Vec2>> = emitter.emit(click, &palette.active_colors(), &mut rng);
//! registry.insert(batch);
//! ```

use crate::color::Color;
use crate::error::ConfigError;
use crate::particle::{Particle, DEFAULT_MIN_SCALE};
use crate::space::Space;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};

/// Emission parameters. All ranges are sampled once per particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Emitter {
    /// Particles per trigger, inclusive.
    pub count: RangeInclusive<u32>,
    /// Initial speed, units per tick.
    pub speed: Range<f32>,
    /// Lifespan in ticks.
    pub max_life: Range<f32>,
    /// Velocity multiplier per tick, in `(0, 1]`.
    pub damping: f32,
    /// Constant per-tick acceleration. 2D ignores `z`.
    pub acceleration: [f32; 3],
    /// Smallest drawn scale.
    pub min_scale: f32,
}

impl Emitter {
    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Flat canvas burst: 10-100 particles in pixel space, no gravity.
    pub fn canvas() -> Self {
        Self {
            count: 10..=100,
            speed: 2.0..5.0,
            max_life: 40.0..100.0,
            damping: 0.98,
            acceleration: [0.0; 3],
            min_scale: DEFAULT_MIN_SCALE,
        }
    }

    /// 3D scene burst: 150 particles with gravity, living 0.8-2.3 s at 60 ticks/s.
    pub fn scene() -> Self {
        Self {
            count: 150..=150,
            speed: 2.0..5.0,
            max_life: 48.0..138.0,
            damping: 0.98,
            acceleration: [0.0, -0.08, 0.0],
            min_scale: DEFAULT_MIN_SCALE,
        }
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    pub fn with_count(mut self, count: RangeInclusive<u32>) -> Self {
        self.count = count;
        self
    }

    pub fn with_speed(mut self, speed: Range<f32>) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_max_life(mut self, ticks: Range<f32>) -> Self {
        self.max_life = ticks;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_acceleration(mut self, acceleration: [f32; 3]) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_min_scale(mut self, min_scale: f32) -> Self {
        self.min_scale = min_scale;
        self
    }

    /// Reject parameters that would produce nonsense particles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count.start() > self.count.end() {
            return Err(invalid("emission.count", "start is greater than end"));
        }
        if !(self.speed.start.is_finite() && self.speed.end.is_finite()) || self.speed.start < 0.0 {
            return Err(invalid("emission.speed", "must be finite and non-negative"));
        }
        if self.speed.start > self.speed.end {
            return Err(invalid("emission.speed", "start is greater than end"));
        }
        if !(self.max_life.start > 0.0 && self.max_life.end.is_finite()) {
            return Err(invalid("emission.max_life", "must be positive and finite"));
        }
        if self.max_life.start > self.max_life.end {
            return Err(invalid("emission.max_life", "start is greater than end"));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(invalid("emission.damping", "must be in (0, 1]"));
        }
        if !self.acceleration.iter().all(|a| a.is_finite()) {
            return Err(invalid("emission.acceleration", "must be finite"));
        }
        if !(0.0..=1.0).contains(&self.min_scale) {
            return Err(invalid("emission.min_scale", "must be in [0, 1]"));
        }
        Ok(())
    }

    // =========================================================================
    // EMISSION
    // =========================================================================

    /// Draw a particle count from [`Emitter::count`].
    pub fn sample_count<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let (lo, hi) = (*self.count.start(), *self.count.end());
        if lo >= hi {
            lo
        } else {
            rng.gen_range(lo..=hi)
        }
    }

    /// Emit a burst at `origin` with a randomly drawn count.
    pub fn emit<V: Space, R: Rng + ?Sized>(&self, origin: V, colors: &[Color], rng: &mut R) -> Vec<Particle<V>> {
        let count = self.sample_count(rng);
        self.emit_count(origin, colors, count, rng)
    }

    /// Emit exactly `count` particles at `origin`.
    ///
    /// Colors are drawn uniformly from `colors`; an empty slice means every
    /// particle gets [`Color::DEFAULT`]. The returned particles are not yet
    /// owned by any registry.
    pub fn emit_count<V: Space, R: Rng + ?Sized>(
        &self,
        origin: V,
        colors: &[Color],
        count: u32,
        rng: &mut R,
    ) -> Vec<Particle<V>> {
        let fallback = [Color::DEFAULT];
        let colors = if colors.is_empty() { &fallback[..] } else { colors };
        let acceleration = V::from_xyz(self.acceleration);

        let batch: Vec<Particle<V>> = (0..count)
            .map(|_| {
                let direction = V::random_direction(rng);
                let speed = sample_range(rng, &self.speed);
                let color = colors[rng.gen_range(0..colors.len())];
                let max_life = sample_range(rng, &self.max_life);

                Particle::new(origin, direction * speed, max_life, color)
                    .with_acceleration(acceleration)
                    .with_damping(self.damping)
                    .with_min_scale(self.min_scale)
            })
            .collect();

        log::debug!("emitted {} particles at {:?}", batch.len(), origin);
        batch
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::canvas()
    }
}

/// Emission parameters as written in a config file.
///
/// Every field is optional. [`EmitterOverrides::apply`] fills the missing ones
/// from a preset, so a partial block keeps the chosen mode's defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<RangeInclusive<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Range<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_life: Option<Range<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damping: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<f32>,
}

impl EmitterOverrides {
    /// `base` with every present field replaced.
    pub fn apply(&self, base: Emitter) -> Emitter {
        Emitter {
            count: self.count.clone().unwrap_or(base.count),
            speed: self.speed.clone().unwrap_or(base.speed),
            max_life: self.max_life.clone().unwrap_or(base.max_life),
            damping: self.damping.unwrap_or(base.damping),
            acceleration: self.acceleration.unwrap_or(base.acceleration),
            min_scale: self.min_scale.unwrap_or(base.min_scale),
        }
    }
}

impl From<Emitter> for EmitterOverrides {
    fn from(emitter: Emitter) -> Self {
        Self {
            count: Some(emitter.count),
            speed: Some(emitter.speed),
            max_life: Some(emitter.max_life),
            damping: Some(emitter.damping),
            acceleration: Some(emitter.acceleration),
            min_scale: Some(emitter.min_scale),
        }
    }
}

/// Uniform sample from a half-open range; a degenerate range yields its start.
pub(crate) fn sample_range<R: Rng + ?Sized>(rng: &mut R, range: &Range<f32>) -> f32 {
    if range.start >= range.end {
        range.start
    } else {
        rng.gen_range(range.clone())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_presets_validate() {
        Emitter::canvas().validate().unwrap();
        Emitter::scene().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Emitter::canvas().with_damping(0.0).validate().is_err());
        assert!(Emitter::canvas().with_damping(1.5).validate().is_err());
        assert!(Emitter::canvas().with_speed(5.0..2.0).validate().is_err());
        assert!(Emitter::canvas().with_max_life(0.0..10.0).validate().is_err());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = Emitter::canvas().with_count(10..=5);
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_count_within_range() {
        let emitter = Emitter::canvas();
        let mut rng = rng();
        for _ in 0..500 {
            let n = emitter.sample_count(&mut rng);
            assert!((10..=100).contains(&n));
        }
        assert_eq!(Emitter::scene().sample_count(&mut rng), 150);
    }

    #[test]
    fn test_emit_count_exact() {
        let mut rng = rng();
        let batch: Vec<Particle<Vec2>> = Emitter::canvas().emit_count(Vec2::ZERO, &[Color::RED], 37, &mut rng);
        assert_eq!(batch.len(), 37);
    }

    #[test]
    fn test_emit_zero_is_empty() {
        let mut rng = rng();
        let batch: Vec<Particle<Vec3>> = Emitter::scene().emit_count(Vec3::ZERO, &[Color::RED], 0, &mut rng);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_initial_state() {
        let mut rng = rng();
        let origin = Vec2::new(320.0, 240.0);
        let colors = [Color::RED, Color::rgb(0, 0, 0xFF)];
        for p in Emitter::canvas().emit_count(origin, &colors, 200, &mut rng) {
            assert_eq!(p.position(), origin);
            let speed = Space::length(p.velocity());
            assert!((2.0 - 1e-4..5.0 + 1e-4).contains(&speed), "speed {speed}");
            assert!((40.0..100.0).contains(&p.max_life()));
            assert!(colors.contains(&p.color()));
            assert_eq!(p.age(), 0);
            assert_eq!(p.life(), 1.0);
        }
    }

    #[test]
    fn test_scene_gravity_applied() {
        let mut rng = rng();
        let batch: Vec<Particle<Vec3>> = Emitter::scene().emit_count(Vec3::ZERO, &[Color::RED], 5, &mut rng);
        for p in &batch {
            assert_eq!(p.acceleration(), Vec3::new(0.0, -0.08, 0.0));
            assert_eq!(p.damping(), 0.98);
        }
    }

    #[test]
    fn test_empty_colors_use_default() {
        let mut rng = rng();
        let batch: Vec<Particle<Vec2>> = Emitter::canvas().emit(Vec2::ZERO, &[], &mut rng);
        assert!(!batch.is_empty());
        assert!(batch.iter().all(|p| p.color() == Color::WHITE));
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut rng = rng();
        let emitter = Emitter::canvas()
            .with_speed(3.0..3.0)
            .with_max_life(10.0..10.0)
            .with_count(4..=4);
        let batch: Vec<Particle<Vec2>> = emitter.emit(Vec2::ZERO, &[Color::RED], &mut rng);
        assert_eq!(batch.len(), 4);
        for p in batch {
            assert!((Space::length(p.velocity()) - 3.0).abs() < 1e-4);
            assert_eq!(p.max_life(), 10.0);
        }
    }

    #[test]
    fn test_overrides_fill_from_base() {
        let overrides = EmitterOverrides {
            count: Some(50..=80),
            ..EmitterOverrides::default()
        };
        let emitter = overrides.apply(Emitter::scene());
        assert_eq!(emitter.count, 50..=80);
        assert_eq!(emitter.acceleration, Emitter::scene().acceleration);
        assert_eq!(emitter.max_life, Emitter::scene().max_life);

        assert_eq!(EmitterOverrides::default().apply(Emitter::canvas()), Emitter::canvas());
        assert_eq!(EmitterOverrides::from(Emitter::scene()).apply(Emitter::canvas()), Emitter::scene());
    }

    #[test]
    fn test_same_seed_same_batch() {
        let a: Vec<Particle<Vec3>> = Emitter::scene().emit(Vec3::ONE, &[Color::RED, Color::WHITE], &mut rng());
        let b: Vec<Particle<Vec3>> = Emitter::scene().emit(Vec3::ONE, &[Color::RED, Color::WHITE], &mut rng());
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(pa.velocity(), pb.velocity());
            assert_eq!(pa.color(), pb.color());
            assert_eq!(pa.max_life(), pb.max_life());
        }
    }
}
