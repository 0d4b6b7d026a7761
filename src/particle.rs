//! A single firework particle.
//!
//! Particles are plain values owned by the [`Registry`](crate::Registry).
//! Everything random about a particle is decided when it is built. `update`
//! is a pure function of the current state, so a batch replays identically
//! from the same seed.

use crate::color::Color;
use crate::render::RenderHandle;
use crate::space::Space;

/// Default lower bound on the drawn scale, so particles shrink but never
/// collapse to a zero-size draw before they are removed.
pub const DEFAULT_MIN_SCALE: f32 = 0.3;

/// What a renderer needs to draw a particle this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState<V> {
    pub position: V,
    pub color: Color,
    /// Equal to `life`, in `[0, 1]`.
    pub opacity: f32,
    /// `max(min_scale, life)`.
    pub scale: f32,
}

/// One physical body with a fixed lifespan measured in ticks.
#[derive(Debug)]
pub struct Particle<V: Space> {
    position: V,
    velocity: V,
    acceleration: V,
    damping: f32,
    age: u32,
    max_life: f32,
    life: f32,
    min_scale: f32,
    color: Color,
    render_handle: Option<RenderHandle>,
}

impl<V: Space> Particle<V> {
    /// Create a particle at `position` moving with `velocity`.
    ///
    /// `max_life` is in ticks and is clamped to be positive. Acceleration
    /// defaults to zero, damping to 1 (no drag).
    pub fn new(position: V, velocity: V, max_life: f32, color: Color) -> Self {
        Self {
            position,
            velocity,
            acceleration: V::ZERO,
            damping: 1.0,
            age: 0,
            max_life: max_life.max(f32::MIN_POSITIVE),
            life: 1.0,
            min_scale: DEFAULT_MIN_SCALE,
            color,
            render_handle: None,
        }
    }

    /// Constant acceleration added to the velocity every tick.
    pub fn with_acceleration(mut self, acceleration: V) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Velocity multiplier per tick, clamped to `(0, 1]`.
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(f32::MIN_POSITIVE, 1.0);
        self
    }

    pub fn with_min_scale(mut self, min_scale: f32) -> Self {
        self.min_scale = min_scale.clamp(0.0, 1.0);
        self
    }

    /// Hand the particle a backend resource. It is released exactly once, by
    /// whoever removes the particle from the registry.
    pub fn attach(&mut self, handle: RenderHandle) {
        debug_assert!(self.render_handle.is_none(), "particle already owns a render handle");
        self.render_handle = Some(handle);
    }

    /// Take the render handle out, leaving `None`.
    pub fn take_handle(&mut self) -> Option<RenderHandle> {
        self.render_handle.take()
    }

    pub fn handle(&self) -> Option<&RenderHandle> {
        self.render_handle.as_ref()
    }

    /// Advance one tick. Returns whether the particle is still alive.
    ///
    /// Order: acceleration into velocity, damping, velocity into position,
    /// then aging. Returns `false` on the tick `life` first reaches zero.
    /// Once dead this is a no-op that keeps returning `false`.
    pub fn update(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }

        if self.acceleration != V::ZERO {
            self.velocity += self.acceleration;
        }
        self.velocity *= self.damping;
        self.position += self.velocity;

        self.age += 1;
        self.life = (1.0 - self.age as f32 / self.max_life).max(0.0);

        self.is_alive()
    }

    /// Current draw parameters.
    pub fn visual_state(&self) -> VisualState<V> {
        VisualState {
            position: self.position,
            color: self.color,
            opacity: self.life,
            scale: self.min_scale.max(self.life),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    #[inline]
    pub fn position(&self) -> V {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> V {
        self.velocity
    }

    #[inline]
    pub fn acceleration(&self) -> V {
        self.acceleration
    }

    #[inline]
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Ticks since creation.
    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[inline]
    pub fn max_life(&self) -> f32 {
        self.max_life
    }

    /// Normalized remaining life in `[0, 1]`.
    #[inline]
    pub fn life(&self) -> f32 {
        self.life
    }

    /// Ticks left before the particle dies (may be fractional).
    #[inline]
    pub fn remaining(&self) -> f32 {
        (self.max_life - self.age as f32).max(0.0)
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn test_single_tick_lifespan() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::new(1.0, 0.0), 1.0, Color::WHITE);
        assert!(!p.update());
        assert_eq!(p.life(), 0.0);
        assert_eq!(p.position(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_update_order() {
        // v = (v + a) * d, then x += v
        let mut p = Particle::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 10.0, Color::WHITE)
            .with_acceleration(Vec3::new(0.0, -0.5, 0.0))
            .with_damping(0.5);
        assert!(p.update());
        assert!((p.velocity().y - 0.25).abs() < 1e-6);
        assert!((p.position().y - 0.25).abs() < 1e-6);
        assert_eq!(p.age(), 1);
        assert!((p.life() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_life_non_increasing_and_hits_zero() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ONE, 7.5, Color::WHITE).with_damping(0.98);
        let mut last = p.life();
        let mut updates = 0;
        while p.update() {
            assert!(p.life() <= last);
            last = p.life();
            updates += 1;
        }
        updates += 1;
        assert_eq!(p.life(), 0.0);
        assert_eq!(updates, 8); // ceil(7.5)
        assert!(p.age() as f32 >= p.max_life());
    }

    #[test]
    fn test_dead_update_is_noop() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::new(1.0, 0.0), 1.0, Color::WHITE);
        assert!(!p.update());
        let pos = p.position();
        let age = p.age();
        assert!(!p.update());
        assert!(!p.update());
        assert_eq!(p.position(), pos);
        assert_eq!(p.age(), age);
    }

    #[test]
    fn test_visual_state_scale_floor() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, 10.0, Color::RED);
        for _ in 0..9 {
            p.update();
        }
        let state = p.visual_state();
        assert!((state.opacity - 0.1).abs() < 1e-6);
        assert_eq!(state.scale, DEFAULT_MIN_SCALE);
        assert_eq!(state.color, Color::RED);

        let fresh = Particle::new(Vec2::ZERO, Vec2::ZERO, 10.0, Color::RED);
        assert_eq!(fresh.visual_state().scale, 1.0);
        assert_eq!(fresh.visual_state().opacity, 1.0);
    }

    #[test]
    fn test_damping_clamped() {
        let p = Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0, Color::WHITE).with_damping(3.0);
        assert_eq!(p.damping(), 1.0);
        let p = Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0, Color::WHITE).with_damping(-1.0);
        assert!(p.damping() > 0.0);
    }

    #[test]
    fn test_take_handle_once() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0, Color::WHITE);
        p.attach(RenderHandle::new(3));
        assert_eq!(p.handle().map(RenderHandle::slot), Some(3));
        assert!(p.take_handle().is_some());
        assert!(p.take_handle().is_none());
    }
}
