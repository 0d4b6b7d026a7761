//! The simulation registry: the one collection that owns live particles.

use crate::particle::Particle;
use crate::render::RenderAdapter;
use crate::space::Space;

/// What one [`Registry::tick`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Particles advanced this tick.
    pub advanced: usize,
    /// Particles that died and were removed.
    pub reclaimed: usize,
}

/// Insertion-ordered, exclusively owned collection of live particles.
///
/// Particles are stored by value, so no two slots can refer to the same
/// particle. Mutation happens only through `&mut self`, which keeps emission
/// and ticking serialized.
#[derive(Debug)]
pub struct Registry<V: Space> {
    particles: Vec<Particle<V>>,
}

impl<V: Space> Registry<V> {
    pub fn new() -> Self {
        Self { particles: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
        }
    }

    /// Append newly emitted particles.
    pub fn insert(&mut self, batch: impl IntoIterator<Item = Particle<V>>) {
        let before = self.particles.len();
        self.particles.extend(batch);
        log::trace!("registry: +{} -> {}", self.particles.len() - before, self.particles.len());
    }

    /// Advance every particle once and reclaim the ones that died.
    ///
    /// Each dead particle's render handle goes back to `adapter` before the
    /// particle is dropped. Filtering happens in place, so no entry is skipped
    /// or visited twice.
    pub fn tick<A: RenderAdapter<V> + ?Sized>(&mut self, adapter: &mut A) -> TickReport {
        let advanced = self.particles.len();

        self.particles.retain_mut(|particle| {
            if particle.update() {
                return true;
            }
            if let Some(handle) = particle.take_handle() {
                adapter.release(handle);
            }
            false
        });

        let report = TickReport {
            advanced,
            reclaimed: advanced - self.particles.len(),
        };
        if report.reclaimed > 0 {
            log::trace!("registry: reclaimed {} of {}", report.reclaimed, report.advanced);
        }
        report
    }

    /// Draw every live particle. Does not touch particle state.
    pub fn render<A: RenderAdapter<V> + ?Sized>(&self, adapter: &mut A) {
        adapter.begin_frame();
        for particle in &self.particles {
            adapter.draw(particle.handle(), &particle.visual_state());
        }
        adapter.end_frame();
    }

    /// Drop every particle, returning their render handles. Used at teardown.
    pub fn clear<A: RenderAdapter<V> + ?Sized>(&mut self, adapter: &mut A) -> usize {
        let count = self.particles.len();
        for mut particle in self.particles.drain(..) {
            if let Some(handle) = particle.take_handle() {
                adapter.release(handle);
            }
        }
        count
    }

    /// Live particle count.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Alias of [`Registry::len`] for stats displays.
    #[inline]
    pub fn size(&self) -> usize {
        self.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle<V>> {
        self.particles.iter()
    }

    /// Live particles still holding a render handle.
    pub fn unreleased_handles(&self) -> usize {
        self.particles.iter().filter(|p| p.handle().is_some()).count()
    }
}

impl<V: Space> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Space> Drop for Registry<V> {
    fn drop(&mut self) {
        let leaked = self.unreleased_handles();
        if leaked > 0 {
            log::warn!("registry dropped with {leaked} unreleased render handles; call clear() first");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::render::HeadlessRenderer;
    use glam::Vec2;

    fn particle(max_life: f32) -> Particle<Vec2> {
        Particle::new(Vec2::ZERO, Vec2::new(1.0, 0.0), max_life, Color::WHITE)
    }

    #[test]
    fn test_insert_and_len() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.insert(vec![particle(5.0), particle(6.0)]);
        registry.insert(std::iter::once(particle(7.0)));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.size(), 3);
        // Insertion order is kept
        let lives: Vec<f32> = registry.iter().map(|p| p.max_life()).collect();
        assert_eq!(lives, vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_tick_reports() {
        let mut registry = Registry::new();
        let mut renderer = HeadlessRenderer::new();
        registry.insert(vec![particle(1.0), particle(2.0)]);

        let first = registry.tick(&mut renderer);
        assert_eq!(first, TickReport { advanced: 2, reclaimed: 1 });
        let second = registry.tick(&mut renderer);
        assert_eq!(second, TickReport { advanced: 1, reclaimed: 1 });
        assert!(registry.is_empty());
        assert_eq!(registry.tick(&mut renderer), TickReport::default());
    }

    #[test]
    fn test_tick_releases_handles() {
        let mut registry = Registry::new();
        let mut renderer = HeadlessRenderer::with_handles();
        let batch: Vec<_> = [1.0, 2.0, 3.0]
            .into_iter()
            .map(|life| {
                let mut p = particle(life);
                if let Some(h) = renderer.acquire(&p.visual_state()) {
                    p.attach(h);
                }
                p
            })
            .collect();
        registry.insert(batch);
        assert_eq!(renderer.stats().outstanding(), 3);

        registry.tick(&mut renderer);
        assert_eq!(renderer.stats().released, 1);
        registry.tick(&mut renderer);
        registry.tick(&mut renderer);
        assert_eq!(renderer.stats().outstanding(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_drop_with_attached_handles() {
        let mut renderer = HeadlessRenderer::with_handles();
        let mut registry = Registry::new();
        let mut held = particle(10.0);
        if let Some(h) = renderer.acquire(&held.visual_state()) {
            held.attach(h);
        }
        registry.insert([held, particle(10.0)]);
        assert_eq!(registry.unreleased_handles(), 1);

        // Warns instead of panicking; the handle is never returned
        drop(registry);
        assert_eq!(renderer.stats().outstanding(), 1);
    }

    #[test]
    fn test_clear_leaves_nothing_to_leak() {
        let mut renderer = HeadlessRenderer::with_handles();
        let mut registry = Registry::new();
        let mut held = particle(10.0);
        if let Some(h) = renderer.acquire(&held.visual_state()) {
            held.attach(h);
        }
        registry.insert([held]);
        assert_eq!(registry.clear(&mut renderer), 1);
        assert_eq!(registry.unreleased_handles(), 0);
        assert_eq!(renderer.stats().outstanding(), 0);
    }

    #[test]
    fn test_render_draws_live_only() {
        let mut registry = Registry::new();
        let mut renderer = HeadlessRenderer::new();
        registry.insert(vec![particle(1.0), particle(3.0), particle(3.0)]);
        registry.tick(&mut renderer);
        registry.render(&mut renderer);
        assert_eq!(renderer.stats().last_frame_draws, 2);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut registry = Registry::new();
        let mut renderer = HeadlessRenderer::with_handles();
        for _ in 0..4 {
            let mut p = particle(100.0);
            p.attach(renderer.acquire(&p.visual_state()).unwrap());
            registry.insert(std::iter::once(p));
        }
        assert_eq!(registry.clear(&mut renderer), 4);
        assert!(registry.is_empty());
        assert_eq!(renderer.stats().outstanding(), 0);
    }
}
