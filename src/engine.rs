//! The engine: one owner for everything a running firework display needs.

use crate::audio::AudioContext;
use crate::color::Palette;
use crate::emitter::Emitter;
use crate::registry::{Registry, TickReport};
use crate::render::RenderAdapter;
use crate::space::Space;
use crate::trigger::{Projector, Trigger};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Owns the registry, emitter, palette, RNG, and audio context.
///
/// Drive it with [`Engine::trigger`] on clicks and [`Engine::frame`] once per
/// redraw; call [`Engine::shutdown`] before the render adapter goes away.
pub struct Engine<V: Space> {
    registry: Registry<V>,
    emitter: Emitter,
    palette: Palette,
    projector: Box<dyn Projector<V>>,
    audio: AudioContext,
    rng: SmallRng,
    ticks: u64,
}

impl<V: Space> Engine<V> {
    /// Seeded from entropy, no audio.
    pub fn new(emitter: Emitter, projector: impl Projector<V> + 'static) -> Self {
        Self {
            registry: Registry::new(),
            emitter,
            palette: Palette::default(),
            projector: Box::new(projector),
            audio: AudioContext::disabled(),
            rng: SmallRng::from_entropy(),
            ticks: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_audio(mut self, audio: AudioContext) -> Self {
        self.audio = audio;
        self
    }

    /// Spawn one firework at the trigger point.
    ///
    /// Returns the number of particles added. Audio is fired afterwards and
    /// cannot affect the emitted burst.
    pub fn trigger<A: RenderAdapter<V> + ?Sized>(&mut self, trigger: &Trigger, adapter: &mut A) -> usize {
        let origin = self.projector.project(trigger, &mut self.rng);
        let colors = self.palette.active_colors();
        let mut batch = self.emitter.emit(origin, &colors, &mut self.rng);

        for particle in &mut batch {
            if let Some(handle) = adapter.acquire(&particle.visual_state()) {
                particle.attach(handle);
            }
        }
        let added = batch.len();
        self.registry.insert(batch);

        self.audio.explode(&mut self.rng);
        added
    }

    /// Advance the simulation one tick, then draw it.
    pub fn frame<A: RenderAdapter<V> + ?Sized>(&mut self, adapter: &mut A) -> TickReport {
        let report = self.registry.tick(adapter);
        self.ticks += 1;
        self.registry.render(adapter);
        report
    }

    /// Release every live particle's render handle. Returns how many particles were dropped.
    pub fn shutdown<A: RenderAdapter<V> + ?Sized>(&mut self, adapter: &mut A) -> usize {
        let dropped = self.registry.clear(adapter);
        log::info!("engine shut down after {} ticks, {} particles dropped", self.ticks, dropped);
        dropped
    }

    /// Live particle count.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Ticks advanced so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn registry(&self) -> &Registry<V> {
        &self.registry
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }
}
