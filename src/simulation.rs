//! Simulation builder and runner

use glam::{Vec2, Vec3};
use winit::event_loop::{ControlFlow, EventLoop};

use crate::audio::AudioContext;
use crate::color::Palette;
use crate::config::{AppConfig, Mode};
use crate::emitter::Emitter;
use crate::engine::Engine;
use crate::error::SimulationError;
use crate::gpu::Projection;
use crate::space::Space;
use crate::trigger::{Projector, RayProjector, ScreenProjector};
use crate::window::{App, RenderSetup};

/// A fireworks display builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// Simulation::new()
///     .with_mode(Mode::Scene)
///     .with_seed(7)
///     .run()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    config: AppConfig,
}

impl Simulation {
    /// Canvas mode with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    /// Switch mode. The emitter follows the mode's preset unless one was set.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.config.emission = Some(emitter.into());
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.config.palette = palette;
        self
    }

    /// Fix the RNG seed for reproducible bursts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.config.audio.enabled = enabled;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the engine for this configuration.
    pub fn build_engine<V: Space>(&self, projector: impl Projector<V> + 'static) -> Engine<V> {
        let config = &self.config;
        let audio = if config.audio.enabled {
            AudioContext::default_device(config.audio.synth())
        } else {
            AudioContext::disabled()
        };
        let engine = Engine::new(config.emitter(), projector)
            .with_palette(config.palette.clone())
            .with_audio(audio);
        match config.seed {
            Some(seed) => engine.with_seed(seed),
            None => engine,
        }
    }

    /// Run the display. Blocks until the window is closed.
    pub fn run(self) -> Result<(), SimulationError> {
        self.config.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let render = &self.config.render;
        let radius = render.radius_for(self.config.mode);
        log::info!("starting in {:?} mode", self.config.mode);

        match self.config.mode {
            Mode::Canvas => {
                let engine: Engine<Vec2> = self.build_engine(ScreenProjector);
                let setup = RenderSetup {
                    projection: Projection::Canvas,
                    radius,
                    vsync: render.vsync,
                };
                let mut app = App::new(engine, setup, self.config.window.clone());
                event_loop.run_app(&mut app)?;
                app.error.map_or(Ok(()), Err)
            }
            Mode::Scene => {
                let engine: Engine<Vec3> = self.build_engine(RayProjector::new(render.camera.clone()));
                let setup = RenderSetup {
                    projection: Projection::Scene {
                        camera: render.camera.clone(),
                        fog: render.fog,
                    },
                    radius,
                    vsync: render.vsync,
                };
                let mut app = App::new(engine, setup, self.config.window.clone());
                event_loop.run_app(&mut app)?;
                app.error.map_or(Ok(()), Err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessRenderer;
    use crate::trigger::Trigger;

    #[test]
    fn test_builder_sets_config() {
        let sim = Simulation::new()
            .with_mode(Mode::Scene)
            .with_seed(3)
            .with_audio(false)
            .with_emitter(Emitter::scene().with_count(5..=5));
        assert_eq!(sim.config().mode, Mode::Scene);
        assert_eq!(sim.config().seed, Some(3));
        assert!(!sim.config().audio.enabled);
        assert_eq!(sim.config().emitter().count, 5..=5);
    }

    #[test]
    fn test_seeded_engines_match() {
        let sim = Simulation::new().with_seed(99).with_audio(false);
        let click = Trigger::new(Vec2::new(10.0, 10.0), Vec2::new(100.0, 100.0));
        let mut a: Engine<Vec2> = sim.build_engine(ScreenProjector);
        let mut b: Engine<Vec2> = sim.build_engine(ScreenProjector);
        let mut renderer = HeadlessRenderer::new();
        assert_eq!(a.trigger(&click, &mut renderer), b.trigger(&click, &mut renderer));
        let va: Vec<_> = a.registry().iter().map(|p| p.velocity()).collect();
        let vb: Vec<_> = b.registry().iter().map(|p| p.velocity()).collect();
        assert_eq!(va, vb);
    }

    #[test]
    fn test_scene_engine_uses_scene_preset() {
        let sim = Simulation::new().with_mode(Mode::Scene).with_seed(1).with_audio(false);
        let mut engine: Engine<Vec3> = sim.build_engine(RayProjector::new(sim.config().render.camera.clone()));
        let click = Trigger::new(Vec2::new(640.0, 360.0), Vec2::new(1280.0, 720.0));
        assert_eq!(engine.trigger(&click, &mut HeadlessRenderer::new()), 150);
    }
}
