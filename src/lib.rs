//! # Pyro - click-triggered particle fireworks
//!
//! Every click spawns a burst of particles that fly outward, slow down, fade,
//! and disappear. The simulation runs on the CPU one tick per frame; drawing
//! goes through a [`RenderAdapter`], with a wgpu implementation for the window
//! and a headless one for tests.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pyro::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     Simulation::new()
//!         .with_mode(Mode::Scene)
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! A [`Particle`] has position, velocity, a constant acceleration, a damping
//! factor, and a lifespan in ticks. Each tick applies acceleration, then
//! damping, then moves, then ages. Opacity is the remaining life fraction and
//! scale never drops below `min_scale`.
//!
//! ### Emission
//!
//! An [`Emitter`] turns one trigger point into a batch: a random count, random
//! directions (circle or sphere), random speeds, lifespans, and colors drawn
//! from the active [`Palette`] entries. With no active colors every particle
//! is white.
//!
//! ### Registry
//!
//! The [`Registry`] owns all live particles. [`Registry::tick`] advances them
//! and removes the dead, returning each dead particle's [`RenderHandle`] to
//! the adapter exactly once.
//!
//! ### Dimensions
//!
//! Everything is generic over [`Space`], implemented for `Vec2` (canvas mode,
//! window pixels) and `Vec3` (scene mode, perspective camera).
//!
//! ## Driving the engine yourself
//!
//! ```ignore
//! use pyro::prelude::*;
//!
//! let mut engine = Engine::new(Emitter::canvas(), ScreenProjector).with_seed(7);
//! let mut renderer = HeadlessRenderer::with_handles();
//!
//! engine.trigger(&Trigger::new(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0)), &mut renderer);
//! while !engine.is_empty() {
//!     engine.frame(&mut renderer);
//! }
//! engine.shutdown(&mut renderer);
//! ```
//!
//! ## Logging
//!
//! The library logs through the `log` facade. The `pyro` binary installs
//! `env_logger` at `info`; set `RUST_LOG=pyro=trace` to see per-tick output.

pub mod audio;
pub mod camera;
pub mod color;
pub mod config;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod particle;
pub mod registry;
pub mod render;
mod simulation;
pub mod space;
pub mod time;
pub mod trigger;
mod window;

pub use audio::{AudioContext, Clip, ExplosionSynth, NullSink, SoundSink};
pub use camera::Camera;
pub use color::{Color, Palette, Swatch};
pub use config::{AppConfig, Mode};
pub use emitter::{Emitter, EmitterOverrides};
pub use engine::Engine;
pub use error::{AudioError, ColorError, ConfigError, GpuError, SimulationError};
pub use glam::{Vec2, Vec3};
pub use particle::{Particle, VisualState};
pub use registry::{Registry, TickReport};
pub use render::{HeadlessRenderer, RenderAdapter, RenderHandle};
pub use simulation::Simulation;
pub use space::Space;
pub use trigger::{Projector, RayProjector, ScreenProjector, Trigger};

#[cfg(feature = "audio")]
pub use audio::RodioSink;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use pyro::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audio::{AudioContext, ExplosionSynth};
    pub use crate::color::{Color, Palette};
    pub use crate::config::{AppConfig, Mode};
    pub use crate::emitter::Emitter;
    pub use crate::engine::Engine;
    pub use crate::error::SimulationError;
    pub use crate::particle::Particle;
    pub use crate::registry::Registry;
    pub use crate::render::{HeadlessRenderer, RenderAdapter};
    pub use crate::simulation::Simulation;
    pub use crate::trigger::{RayProjector, ScreenProjector, Trigger};
    pub use crate::{Vec2, Vec3};
}
