//! On-disk configuration.
//!
//! A single JSON document; every field is optional and falls back to the
//! defaults of the chosen [`Mode`]:
//!
//! ```json
//! {
//!   "mode": "scene",
//!   "seed": 7,
//!   "emission": { "count": { "start": 50, "end": 80 } },
//!   "palette": [
//!     { "name": "Gold", "hex": "#FFD700" },
//!     { "name": "White", "hex": "#FFFFFF", "active": false }
//!   ],
//!   "audio": { "enabled": true, "volume": 0.8 },
//!   "render": { "fog": { "near": 80.0, "far": 400.0 } },
//!   "window": { "width": 1280, "height": 720 }
//! }
//! ```

use crate::audio::ExplosionSynth;
use crate::camera::Camera;
use crate::color::Palette;
use crate::emitter::{Emitter, EmitterOverrides};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Flat pixel canvas or perspective scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Canvas,
    Scene,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// Master gain in `[0, 1]`.
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 1.0,
        }
    }
}

impl AudioConfig {
    pub fn synth(&self) -> ExplosionSynth {
        ExplosionSynth {
            volume: self.volume,
            ..ExplosionSynth::default()
        }
    }
}

/// Distance fog for scene mode. Opacity falls off linearly between `near` and `far`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fog {
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self { near: 100.0, far: 500.0 }
    }
}

#[cfg(test)]
impl Fog {
    /// Opacity multiplier at `distance` from the camera, as `particle.wgsl` computes it.
    fn factor(&self, distance: f32) -> f32 {
        let span = (self.far - self.near).max(0.0001);
        (1.0 - (distance - self.near) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Particle radius at full scale. Pixels in canvas mode, world units in
    /// scene mode. `None` picks the mode default.
    pub particle_radius: Option<f32>,
    pub fog: Fog,
    pub camera: Camera,
    pub vsync: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            particle_radius: None,
            fog: Fog::default(),
            camera: Camera::default(),
            vsync: true,
        }
    }
}

impl RenderConfig {
    pub fn radius_for(&self, mode: Mode) -> f32 {
        self.particle_radius.unwrap_or(match mode {
            Mode::Canvas => 4.0,
            Mode::Scene => 0.6,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Pyro".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Everything the `pyro` binary can be told.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: Mode,
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Emission parameters laid over the mode preset. `None` uses the preset as is.
    pub emission: Option<EmitterOverrides>,
    pub palette: Palette,
    pub audio: AudioConfig,
    pub render: RenderConfig,
    pub window: WindowConfig,
}

impl AppConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// The emitter for this config's mode.
    pub fn emitter(&self) -> Emitter {
        let preset = match self.mode {
            Mode::Canvas => Emitter::canvas(),
            Mode::Scene => Emitter::scene(),
        };
        match &self.emission {
            Some(overrides) => overrides.apply(preset),
            None => preset,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.emitter().validate()?;

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(invalid("audio.volume", "must be in [0, 1]"));
        }
        if let Some(radius) = self.render.particle_radius {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(invalid("render.particle_radius", "must be positive"));
            }
        }
        let fog = self.render.fog;
        if !(fog.near >= 0.0 && fog.far.is_finite()) {
            return Err(invalid("render.fog", "near must be non-negative and far finite"));
        }
        let camera = &self.render.camera;
        if !(camera.fov_y > 0.0 && camera.fov_y < 180.0) {
            return Err(invalid("render.camera.fov_y", "must be in (0, 180) degrees"));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(invalid("render.camera", "need 0 < near < far"));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "width and height must be non-zero"));
        }
        for swatch in self.palette.swatches() {
            if let Err(e) = crate::color::Color::parse_hex(&swatch.hex) {
                log::warn!("palette entry {:?}: {e}; it will render red", swatch.name);
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
