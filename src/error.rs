//! Error types for Pyro.
//!
//! The simulation core never fails. These errors cover the edges around it:
//! color parsing, configuration files, GPU setup, the audio device, and the
//! window/event loop that drives everything.

use thiserror::Error;

/// A color string that is not `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Wrong number of hex digits after the optional `#`.
    #[error("expected 6 hex digits, got {0:?}")]
    Length(String),
    /// A character outside `[0-9a-fA-F]`.
    #[error("invalid hex digit in {0:?}")]
    Digit(String),
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for [`crate::config::AppConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value parsed but makes no sense (empty range, damping out of (0, 1], ...).
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("surface has no supported texture format")]
    NoSurfaceFormat,
}

/// Errors from the audio side effect. Always logged, never propagated past a trigger.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No output device could be opened.
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    /// The device refused to play a clip.
    #[error("audio playback rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur when running the interactive simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_names_field() {
        let err = ConfigError::Invalid {
            field: "emission.damping",
            reason: "must be in (0, 1]".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("emission.damping"));
        assert!(msg.contains("(0, 1]"));
    }

    #[test]
    fn test_simulation_error_wraps_config() {
        let err: SimulationError = ConfigError::Invalid {
            field: "mode",
            reason: "unknown".into(),
        }
        .into();
        assert!(matches!(err, SimulationError::Config(_)));
        assert!(err.to_string().starts_with("config error"));
    }
}
