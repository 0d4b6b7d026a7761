//! Colors and the active-color palette.
//!
//! Particles carry an opaque [`Color`]. The [`Palette`] is the color provider
//! the emitter draws from: a fixed list of named colors, each of which can be
//! toggled on or off by the user.

use crate::error::ColorError;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);

    /// Substituted when emission is asked to pick from an empty color set.
    pub const DEFAULT: Color = Color::WHITE;

    /// Substituted for color strings that fail to parse.
    pub const FALLBACK: Color = Color::RED;

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From a packed `0xRRGGBB` value.
    pub const fn from_u32(packed: u32) -> Self {
        Self::rgb((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }

    /// Packed `0xRRGGBB`.
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse `#RRGGBB` or `RRGGBB`, case-insensitive.
    pub fn parse_hex(s: &str) -> Result<Self, ColorError> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if digits.len() != 6 {
            return Err(ColorError::Length(s.to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::Digit(s.to_string()));
        }
        let packed = u32::from_str_radix(digits, 16).map_err(|_| ColorError::Digit(s.to_string()))?;
        Ok(Self::from_u32(packed))
    }

    /// Parse, failing closed to [`Color::FALLBACK`].
    pub fn parse_or_fallback(s: &str) -> Self {
        match Self::parse_hex(s) {
            Ok(color) => color,
            Err(e) => {
                log::warn!("{e}; using fallback color");
                Self::FALLBACK
            }
        }
    }

    /// `#RRGGBB`, uppercase.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Linear 0.0-1.0 channels for the renderer.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One entry of the palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    pub name: String,
    /// `#RRGGBB`. Malformed values render as [`Color::FALLBACK`].
    pub hex: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Swatch {
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
            active: true,
        }
    }

    pub fn color(&self) -> Color {
        Color::parse_or_fallback(&self.hex)
    }
}

/// The set of colors a firework may use, with per-color toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Palette {
    pub fn new(swatches: Vec<Swatch>) -> Self {
        Self { swatches }
    }

    /// Red, green, blue, yellow, magenta, cyan, orange, pink; all active.
    pub fn classic() -> Self {
        Self::new(vec![
            Swatch::new("Red", "#FF0000"),
            Swatch::new("Green", "#00FF00"),
            Swatch::new("Blue", "#0000FF"),
            Swatch::new("Yellow", "#FFFF00"),
            Swatch::new("Magenta", "#FF00FF"),
            Swatch::new("Cyan", "#00FFFF"),
            Swatch::new("Orange", "#FFA500"),
            Swatch::new("Pink", "#FF1493"),
        ])
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Colors currently switched on. May be empty; the emitter handles that.
    pub fn active_colors(&self) -> Vec<Color> {
        self.swatches
            .iter()
            .filter(|s| s.active)
            .map(Swatch::color)
            .collect()
    }

    /// Flip one swatch. Returns the new state, or `None` if out of range.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let swatch = self.swatches.get_mut(index)?;
        swatch.active = !swatch.active;
        log::debug!("palette: {} -> {}", swatch.name, if swatch.active { "on" } else { "off" });
        Some(swatch.active)
    }

    /// If every swatch is on, switch all off. Otherwise switch all on.
    pub fn toggle_all(&mut self) {
        let all_active = self.swatches.iter().all(|s| s.active);
        for swatch in &mut self.swatches {
            swatch.active = !all_active;
        }
        log::debug!("palette: all {}", if all_active { "off" } else { "on" });
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}
