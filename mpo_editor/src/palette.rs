//! Motor display colors.
//!
//! The core treats a color as an opaque tag carried for the view and the
//! saved file. New motors draw their color from a [`HueSequence`], a
//! deterministic generator seeded from configuration, so two sessions with
//! the same seed hand out the same colors.

use std::fmt;
use std::str::FromStr;

use mpo_common::editor::PaletteConfig;
use serde::{Deserialize, Serialize};

/// 8-bit RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Pure red, the color of the first default motor.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Neutral gray.
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Create from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert HSV (`hue` in degrees, `s` and `v` in `[0, 1]`) to RGB.
    pub fn from_hsv(hue: f64, s: f64, v: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to_u8 = |ch: f64| ((ch + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error parsing a `#rrggbb` string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| ParseColorError(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Golden-angle hue step, spreads consecutive hues evenly around the wheel.
const GOLDEN_ANGLE_DEG: f64 = 137.507_764_050_037_85;

/// Deterministic color generator for new motors.
#[derive(Debug, Clone)]
pub struct HueSequence {
    index: u64,
    saturation: f64,
    value: f64,
}

impl HueSequence {
    /// Start the sequence at `config.seed`.
    pub fn new(config: &PaletteConfig) -> Self {
        Self {
            index: config.seed,
            saturation: config.saturation,
            value: config.value,
        }
    }
}

impl Default for HueSequence {
    fn default() -> Self {
        Self::new(&PaletteConfig::default())
    }
}

impl Iterator for HueSequence {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        let hue = (self.index as f64 * GOLDEN_ANGLE_DEG) % 360.0;
        self.index = self.index.wrapping_add(1);
        Some(Color::from_hsv(hue, self.saturation, self.value))
    }
}
