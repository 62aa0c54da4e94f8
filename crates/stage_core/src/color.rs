//! Tint colors

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Linear RGBA color with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const GRAY: Color = Color::rgba(0.5, 0.5, 0.5, 1.0);
    pub const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::rgba(0.0, 0.0, 1.0, 1.0);
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Create a color from components
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Linear interpolation towards `other`
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// `#RRGGBBAA` representation
    pub fn to_hex(self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }

    fn from_hex(hex: &str) -> Option<Color> {
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let r = channel(0)?;
        let g = channel(2)?;
        let b = channel(4)?;
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Color::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = ValueError;

    /// Accepts `#RRGGBB`, `#RRGGBBAA` or a basic color name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let parsed = match value.strip_prefix('#') {
            Some(hex) => Color::from_hex(hex),
            None => match value.to_ascii_lowercase().as_str() {
                "white" => Some(Color::WHITE),
                "black" => Some(Color::BLACK),
                "gray" | "grey" => Some(Color::GRAY),
                "red" => Some(Color::RED),
                "green" => Some(Color::GREEN),
                "blue" => Some(Color::BLUE),
                "clear" => Some(Color::CLEAR),
                _ => None,
            },
        };
        parsed.ok_or_else(|| ValueError::unsupported("tint", s))
    }
}

impl TryFrom<String> for Color {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let color: Color = "#FF000080".parse().unwrap();
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert!((color.a - 128.0 / 255.0).abs() < 1e-5);

        let color: Color = "#00FF00".parse().unwrap();
        assert_eq!(color, Color::GREEN);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("White".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("grey".parse::<Color>().unwrap(), Color::GRAY);
        assert!("mauve".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(Color::RED.to_hex(), "#FF0000FF");
        assert_eq!(Color::WHITE.lerp(Color::BLACK, 1.0), Color::BLACK);
    }
}
