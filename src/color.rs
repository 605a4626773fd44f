//! CSS-style color values used by fills and the terminal palette.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An 8-bit straight-alpha RGBA color.
///
/// Parsed from `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)` and a handful of CSS keywords. Serializes back to hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// Hex representation, `#rrggbb` when opaque and `#rrggbbaa` otherwise.
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    fn parse_hex(digits: &str) -> Option<Self> {
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    fn parse_functional(args: &str) -> Option<Self> {
        let parts: Vec<&str> = args
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        let channel = |s: &str| -> Option<u8> {
            if let Some(pct) = s.strip_suffix('%') {
                let v: f32 = pct.parse().ok()?;
                Some((v.clamp(0.0, 100.0) * 2.55).round() as u8)
            } else {
                let v: f32 = s.parse().ok()?;
                Some(v.clamp(0.0, 255.0).round() as u8)
            }
        };
        let alpha = |s: &str| -> Option<u8> {
            let v: f32 = match s.strip_suffix('%') {
                Some(pct) => pct.parse::<f32>().ok()? / 100.0,
                None => s.parse().ok()?,
            };
            Some((v.clamp(0.0, 1.0) * 255.0).round() as u8)
        };
        match parts.len() {
            3 => Some(Color::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?)),
            4 => Some(Color::rgba(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
                alpha(parts[3])?,
            )),
            _ => None,
        }
    }

    fn named(name: &str) -> Option<Self> {
        let c = match name {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "transparent" => Color::TRANSPARENT,
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "blue" => Color::rgb(0, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            _ => return None,
        };
        Some(c)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let parsed = if let Some(hex) = lower.strip_prefix('#') {
            Color::parse_hex(hex)
        } else if let Some(args) = lower.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            Color::parse_functional(args)
        } else if let Some(args) = lower.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            Color::parse_functional(args)
        } else {
            Color::named(&lower)
        };
        parsed.ok_or_else(|| Error::InvalidColor(trimmed.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#161b22".parse::<Color>().unwrap(), Color::rgb(0x16, 0x1b, 0x22));
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#00000080".parse::<Color>().unwrap(), Color::rgba(0, 0, 0, 128));
        assert_eq!("#F0A".parse::<Color>().unwrap(), Color::rgb(255, 0, 170));
    }

    #[test]
    fn parses_functional_forms() {
        assert_eq!("rgb(30, 30, 46)".parse::<Color>().unwrap(), Color::rgb(30, 30, 46));
        assert_eq!(
            "rgba(255, 95, 86, 0.5)".parse::<Color>().unwrap(),
            Color::rgba(255, 95, 86, 128)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!("#12".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("rgb(1,2)".parse::<Color>().is_err());
        assert!("chartreuse-ish".parse::<Color>().is_err());
    }

    #[test]
    fn hex_output_keeps_alpha_only_when_needed() {
        assert_eq!(Color::rgb(1, 2, 3).to_hex(), "#010203");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_hex(), "#01020304");
    }
}
