//! RGBA colours as they appear in style records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGBA colour with straight (non-premultiplied) alpha.
///
/// Serialized as `#RRGGBB` when opaque and `#RRGGBBAA` otherwise. Named
/// colours such as `"red"` are accepted on input.
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

    /// Same colour with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Parse `#RRGGBB`, `#RRGGBBAA` or a named colour.
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex_color(hex).ok_or_else(|| ColorParseError(s.to_string()));
        }
        named_color(trimmed).ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color: {0}. Expected '#RRGGBB', '#RRGGBBAA' or a color name")]
pub struct ColorParseError(pub String);

fn parse_hex_color(s: &str) -> Option<Color> {
    if !s.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    match s.len() {
        6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name.to_lowercase().as_str() {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" => Color::rgb(0, 255, 255),
        "magenta" => Color::rgb(255, 0, 255),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        _ => return None,
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse("#FF8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(Color::parse("#ff800080").unwrap(), Color::rgba(255, 128, 0, 128));
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Color::parse("Orange").unwrap(), Color::rgb(255, 165, 0));
        assert!(Color::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert!(Color::parse("#FFF").is_err());
        assert!(Color::parse("#GG0000").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let opaque = Color::rgb(1, 2, 3);
        assert_eq!(opaque.to_string(), "#010203");
        let translucent = opaque.with_alpha(0x40);
        assert_eq!(translucent.to_string(), "#01020340");
        assert_eq!(Color::parse(&translucent.to_string()).unwrap(), translucent);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#FF0000\"");
        let back: Color = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(back, Color::rgb(0, 0, 255));
        assert!(serde_json::from_str::<Color>("\"#12\"").is_err());
    }
}
