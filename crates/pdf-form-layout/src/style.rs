//! Field styling values: colors and field flags.

use crate::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Border or fill color of a field.
///
/// Parsed from a color name (`black`, `red`, ...) or a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Color {
    /// No color: nothing is painted
    #[default]
    Transparent,
    /// RGB components in the `0.0..=1.0` range
    Rgb { r: f32, g: f32, b: f32 },
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Components for a PDF color array, or `None` when transparent.
    pub fn components(self) -> Option<[f32; 3]> {
        match self {
            Color::Transparent => None,
            Color::Rgb { r, g, b } => Some([r, g, b]),
        }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl FromStr for Color {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let color = match name.as_str() {
            "transparent" | "none" => Color::Transparent,
            "black" => Color::BLACK,
            "white" => Color::rgb(1.0, 1.0, 1.0),
            "red" => Color::RED,
            "green" => Color::rgb(0.0, 0.5, 0.0),
            "blue" => Color::rgb(0.0, 0.0, 1.0),
            "gray" | "grey" => Color::rgb(0.5, 0.5, 0.5),
            "yellow" => Color::rgb(1.0, 1.0, 0.0),
            "cyan" => Color::rgb(0.0, 1.0, 1.0),
            "magenta" => Color::rgb(1.0, 0.0, 1.0),
            "orange" => Color::rgb(1.0, 0.647, 0.0),
            other => other
                .strip_prefix('#')
                .and_then(Color::from_hex)
                .ok_or_else(|| LayoutError::InvalidDefinition(format!("unknown color '{}'", s)))?,
        };
        Ok(color)
    }
}

impl TryFrom<String> for Color {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Transparent => f.write_str("transparent"),
            Color::Rgb { r, g, b } => {
                let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                write!(f, "#{:02x}{:02x}{:02x}", byte(*r), byte(*g), byte(*b))
            }
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Interactive field flags, named as in the definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldFlag {
    ReadOnly,
    Required,
    NoExport,
    Multiline,
    Password,
    FileSelect,
    DoNotSpellCheck,
    DoNotScroll,
    Comb,
    RichText,
}

impl FieldFlag {
    /// Bit value in the field's `/Ff` entry.
    pub fn bit(self) -> u32 {
        let position = match self {
            FieldFlag::ReadOnly => 1,
            FieldFlag::Required => 2,
            FieldFlag::NoExport => 3,
            FieldFlag::Multiline => 13,
            FieldFlag::Password => 14,
            FieldFlag::FileSelect => 21,
            FieldFlag::DoNotSpellCheck => 23,
            FieldFlag::DoNotScroll => 24,
            FieldFlag::Comb => 25,
            FieldFlag::RichText => 26,
        };
        1 << (position - 1)
    }

    /// Combine a flag list into a `/Ff` value.
    pub fn combine(flags: &[FieldFlag]) -> u32 {
        flags.iter().fold(0, |bits, flag| bits | flag.bit())
    }
}
