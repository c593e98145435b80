use core::fmt;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ARGB color.
///
/// Serialized as a `#AARRGGBB` hex string for IPC friendliness.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    pub argb: u32,
}

impl Color {
    pub const fn new_argb(argb: u32) -> Self {
        Self { argb }
    }

    /// An opaque color from its 24-bit RGB value.
    pub const fn new_rgb(rgb: u32) -> Self {
        Self {
            argb: 0xFF00_0000 | (rgb & 0x00FF_FFFF),
        }
    }

    pub const fn black() -> Self {
        Self { argb: 0xFF000000 }
    }

    pub const fn white() -> Self {
        Self { argb: 0xFFFFFFFF }
    }

    pub const fn alpha(self) -> u8 {
        (self.argb >> 24) as u8
    }

    /// `RRGGBB` without the alpha channel.
    pub fn rgb_hex(self) -> String {
        format!("{:06X}", self.argb & 0x00FF_FFFF)
    }

    /// `AARRGGBB`, the form SpreadsheetML stores in `rgb` attributes.
    pub fn argb_hex(self) -> String {
        format!("{:08X}", self.argb)
    }

    /// Parse a color as accepted at the formatting API boundary:
    /// - 6-digit `RRGGBB` hex (opaque),
    /// - 8-digit `AARRGGBB` hex,
    /// - either of the above with a leading `#`,
    /// - a CSS-style color name (`red`, `white`, `navy`, ...).
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        Self::parse_with_names(s, &BTreeMap::new())
    }

    /// Like [`Color::parse`], consulting `extra_names` (case-insensitive) before the built-in
    /// palette.
    pub fn parse_with_names(
        s: &str,
        extra_names: &BTreeMap<String, Color>,
    ) -> Result<Self, ColorParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ColorParseError::Empty);
        }

        if let Some(caps) = hex_color_re().captures(trimmed) {
            let hex = &caps[1];
            let value = u32::from_str_radix(hex, 16)
                .map_err(|_| ColorParseError::Invalid(trimmed.to_string()))?;
            return Ok(if hex.len() == 6 {
                Color::new_rgb(value)
            } else {
                Color::new_argb(value)
            });
        }

        if let Some((_, color)) = extra_names
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        {
            return Ok(*color);
        }

        named_color(trimmed).ok_or_else(|| ColorParseError::Invalid(trimmed.to_string()))
    }

    fn to_hex(self) -> String {
        format!("#{:08X}", self.argb)
    }
}

fn hex_color_re() -> &'static Regex {
    static HEX_COLOR_RE: OnceLock<Regex> = OnceLock::new();
    HEX_COLOR_RE.get_or_init(|| {
        Regex::new(r"^#?([0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("valid regex")
    })
}

fn named_color(name: &str) -> Option<Color> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "black" => 0x000000,
        "white" => 0xFFFFFF,
        "red" => 0xFF0000,
        "green" | "lime" => 0x00FF00,
        "blue" => 0x0000FF,
        "yellow" => 0xFFFF00,
        "magenta" | "fuchsia" => 0xFF00FF,
        "cyan" | "aqua" => 0x00FFFF,
        "orange" => 0xFFA500,
        "purple" => 0x800080,
        "pink" => 0xFFC0CB,
        "brown" => 0xA52A2A,
        "gray" | "grey" => 0x808080,
        "silver" => 0xC0C0C0,
        "maroon" => 0x800000,
        "navy" => 0x000080,
        "teal" => 0x008080,
        "olive" => 0x808000,
        "darkgreen" => 0x008000,
        _ => return None,
    };
    Some(Color::new_rgb(rgb))
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.trim();
        let hex = s.strip_prefix('#').ok_or_else(|| {
            D::Error::custom("color must be a #AARRGGBB hex string (missing '#')")
        })?;
        if hex.len() != 8 {
            return Err(D::Error::custom(
                "color must be a #AARRGGBB hex string (8 hex digits)",
            ));
        }
        let argb = u32::from_str_radix(hex, 16).map_err(|_| D::Error::custom("invalid hex"))?;
        Ok(Color { argb })
    }
}

/// Errors produced when a color string cannot be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorParseError {
    Empty,
    Invalid(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorParseError::Empty => f.write_str("empty color"),
            ColorParseError::Invalid(s) => write!(
                f,
                "invalid color {s:?} (expected RRGGBB, AARRGGBB, or a color name)"
            ),
        }
    }
}

impl std::error::Error for ColorParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Color::parse("FF0000").unwrap(), Color::new_argb(0xFFFF0000));
        assert_eq!(Color::parse("#00ff00").unwrap(), Color::new_argb(0xFF00FF00));
        assert_eq!(Color::parse("800000FF").unwrap(), Color::new_argb(0x800000FF));
        assert_eq!(Color::parse("#800000FF").unwrap().alpha(), 0x80);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(Color::parse("Red").unwrap(), Color::new_rgb(0xFF0000));
        assert_eq!(Color::parse("WHITE").unwrap(), Color::white());
        assert_eq!(Color::parse("grey").unwrap(), Color::parse("gray").unwrap());

        let mut extra = BTreeMap::new();
        extra.insert("Brand".to_string(), Color::new_rgb(0x123456));
        assert_eq!(
            Color::parse_with_names("brand", &extra).unwrap(),
            Color::new_rgb(0x123456)
        );
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(Color::parse(""), Err(ColorParseError::Empty));
        assert!(Color::parse("FF00").is_err());
        assert!(Color::parse("GGGGGG").is_err());
        assert!(Color::parse("notacolor").is_err());
    }

    #[test]
    fn hex_renderings() {
        let c = Color::new_rgb(0xFF0000);
        assert_eq!(c.rgb_hex(), "FF0000");
        assert_eq!(c.argb_hex(), "FFFF0000");
        assert_eq!(c.to_string(), "#FFFF0000");

        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#FFFF0000\"");
        assert_eq!(serde_json::from_str::<Color>(&json).unwrap(), c);
    }
}
