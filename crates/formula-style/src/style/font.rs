use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{Color, FormatError};

/// Largest font size Excel accepts, in points.
pub const MAX_FONT_SIZE: f64 = 409.0;

ooxml_token_enum! {
    /// Underline variant (`<u val="...">`).
    pub enum Underline {
        None => "none",
        Single => "single",
        Double => "double",
        SingleAccounting => "singleAccounting" | "single_accounting",
        DoubleAccounting => "doubleAccounting" | "double_accounting",
    }
}

impl Default for Underline {
    fn default() -> Self {
        Underline::None
    }
}

ooxml_token_enum! {
    /// Font family class (`<family val="n">`).
    pub enum FontFamily {
        Auto => "auto",
        Roman => "roman",
        Swiss => "swiss",
        Modern => "modern",
        Script => "script",
        Decorative => "decorative",
    }
}

impl FontFamily {
    /// Numeric `family` attribute value.
    pub fn ooxml_value(self) -> u8 {
        match self {
            FontFamily::Auto => 0,
            FontFamily::Roman => 1,
            FontFamily::Swiss => 2,
            FontFamily::Modern => 3,
            FontFamily::Script => 4,
            FontFamily::Decorative => 5,
        }
    }

    pub fn from_ooxml_value(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        FontFamily::Auto
    }
}

ooxml_token_enum! {
    /// Theme font scheme a font belongs to (`<scheme val="...">`).
    pub enum FontScheme {
        None => "none",
        Minor => "minor",
        Major => "major",
    }
}

impl Default for FontScheme {
    fn default() -> Self {
        FontScheme::Minor
    }
}

/// Font facet.
///
/// Two fonts that compare equal share a single registry record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    pub name: String,
    /// Size in points.
    pub size: OrderedFloat<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: Underline,
    #[serde(default)]
    pub family: FontFamily,
    #[serde(default)]
    pub scheme: FontScheme,
    #[serde(default = "Color::black")]
    pub color: Color,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: OrderedFloat(11.0),
            bold: false,
            italic: false,
            strikethrough: false,
            underline: Underline::None,
            family: FontFamily::Auto,
            scheme: FontScheme::Minor,
            color: Color::black(),
        }
    }
}

impl Font {
    /// The default font with a different face and size.
    pub fn with_name_and_size(name: impl Into<String>, size: f64) -> Self {
        Self {
            name: name.into(),
            size: OrderedFloat(size),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        if self.name.trim().is_empty() {
            return Err(FormatError::invalid_parameters("font name cannot be empty"));
        }
        validate_font_size(self.size.0)
    }
}

pub(crate) fn validate_font_size(size: f64) -> Result<(), FormatError> {
    if !size.is_finite() || size <= 0.0 || size > MAX_FONT_SIZE {
        return Err(FormatError::invalid_parameters(format!(
            "font size must be in (0, {MAX_FONT_SIZE}], got {size}"
        )));
    }
    Ok(())
}

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underline_tokens_accept_aliases() {
        assert_eq!(
            "single_accounting".parse::<Underline>().unwrap(),
            Underline::SingleAccounting
        );
        assert_eq!(Underline::DoubleAccounting.as_ooxml(), "doubleAccounting");
        assert!("wavy".parse::<Underline>().is_err());
    }

    #[test]
    fn family_numbers_roundtrip() {
        for family in FontFamily::ALL {
            assert_eq!(
                FontFamily::from_ooxml_value(family.ooxml_value()),
                Some(*family)
            );
        }
        assert_eq!(FontFamily::from_ooxml_value(9), None);
    }

    #[test]
    fn size_bounds() {
        assert!(Font::with_name_and_size("Arial", 409.0).validate().is_ok());
        assert!(Font::with_name_and_size("Arial", 0.0).validate().is_err());
        assert!(Font::with_name_and_size("Arial", 410.0).validate().is_err());
        assert!(Font::with_name_and_size("Arial", f64::NAN).validate().is_err());
        assert!(Font::with_name_and_size(" ", 11.0).validate().is_err());
    }
}
