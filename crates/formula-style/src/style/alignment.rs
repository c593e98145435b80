use serde::{Deserialize, Serialize};

use super::font::is_false;
use crate::FormatError;

/// Largest indent level Excel accepts.
pub const MAX_INDENT: u8 = 250;

ooxml_token_enum! {
    pub enum HorizontalAlignment {
        General => "general",
        Left => "left",
        Center => "center",
        Right => "right",
        Fill => "fill",
        Justify => "justify",
        CenterContinuous => "centerContinuous" | "center_continuous" | "center_across_selection",
        Distributed => "distributed",
    }
}

impl Default for HorizontalAlignment {
    fn default() -> Self {
        HorizontalAlignment::General
    }
}

ooxml_token_enum! {
    pub enum VerticalAlignment {
        Top => "top",
        Center => "center" | "middle",
        Bottom => "bottom",
        Justify => "justify",
        Distributed => "distributed",
    }
}

impl Default for VerticalAlignment {
    fn default() -> Self {
        VerticalAlignment::Bottom
    }
}

/// Text orientation.
///
/// `Degrees` is accepted in `-90..=180`, where `91..=180` is SpreadsheetML's spelling of
/// `-1..=-90`. Registry records always hold the signed form (see [`TextRotation::canonical`]).
/// `Vertical` is stacked text, stored by SpreadsheetML as `textRotation="255"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRotation {
    Degrees(i16),
    Vertical,
}

impl Default for TextRotation {
    fn default() -> Self {
        TextRotation::Degrees(0)
    }
}

impl TextRotation {
    pub fn validate(self) -> Result<(), FormatError> {
        match self {
            TextRotation::Degrees(d) if !(-90..=180).contains(&d) => Err(
                FormatError::invalid_parameters(format!(
                    "text rotation must be in -90..=180 degrees, got {d}"
                )),
            ),
            _ => Ok(()),
        }
    }

    /// The signed form: `Degrees(91..=180)` becomes `Degrees(-1..=-90)`.
    pub fn canonical(self) -> Self {
        match self {
            TextRotation::Degrees(d) if (91..=180).contains(&d) => TextRotation::Degrees(90 - d),
            other => other,
        }
    }

    /// The `textRotation` attribute value.
    ///
    /// Negative angles use SpreadsheetML's encoding where `91..=180` means `-1..=-90`.
    pub fn to_ooxml(self) -> u8 {
        match self {
            TextRotation::Vertical => 255,
            TextRotation::Degrees(d) if d < 0 => (90 - d).clamp(91, 180) as u8,
            TextRotation::Degrees(d) => d.clamp(0, 180) as u8,
        }
    }

    pub fn from_ooxml(value: u8) -> Option<Self> {
        match value {
            255 => Some(TextRotation::Vertical),
            0..=90 => Some(TextRotation::Degrees(value as i16)),
            91..=180 => Some(TextRotation::Degrees(90 - value as i16)),
            _ => None,
        }
    }
}

/// Alignment half of the alignment+protection facet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(default)]
    pub horizontal: HorizontalAlignment,
    #[serde(default)]
    pub vertical: VerticalAlignment,
    #[serde(default, skip_serializing_if = "is_false")]
    pub wrap_text: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub shrink_to_fit: bool,
    #[serde(default)]
    pub rotation: TextRotation,
    #[serde(default)]
    pub indent: u8,
}

impl Alignment {
    pub fn validate(&self) -> Result<(), FormatError> {
        self.rotation.validate()?;
        validate_indent(self.indent)
    }
}

pub(crate) fn validate_indent(indent: u8) -> Result<(), FormatError> {
    if indent > MAX_INDENT {
        return Err(FormatError::invalid_parameters(format!(
            "indent must be at most {MAX_INDENT}, got {indent}"
        )));
    }
    Ok(())
}

/// Cell protection flags. They only take effect once the sheet is protected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Protection {
    #[serde(default = "crate::serde_defaults::default_true")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

/// The alignment+protection facet, deduplicated as one record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentProtection {
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub protection: Protection,
}

impl AlignmentProtection {
    pub fn validate(&self) -> Result<(), FormatError> {
        self.alignment.validate()
    }

    /// The record as stored by the registry, with the rotation in signed form.
    pub fn canonical(mut self) -> Self {
        self.alignment.rotation = self.alignment.rotation.canonical();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_ooxml_encoding() {
        assert_eq!(TextRotation::Degrees(45).to_ooxml(), 45);
        assert_eq!(TextRotation::Degrees(-45).to_ooxml(), 135);
        assert_eq!(TextRotation::Degrees(-90).to_ooxml(), 180);
        assert_eq!(TextRotation::Vertical.to_ooxml(), 255);
        assert_eq!(TextRotation::from_ooxml(255), Some(TextRotation::Vertical));
        assert_eq!(TextRotation::from_ooxml(135), Some(TextRotation::Degrees(-45)));
        assert_eq!(TextRotation::from_ooxml(200), None);
    }

    #[test]
    fn rotation_has_one_stored_form_per_ooxml_value() {
        for d in -90..=180 {
            let rotation = TextRotation::Degrees(d);
            let stored = rotation.canonical();
            assert_eq!(stored.to_ooxml(), rotation.to_ooxml(), "{d}");
            assert_eq!(TextRotation::from_ooxml(stored.to_ooxml()), Some(stored), "{d}");
            match stored {
                TextRotation::Degrees(s) => assert!((-90..=90).contains(&s), "{d} -> {s}"),
                TextRotation::Vertical => panic!("{d} became vertical"),
            }
        }
        assert_eq!(TextRotation::Degrees(120).canonical(), TextRotation::Degrees(-30));
        assert_eq!(TextRotation::Vertical.canonical(), TextRotation::Vertical);
    }

    #[test]
    fn rotation_and_indent_bounds() {
        assert!(TextRotation::Degrees(-90).validate().is_ok());
        assert!(TextRotation::Degrees(180).validate().is_ok());
        assert!(TextRotation::Degrees(181).validate().is_err());
        assert!(TextRotation::Degrees(-91).validate().is_err());
        assert!(validate_indent(250).is_ok());
        assert!(validate_indent(251).is_err());
    }

    #[test]
    fn defaults_match_excel() {
        let facet = AlignmentProtection::default();
        assert_eq!(facet.alignment.horizontal, HorizontalAlignment::General);
        assert_eq!(facet.alignment.vertical, VerticalAlignment::Bottom);
        assert!(facet.protection.locked);
        assert!(!facet.protection.hidden);
        assert_eq!(
            "middle".parse::<VerticalAlignment>().unwrap(),
            VerticalAlignment::Center
        );
    }

    #[test]
    fn locked_defaults_to_true_when_missing() {
        let p: Protection = serde_json::from_str("{}").unwrap();
        assert!(p.locked);
    }
}
