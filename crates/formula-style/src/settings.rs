use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{Color, Font, FormatError};

/// Workbook-wide formatting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookSettings {
    /// Font of the default style; untouched cells report it.
    #[serde(default)]
    pub default_font: DefaultFont,
    /// Extra color names accepted by color setters, matched case-insensitively before the
    /// built-in names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named_colors: BTreeMap<String, Color>,
}

impl Default for WorkbookSettings {
    fn default() -> Self {
        Self {
            default_font: DefaultFont::default(),
            named_colors: BTreeMap::new(),
        }
    }
}

impl WorkbookSettings {
    #[must_use]
    pub fn with_named_color(mut self, name: impl Into<String>, color: Color) -> Self {
        self.named_colors.insert(name.into(), color);
        self
    }

    /// Resolve a color as accepted at the formatting API boundary.
    pub fn parse_color(&self, s: &str) -> Result<Color, FormatError> {
        Ok(Color::parse_with_names(s, &self.named_colors)?)
    }
}

/// Face and size of the default font (Excel: Calibri 11).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultFont {
    pub name: String,
    pub size: f64,
}

impl Default for DefaultFont {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: 11.0,
        }
    }
}

impl DefaultFont {
    pub fn to_font(&self) -> Font {
        Font {
            name: self.name.clone(),
            size: OrderedFloat(self.size),
            ..Font::default()
        }
    }
}
