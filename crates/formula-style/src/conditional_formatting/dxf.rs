use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::RuleHandle;
use crate::style::{BorderEdge, Underline};
use crate::Color;

/// A format-only overlay applied when a rule matches.
///
/// `None` fields leave the cell's own formatting alone. These records are separate from the
/// cell style registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifferentialFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<Underline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderEdge>,
}

impl DifferentialFormat {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn fill(color: Color) -> Self {
        Self {
            fill_color: Some(color),
            ..Self::default()
        }
    }

    pub fn font_color(color: Color) -> Self {
        Self {
            font_color: Some(color),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    #[must_use]
    pub fn with_font_color(mut self, color: Color) -> Self {
        self.font_color = Some(color);
        self
    }

    #[must_use]
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    #[must_use]
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    #[must_use]
    pub fn with_number_format(mut self, code: impl Into<String>) -> Self {
        self.number_format = Some(code.into());
        self
    }
}

/// Workbook-wide differential formats, deduplicated, plus which one each rule points at.
///
/// This is the shape a serializer needs: one shared `dxfs` list and a `dxfId` per rule.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DifferentialFormatTable {
    formats: Vec<DifferentialFormat>,
    index: HashMap<DifferentialFormat, u32>,
    by_rule: HashMap<RuleHandle, u32>,
}

impl DifferentialFormatTable {
    pub(crate) fn insert(&mut self, rule: RuleHandle, dxf: &DifferentialFormat) -> u32 {
        let id = match self.index.get(dxf) {
            Some(id) => *id,
            None => {
                let id = self.formats.len() as u32;
                self.formats.push(dxf.clone());
                self.index.insert(dxf.clone(), id);
                id
            }
        };
        self.by_rule.insert(rule, id);
        id
    }

    pub fn formats(&self) -> &[DifferentialFormat] {
        &self.formats
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// The `dxfId` of a rule; `None` for rules without a format (scales, bars, icon sets).
    pub fn dxf_id(&self, rule: RuleHandle) -> Option<u32> {
        self.by_rule.get(&rule).copied()
    }

    pub fn get(&self, dxf_id: u32) -> Option<&DifferentialFormat> {
        self.formats.get(dxf_id as usize)
    }
}
