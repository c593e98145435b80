use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::{
    Alignment, Border, BorderSide, BorderStyle, Fill, FillPatternType, Font, FontFamily,
    FontScheme, GradientFill, HorizontalAlignment, PatternFill, Protection, TextRotation,
    Underline, VerticalAlignment,
};
use crate::Color;

/// A partial style update.
///
/// Absent fields (`None`) mean "keep the current value". Applying a patch never mutates an
/// existing registry record; the registry resolves a new composite instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePatch {
    #[serde(default)]
    pub font: FontPatch,
    #[serde(default)]
    pub fill: FillPatch,
    #[serde(default)]
    pub border: BorderPatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(default)]
    pub alignment: AlignmentPatch,
    #[serde(default)]
    pub protection: ProtectionPatch,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        self.font.is_empty()
            && self.fill.is_empty()
            && self.border.is_empty()
            && self.number_format.is_none()
            && self.alignment.is_empty()
            && self.protection.is_empty()
    }

    pub fn font(font: FontPatch) -> Self {
        Self {
            font,
            ..Self::default()
        }
    }

    pub fn fill(fill: FillPatch) -> Self {
        Self {
            fill,
            ..Self::default()
        }
    }

    pub fn alignment(alignment: AlignmentPatch) -> Self {
        Self {
            alignment,
            ..Self::default()
        }
    }

    pub fn protection(protection: ProtectionPatch) -> Self {
        Self {
            protection,
            ..Self::default()
        }
    }

    pub fn number_format(code: impl Into<String>) -> Self {
        Self {
            number_format: Some(code.into()),
            ..Self::default()
        }
    }

    /// Update one side (or, with [`BorderSide::All`], the four outer sides) of the border.
    pub fn border_edge(side: BorderSide, edge: EdgePatch) -> Self {
        let mut border = BorderPatch::default();
        border.set(side, edge);
        Self {
            border,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<Underline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<FontFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<FontScheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl FontPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The patched font, or `None` when the patch does not touch fonts.
    pub fn apply(&self, base: &Font) -> Option<Font> {
        if self.is_empty() {
            return None;
        }
        let mut font = base.clone();
        if let Some(name) = &self.name {
            font.name = name.clone();
        }
        if let Some(size) = self.size {
            font.size = OrderedFloat(size);
        }
        if let Some(v) = self.bold {
            font.bold = v;
        }
        if let Some(v) = self.italic {
            font.italic = v;
        }
        if let Some(v) = self.strikethrough {
            font.strikethrough = v;
        }
        if let Some(v) = self.underline {
            font.underline = v;
        }
        if let Some(v) = self.family {
            font.family = v;
        }
        if let Some(v) = self.scheme {
            font.scheme = v;
        }
        if let Some(v) = self.color {
            font.color = v;
        }
        Some(font)
    }
}

/// Fill update. A gradient replaces the fill outright; pattern fields overlay the current
/// pattern fill (starting from an empty pattern when the current fill is a gradient).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<FillPatternType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<GradientFill>,
}

impl FillPatch {
    /// A solid background in `color`.
    pub fn solid(color: Color) -> Self {
        Self {
            pattern_type: Some(FillPatternType::Solid),
            fg_color: Some(color),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, base: &Fill) -> Option<Fill> {
        if let Some(gradient) = &self.gradient {
            return Some(Fill::Gradient(gradient.clone()));
        }
        if self.is_empty() {
            return None;
        }
        let mut pattern = base.pattern().cloned().unwrap_or_else(PatternFill::default);
        if let Some(v) = self.pattern_type {
            pattern.pattern_type = v;
        }
        if let Some(v) = self.fg_color {
            pattern.fg_color = v;
        }
        if let Some(v) = self.bg_color {
            pattern.bg_color = v;
        }
        Some(Fill::Pattern(pattern))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<BorderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl EdgePatch {
    pub fn style(style: BorderStyle) -> Self {
        Self {
            style: Some(style),
            color: None,
        }
    }

    pub fn color(color: Color) -> Self {
        Self {
            style: None,
            color: Some(color),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<EdgePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<EdgePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<EdgePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<EdgePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagonal: Option<EdgePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagonal_up: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagonal_down: Option<bool>,
}

impl BorderPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn set(&mut self, side: BorderSide, edge: EdgePatch) {
        for side in side.edges() {
            let slot = match side {
                BorderSide::Top => &mut self.top,
                BorderSide::Bottom => &mut self.bottom,
                BorderSide::Left => &mut self.left,
                BorderSide::Right => &mut self.right,
                BorderSide::Diagonal => &mut self.diagonal,
                BorderSide::All => continue,
            };
            *slot = Some(edge);
        }
    }

    pub fn apply(&self, base: &Border) -> Option<Border> {
        if self.is_empty() {
            return None;
        }
        let mut border = base.clone();
        for (patch, edge) in [
            (&self.left, &mut border.left),
            (&self.right, &mut border.right),
            (&self.top, &mut border.top),
            (&self.bottom, &mut border.bottom),
            (&self.diagonal, &mut border.diagonal),
        ] {
            let Some(patch) = patch else {
                continue;
            };
            if let Some(style) = patch.style {
                edge.style = style;
            }
            if let Some(color) = patch.color {
                edge.color = color;
            }
        }
        if let Some(v) = self.diagonal_up {
            border.diagonal_up = v;
        }
        if let Some(v) = self.diagonal_down {
            border.diagonal_down = v;
        }
        Some(border)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrink_to_fit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<TextRotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<u8>,
}

impl AlignmentPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, base: &Alignment) -> Option<Alignment> {
        if self.is_empty() {
            return None;
        }
        let mut alignment = base.clone();
        if let Some(v) = self.horizontal {
            alignment.horizontal = v;
        }
        if let Some(v) = self.vertical {
            alignment.vertical = v;
        }
        if let Some(v) = self.wrap_text {
            alignment.wrap_text = v;
        }
        if let Some(v) = self.shrink_to_fit {
            alignment.shrink_to_fit = v;
        }
        if let Some(v) = self.rotation {
            alignment.rotation = v;
        }
        if let Some(v) = self.indent {
            alignment.indent = v;
        }
        Some(alignment)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl ProtectionPatch {
    pub fn is_empty(&self) -> bool {
        self.locked.is_none() && self.hidden.is_none()
    }

    pub fn apply(&self, base: &Protection) -> Option<Protection> {
        if self.is_empty() {
            return None;
        }
        Some(Protection {
            locked: self.locked.unwrap_or(base.locked),
            hidden: self.hidden.unwrap_or(base.hidden),
        })
    }
}
