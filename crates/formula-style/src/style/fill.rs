use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{Color, FormatError};

ooxml_token_enum! {
    /// `patternFill/@patternType`.
    pub enum FillPatternType {
        None => "none",
        Solid => "solid",
        MediumGray => "mediumGray" | "medium_gray",
        DarkGray => "darkGray" | "dark_gray",
        LightGray => "lightGray" | "light_gray",
        DarkHorizontal => "darkHorizontal" | "dark_horizontal",
        DarkVertical => "darkVertical" | "dark_vertical",
        DarkDown => "darkDown" | "dark_down",
        DarkUp => "darkUp" | "dark_up",
        DarkGrid => "darkGrid" | "dark_grid",
        DarkTrellis => "darkTrellis" | "dark_trellis",
        LightHorizontal => "lightHorizontal" | "light_horizontal",
        LightVertical => "lightVertical" | "light_vertical",
        LightDown => "lightDown" | "light_down",
        LightUp => "lightUp" | "light_up",
        LightGrid => "lightGrid" | "light_grid",
        LightTrellis => "lightTrellis" | "light_trellis",
        Gray125 => "gray125",
        Gray0625 => "gray0625",
    }
}

impl Default for FillPatternType {
    fn default() -> Self {
        FillPatternType::None
    }
}

/// Pattern fill. For `solid` fills the visible color is `fg_color`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternFill {
    #[serde(default)]
    pub pattern_type: FillPatternType,
    #[serde(default = "Color::black")]
    pub fg_color: Color,
    #[serde(default = "Color::white")]
    pub bg_color: Color,
}

impl Default for PatternFill {
    fn default() -> Self {
        Self {
            pattern_type: FillPatternType::None,
            fg_color: Color::black(),
            bg_color: Color::white(),
        }
    }
}

impl PatternFill {
    pub fn solid(color: Color) -> Self {
        Self {
            pattern_type: FillPatternType::Solid,
            fg_color: color,
            ..Self::default()
        }
    }
}

/// Geometry of a gradient fill.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradientKind {
    /// Linear gradient rotated by `degree`.
    Linear { degree: OrderedFloat<f64> },
    /// Path gradient; the edges are fractions of the cell (`0..=1`).
    Path {
        left: OrderedFloat<f64>,
        right: OrderedFloat<f64>,
        top: OrderedFloat<f64>,
        bottom: OrderedFloat<f64>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: OrderedFloat<f64>,
    pub color: Color,
}

impl GradientStop {
    pub fn new(position: f64, color: Color) -> Self {
        Self {
            position: OrderedFloat(position),
            color,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradientFill {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
}

impl GradientFill {
    /// A two-stop linear gradient from `from` to `to`.
    pub fn linear(degree: f64, from: Color, to: Color) -> Self {
        Self {
            kind: GradientKind::Linear {
                degree: OrderedFloat(degree),
            },
            stops: vec![GradientStop::new(0.0, from), GradientStop::new(1.0, to)],
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        if self.stops.len() < 2 {
            return Err(FormatError::invalid_parameters(
                "gradient fill needs at least two stops",
            ));
        }
        let mut prev = f64::NEG_INFINITY;
        for stop in &self.stops {
            let pos = stop.position.0;
            if !(0.0..=1.0).contains(&pos) {
                return Err(FormatError::invalid_parameters(format!(
                    "gradient stop position {pos} is outside 0..=1"
                )));
            }
            if pos < prev {
                return Err(FormatError::invalid_parameters(
                    "gradient stop positions must be ascending",
                ));
            }
            prev = pos;
        }
        match &self.kind {
            GradientKind::Linear { degree } if !degree.0.is_finite() => Err(
                FormatError::invalid_parameters("gradient degree must be finite"),
            ),
            GradientKind::Path {
                left,
                right,
                top,
                bottom,
            } => {
                for edge in [left, right, top, bottom] {
                    if !(0.0..=1.0).contains(&edge.0) {
                        return Err(FormatError::invalid_parameters(format!(
                            "gradient path edge {} is outside 0..=1",
                            edge.0
                        )));
                    }
                }
                Ok(())
            }
            GradientKind::Linear { .. } => Ok(()),
        }
    }
}

/// Fill facet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fill {
    Pattern(PatternFill),
    Gradient(GradientFill),
}

impl Default for Fill {
    fn default() -> Self {
        Fill::Pattern(PatternFill::default())
    }
}

impl Fill {
    pub fn solid(color: Color) -> Self {
        Fill::Pattern(PatternFill::solid(color))
    }

    pub fn pattern(&self) -> Option<&PatternFill> {
        match self {
            Fill::Pattern(p) => Some(p),
            Fill::Gradient(_) => None,
        }
    }

    /// Background color as a user sees it: the foreground of a solid fill, white otherwise.
    pub fn background_color(&self) -> Color {
        match self {
            Fill::Pattern(p) if p.pattern_type == FillPatternType::Solid => p.fg_color,
            _ => Color::white(),
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        match self {
            Fill::Pattern(_) => Ok(()),
            Fill::Gradient(g) => g.validate(),
        }
    }
}
