use serde::{Deserialize, Serialize};

use super::font::is_false;
use crate::Color;

ooxml_token_enum! {
    /// Border line style (`<left style="...">`).
    pub enum BorderStyle {
        None => "none",
        Thin => "thin",
        Medium => "medium",
        Dashed => "dashed",
        Dotted => "dotted",
        Thick => "thick",
        Double => "double",
        Hair => "hair",
        MediumDashed => "mediumDashed" | "medium_dashed",
        DashDot => "dashDot" | "dash_dot",
        MediumDashDot => "mediumDashDot" | "medium_dash_dot",
        DashDotDot => "dashDotDot" | "dash_dot_dot",
        MediumDashDotDot => "mediumDashDotDot" | "medium_dash_dot_dot",
        SlantDashDot => "slantDashDot" | "slant_dash_dot",
    }
}

impl Default for BorderStyle {
    fn default() -> Self {
        BorderStyle::None
    }
}

ooxml_token_enum! {
    /// Which edge of a cell a border operation targets.
    ///
    /// `All` is only meaningful when setting: it updates top, bottom, left and right together.
    pub enum BorderSide {
        Top => "top",
        Bottom => "bottom",
        Left => "left",
        Right => "right",
        Diagonal => "diagonal",
        All => "all",
    }
}

impl BorderSide {
    /// The concrete edges this side expands to.
    pub fn edges(self) -> &'static [BorderSide] {
        match self {
            BorderSide::All => &[
                BorderSide::Top,
                BorderSide::Bottom,
                BorderSide::Left,
                BorderSide::Right,
            ],
            BorderSide::Top => &[BorderSide::Top],
            BorderSide::Bottom => &[BorderSide::Bottom],
            BorderSide::Left => &[BorderSide::Left],
            BorderSide::Right => &[BorderSide::Right],
            BorderSide::Diagonal => &[BorderSide::Diagonal],
        }
    }
}

/// One edge of a border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderEdge {
    #[serde(default)]
    pub style: BorderStyle,
    #[serde(default = "Color::black")]
    pub color: Color,
}

impl Default for BorderEdge {
    fn default() -> Self {
        Self {
            style: BorderStyle::None,
            color: Color::black(),
        }
    }
}

impl BorderEdge {
    pub fn new(style: BorderStyle, color: Color) -> Self {
        Self { style, color }
    }
}

/// Border facet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Border {
    #[serde(default)]
    pub left: BorderEdge,
    #[serde(default)]
    pub right: BorderEdge,
    #[serde(default)]
    pub top: BorderEdge,
    #[serde(default)]
    pub bottom: BorderEdge,
    #[serde(default)]
    pub diagonal: BorderEdge,
    #[serde(default, skip_serializing_if = "is_false")]
    pub diagonal_up: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub diagonal_down: bool,
}

impl Border {
    /// The edge for a concrete side. `All` has no single edge and yields `None`.
    pub fn edge(&self, side: BorderSide) -> Option<&BorderEdge> {
        match side {
            BorderSide::Top => Some(&self.top),
            BorderSide::Bottom => Some(&self.bottom),
            BorderSide::Left => Some(&self.left),
            BorderSide::Right => Some(&self.right),
            BorderSide::Diagonal => Some(&self.diagonal),
            BorderSide::All => None,
        }
    }

    pub fn edge_mut(&mut self, side: BorderSide) -> Option<&mut BorderEdge> {
        match side {
            BorderSide::Top => Some(&mut self.top),
            BorderSide::Bottom => Some(&mut self.bottom),
            BorderSide::Left => Some(&mut self.left),
            BorderSide::Right => Some(&mut self.right),
            BorderSide::Diagonal => Some(&mut self.diagonal),
            BorderSide::All => None,
        }
    }

    /// A border with the same edge on top, bottom, left and right.
    pub fn outline(edge: BorderEdge) -> Self {
        Self {
            left: edge,
            right: edge,
            top: edge,
            bottom: edge,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_expands_to_the_four_outer_edges() {
        let edges = BorderSide::All.edges();
        assert_eq!(edges.len(), 4);
        assert!(!edges.contains(&BorderSide::Diagonal));
        assert_eq!(BorderSide::Left.edges(), &[BorderSide::Left]);
    }

    #[test]
    fn outline_sets_every_side() {
        let edge = BorderEdge::new(BorderStyle::Thick, Color::new_rgb(0x0000FF));
        let border = Border::outline(edge);
        for side in BorderSide::All.edges() {
            assert_eq!(border.edge(*side), Some(&edge));
        }
        assert_eq!(border.diagonal, BorderEdge::default());
        assert_eq!(border.edge(BorderSide::All), None);
    }

    #[test]
    fn style_tokens() {
        assert_eq!(
            "medium_dash_dot".parse::<BorderStyle>().unwrap(),
            BorderStyle::MediumDashDot
        );
        assert_eq!(BorderStyle::SlantDashDot.as_ooxml(), "slantDashDot");
    }
}
