//! Cell style model: the five deduplicated facets and the composite style that ties them
//! together.

use core::fmt;

use serde::{Deserialize, Serialize};

mod alignment;
mod border;
mod fill;
mod font;
mod number_format;
mod patch;
mod registry;

pub use alignment::{
    Alignment, AlignmentProtection, HorizontalAlignment, Protection, TextRotation,
    VerticalAlignment, MAX_INDENT,
};
pub use border::{Border, BorderEdge, BorderSide, BorderStyle};
pub use fill::{Fill, FillPatternType, GradientFill, GradientKind, GradientStop, PatternFill};
pub use font::{Font, FontFamily, FontScheme, Underline, MAX_FONT_SIZE};
pub use number_format::{
    builtin_format_code, builtin_format_id, NumberFormatTable, FIRST_CUSTOM_NUM_FMT_ID,
    GENERAL_FORMAT,
};
pub use patch::{
    AlignmentPatch, BorderPatch, EdgePatch, FillPatch, FontPatch, ProtectionPatch, StylePatch,
};
pub use registry::StyleRegistry;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Debug,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// The registry's default record.
            pub const DEFAULT: Self = Self(0);
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Index into the registry's font table.
    FontId(u32)
);
define_id!(
    /// Index into the registry's fill table.
    FillId(u32)
);
define_id!(
    /// Index into the registry's border table.
    BorderId(u32)
);
define_id!(
    /// Number format id: `0..=49` are built-ins, `164..` are workbook-defined.
    NumFmtId(u16)
);
define_id!(
    /// Index into the registry's alignment+protection table.
    AlignmentId(u32)
);
define_id!(
    /// Index of a composite style. Cells store this; `StyleId(0)` is the default style.
    StyleId(u32)
);

/// Composite style record: one id per facet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellXf {
    #[serde(default)]
    pub font_id: FontId,
    #[serde(default)]
    pub fill_id: FillId,
    #[serde(default)]
    pub border_id: BorderId,
    #[serde(default)]
    pub num_fmt_id: NumFmtId,
    #[serde(default)]
    pub alignment_id: AlignmentId,
}

/// Fully expanded style, with every facet by value.
///
/// This is the form callers build and read; the registry stores it as a [`CellXf`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    #[serde(default)]
    pub font: Font,
    #[serde(default)]
    pub fill: Fill,
    #[serde(default)]
    pub border: Border,
    #[serde(default = "general_format")]
    pub number_format: String,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub protection: Protection,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font: Font::default(),
            fill: Fill::default(),
            border: Border::default(),
            number_format: general_format(),
            alignment: Alignment::default(),
            protection: Protection::default(),
        }
    }
}

fn general_format() -> String {
    GENERAL_FORMAT.to_string()
}
