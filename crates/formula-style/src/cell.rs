use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{CellRef, FormatError, Range, StyleId, EXCEL_MAX_COLS, EXCEL_MAX_ROWS};

const COL_BITS: u32 = 14; // 2^14 = 16,384 columns.
const COL_MASK: u64 = (1u64 << COL_BITS) - 1;

/// Compact key used for sparse cell storage.
///
/// ```text
/// key = (row << 14) | col
/// ```
///
/// Keys order row-major, and stay within 34 bits so they survive a trip through a JavaScript
/// number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(transparent)]
pub struct CellKey(u64);

impl CellKey {
    /// Encode a `(row, col)` coordinate.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the Excel grid.
    #[inline]
    pub fn new(row: u32, col: u32) -> Self {
        assert!(row < EXCEL_MAX_ROWS, "row out of Excel bounds: {row}");
        assert!(col < EXCEL_MAX_COLS, "col out of Excel bounds: {col}");
        Self(((row as u64) << COL_BITS) | (col as u64))
    }

    /// Encode a `(row, col)` coordinate, or `None` outside the Excel grid.
    #[inline]
    pub fn try_new(row: u32, col: u32) -> Option<Self> {
        (row < EXCEL_MAX_ROWS && col < EXCEL_MAX_COLS)
            .then(|| Self(((row as u64) << COL_BITS) | (col as u64)))
    }

    #[inline]
    pub const fn row(self) -> u32 {
        (self.0 >> COL_BITS) as u32
    }

    #[inline]
    pub const fn col(self) -> u32 {
        (self.0 & COL_MASK) as u32
    }

    #[inline]
    pub const fn to_ref(self) -> CellRef {
        CellRef::new(self.row(), self.col())
    }

    #[inline]
    pub fn from_ref(cell: CellRef) -> Self {
        Self::new(cell.row, cell.col)
    }

    #[inline]
    pub fn try_from_ref(cell: CellRef) -> Option<Self> {
        Self::try_new(cell.row, cell.col)
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(deserializer)?;
        let row = raw >> COL_BITS;
        let col = raw & COL_MASK;
        if row >= EXCEL_MAX_ROWS as u64 || col >= EXCEL_MAX_COLS as u64 {
            return Err(D::Error::custom(format!(
                "cell key {raw} is outside the Excel grid"
            )));
        }
        Ok(CellKey(raw))
    }
}

impl From<CellRef> for CellKey {
    fn from(value: CellRef) -> Self {
        Self::from_ref(value)
    }
}

/// How a formula is stored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaKind {
    #[default]
    Normal,
    /// Shares its text with other cells through `shared_index`.
    Shared,
    /// Array (CSE) formula spilling over `ref_range`.
    Array,
}

/// Formula text plus its storage kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    /// Formula text without the leading `=`.
    pub expr: String,
    #[serde(default)]
    pub kind: FormulaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_range: Option<Range>,
}

impl Formula {
    /// A plain formula. A leading `=` is stripped.
    pub fn normal(expr: impl Into<String>) -> Self {
        Self {
            expr: strip_equals(expr.into()),
            kind: FormulaKind::Normal,
            shared_index: None,
            ref_range: None,
        }
    }

    pub fn shared(expr: impl Into<String>, shared_index: u32, ref_range: Option<Range>) -> Self {
        Self {
            expr: strip_equals(expr.into()),
            kind: FormulaKind::Shared,
            shared_index: Some(shared_index),
            ref_range,
        }
    }

    pub fn array(expr: impl Into<String>, ref_range: Range) -> Self {
        Self {
            expr: strip_equals(expr.into()),
            kind: FormulaKind::Array,
            shared_index: None,
            ref_range: Some(ref_range),
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        if self.expr.trim().is_empty() {
            return Err(FormatError::invalid_parameters("formula text cannot be empty"));
        }
        match self.kind {
            FormulaKind::Shared if self.shared_index.is_none() => Err(
                FormatError::invalid_parameters("shared formula needs a shared index"),
            ),
            FormulaKind::Array if self.ref_range.is_none() => Err(
                FormatError::invalid_parameters("array formula needs a reference range"),
            ),
            _ => Ok(()),
        }
    }
}

fn strip_equals(expr: String) -> String {
    match expr.strip_prefix('=') {
        Some(rest) => rest.to_string(),
        None => expr,
    }
}

/// What a cell holds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellContent {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    Formula(Formula),
}

impl CellContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        match self {
            CellContent::Number(n) if !n.is_finite() => Err(FormatError::invalid_parameters(
                "cell numbers must be finite",
            )),
            CellContent::Formula(f) => f.validate(),
            _ => Ok(()),
        }
    }
}

impl From<f64> for CellContent {
    fn from(value: f64) -> Self {
        CellContent::Number(value)
    }
}

impl From<bool> for CellContent {
    fn from(value: bool) -> Self {
        CellContent::Boolean(value)
    }
}

impl From<String> for CellContent {
    fn from(value: String) -> Self {
        CellContent::Text(value)
    }
}

impl From<&str> for CellContent {
    fn from(value: &str) -> Self {
        CellContent::Text(value.to_string())
    }
}

impl From<Formula> for CellContent {
    fn from(value: Formula) -> Self {
        CellContent::Formula(value)
    }
}

/// A single cell record.
///
/// Cells are stored sparsely: a cell with no content and the default style is not stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub content: CellContent,
    /// Composite style id in the workbook registry.
    #[serde(default)]
    pub style_id: StyleId,
}

impl Cell {
    pub fn new(content: CellContent) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// True if the cell has no content and the default style.
    pub fn is_truly_empty(&self) -> bool {
        self.content.is_empty() && self.style_id == StyleId::DEFAULT
    }
}
