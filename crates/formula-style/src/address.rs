use core::fmt;

use serde::{Deserialize, Serialize};

use crate::FormatError;

/// Excel-compatible maximum rows per worksheet (1,048,576).
pub const EXCEL_MAX_ROWS: u32 = 1_048_576;

/// Excel-compatible maximum columns per worksheet (16,384).
pub const EXCEL_MAX_COLS: u32 = 16_384;

/// A reference to a single cell within a worksheet.
///
/// Rows and columns are **0-indexed**:
/// - `row = 0` is Excel row `1`
/// - `col = 0` is Excel column `A`
///
/// Use [`CellRef::from_excel`] / [`CellRef::excel_row`] / [`CellRef::excel_col`] when working
/// with the 1-based coordinates shown in the Excel UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    /// 0-indexed row.
    pub row: u32,
    /// 0-indexed column.
    pub col: u32,
}

impl CellRef {
    /// Construct a new [`CellRef`].
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Construct from 1-based Excel coordinates (`from_excel(1, 1)` is `A1`).
    pub fn from_excel(row: u32, col: u32) -> Result<Self, A1ParseError> {
        if row == 0 || row > EXCEL_MAX_ROWS {
            return Err(A1ParseError::InvalidRow);
        }
        if col == 0 || col > EXCEL_MAX_COLS {
            return Err(A1ParseError::InvalidColumn);
        }
        Ok(Self::new(row - 1, col - 1))
    }

    /// 1-based row number as displayed by Excel.
    #[inline]
    pub const fn excel_row(self) -> u32 {
        self.row + 1
    }

    /// 1-based column number as displayed by Excel.
    #[inline]
    pub const fn excel_col(self) -> u32 {
        self.col + 1
    }

    /// Convert to Excel A1 notation (e.g. `A1`, `BC32`).
    pub fn to_a1(self) -> String {
        format!("{}{}", col_to_name(self.col), self.row + 1)
    }

    /// Parse an Excel A1-style reference (e.g. `A1`, `$B$2`).
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }

        // Accept optional `$` markers.
        let mut idx = 0usize;
        let bytes = s.as_bytes();
        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let col_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
            idx += 1;
        }

        if idx == col_start {
            return Err(A1ParseError::MissingColumn);
        }

        let col_str = &s[col_start..idx];
        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }

        if idx == row_start {
            return Err(A1ParseError::MissingRow);
        }
        if idx != bytes.len() {
            return Err(A1ParseError::TrailingCharacters);
        }

        let col = name_to_col(col_str)?;
        if col >= EXCEL_MAX_COLS {
            return Err(A1ParseError::InvalidColumn);
        }
        let row_1_based: u32 = s[row_start..idx]
            .parse()
            .map_err(|_| A1ParseError::InvalidRow)?;
        if row_1_based == 0 || row_1_based > EXCEL_MAX_ROWS {
            return Err(A1ParseError::InvalidRow);
        }

        Ok(Self {
            row: row_1_based - 1,
            col,
        })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Anything that can name a single cell: a [`CellRef`] or an A1 string.
///
/// Formatting accessors are generic over this so callers can pass `"B2"` directly.
pub trait CellAddress {
    fn to_cell_ref(&self) -> Result<CellRef, FormatError>;
}

impl CellAddress for CellRef {
    fn to_cell_ref(&self) -> Result<CellRef, FormatError> {
        if self.row >= EXCEL_MAX_ROWS || self.col >= EXCEL_MAX_COLS {
            return Err(FormatError::invalid_range(
                &format!("R{}C{}", self.excel_row(), self.excel_col()),
                "cell lies outside the Excel grid",
            ));
        }
        Ok(*self)
    }
}

impl CellAddress for &str {
    fn to_cell_ref(&self) -> Result<CellRef, FormatError> {
        CellRef::from_a1(self).map_err(|err| FormatError::invalid_range(self, err))
    }
}

impl CellAddress for String {
    fn to_cell_ref(&self) -> Result<CellRef, FormatError> {
        self.as_str().to_cell_ref()
    }
}

/// A rectangular region within a worksheet.
///
/// The range is inclusive and always normalized such that:
/// - `start.row <= end.row`
/// - `start.col <= end.col`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: CellRef,
    pub end: CellRef,
}

impl Range {
    /// Construct a new range, normalizing coordinates if needed.
    pub const fn new(a: CellRef, b: CellRef) -> Self {
        let start_row = if a.row <= b.row { a.row } else { b.row };
        let end_row = if a.row <= b.row { b.row } else { a.row };
        let start_col = if a.col <= b.col { a.col } else { b.col };
        let end_col = if a.col <= b.col { b.col } else { a.col };
        Self {
            start: CellRef::new(start_row, start_col),
            end: CellRef::new(end_row, end_col),
        }
    }

    /// Returns true if `cell` lies within this range.
    #[inline]
    pub const fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    /// Returns true if `other` lies entirely within this range.
    #[inline]
    pub const fn contains_range(&self, other: &Range) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    /// Returns true if the two ranges share at least one cell.
    #[inline]
    pub const fn intersects(&self, other: &Range) -> bool {
        self.start.row <= other.end.row
            && self.end.row >= other.start.row
            && self.start.col <= other.end.col
            && self.end.col >= other.start.col
    }

    /// The overlapping region of two ranges, if any.
    pub fn intersection(&self, other: &Range) -> Option<Range> {
        if !self.intersects(other) {
            return None;
        }
        Some(Range {
            start: CellRef::new(
                self.start.row.max(other.start.row),
                self.start.col.max(other.start.col),
            ),
            end: CellRef::new(
                self.end.row.min(other.end.row),
                self.end.col.min(other.end.col),
            ),
        })
    }

    /// Number of columns in the range.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Number of rows in the range.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Returns true if the range is exactly one cell.
    #[inline]
    pub const fn is_single_cell(&self) -> bool {
        self.start.row == self.end.row && self.start.col == self.end.col
    }

    /// Iterate the cells of the range in row-major order.
    pub fn iter(&self) -> RangeIter {
        RangeIter {
            range: *self,
            cur: Some(self.start),
        }
    }

    /// Parse an Excel A1-style range like `A1:B2` or a single-cell reference like `C3`.
    ///
    /// Sheet prefixes are not accepted here; see [`SheetRange::parse`].
    pub fn from_a1(a1: &str) -> Result<Self, RangeParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(RangeParseError::Empty);
        }

        match s.split_once(':') {
            None => {
                let cell = CellRef::from_a1(s).map_err(RangeParseError::Cell)?;
                Ok(Range::new(cell, cell))
            }
            Some((a, b)) => {
                let start = CellRef::from_a1(a).map_err(RangeParseError::Cell)?;
                let end = CellRef::from_a1(b).map_err(RangeParseError::Cell)?;
                Ok(Range::new(start, end))
            }
        }
    }
}

impl From<CellRef> for Range {
    fn from(cell: CellRef) -> Self {
        Range::new(cell, cell)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Row-major iterator over the cells of a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    cur: Option<CellRef>,
}

impl Iterator for RangeIter {
    type Item = CellRef;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.cur?;
        self.cur = if out.col < self.range.end.col {
            Some(CellRef::new(out.row, out.col + 1))
        } else if out.row < self.range.end.row {
            Some(CellRef::new(out.row + 1, self.range.start.col))
        } else {
            None
        };
        Some(out)
    }
}

/// A range optionally qualified by a sheet name (`Sheet1!A1:B2`, `'My Sheet'!C3`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: Option<String>,
    pub range: Range,
}

impl SheetRange {
    /// Parse a possibly sheet-qualified A1 range.
    ///
    /// Both endpoints may carry a prefix (`Sheet1!A1:Sheet1!B2`), but they must name the same
    /// sheet.
    pub fn parse(s: &str) -> Result<Self, RangeParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RangeParseError::Empty);
        }

        let (lhs, rhs) = match find_unquoted(s, |c| c == ':') {
            Some(colon) => (&s[..colon], Some(&s[colon + 1..])),
            None => (s, None),
        };

        let (sheet, lhs_ref) = split_sheet_prefix(lhs)?;
        let start = CellRef::from_a1(lhs_ref).map_err(RangeParseError::Cell)?;
        let end = match rhs {
            None => start,
            Some(rhs) => {
                let (rhs_sheet, rhs_ref) = split_sheet_prefix(rhs)?;
                if let Some(rhs_sheet) = rhs_sheet {
                    let same = sheet.as_deref().is_some_and(|lhs_sheet| {
                        crate::sheet_name::sheet_name_eq_case_insensitive(lhs_sheet, &rhs_sheet)
                    });
                    if !same {
                        return Err(RangeParseError::CrossSheet);
                    }
                }
                CellRef::from_a1(rhs_ref).map_err(RangeParseError::Cell)?
            }
        };

        Ok(Self {
            sheet,
            range: Range::new(start, end),
        })
    }
}

/// Byte offset of the first char matching `pred` that is not inside a quoted sheet name.
///
/// A doubled `''` inside quotes toggles twice, so escaped apostrophes need no special case.
fn find_unquoted(s: &str, pred: impl Fn(char) -> bool) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        if c == '\'' {
            quoted = !quoted;
        } else if !quoted && pred(c) {
            return Some(i);
        }
    }
    None
}

/// Split one endpoint (`Sheet1!A1`, `'My Sheet'!$B$2`, `C3`) into its sheet and cell parts.
fn split_sheet_prefix(s: &str) -> Result<(Option<String>, &str), RangeParseError> {
    let Some(bang) = s.rfind('!') else {
        return Ok((None, s));
    };
    let (raw_sheet, rest) = (&s[..bang], &s[bang + 1..]);
    let sheet = if let Some(quoted) = raw_sheet.strip_prefix('\'') {
        let inner = quoted
            .strip_suffix('\'')
            .ok_or(RangeParseError::InvalidSheetPrefix)?;
        inner.replace("''", "'")
    } else {
        raw_sheet.to_string()
    };
    if sheet.is_empty() {
        return Err(RangeParseError::InvalidSheetPrefix);
    }
    Ok((Some(sheet), rest))
}

/// Parse a SpreadsheetML `sqref`-style list (`A1`, `A1:B2`, `A1 A3:B7`, `A1:B2,D4`).
///
/// Every entry must resolve to `sheet` when it carries a sheet prefix. An empty list is an
/// error: a rule or selection always covers at least one cell.
pub fn parse_sqref_for_sheet(sqref: &str, sheet: &str) -> Result<Vec<Range>, RangeParseError> {
    let mut out = Vec::new();
    let mut rest = sqref;
    while !rest.is_empty() {
        let (token, tail) = match find_unquoted(rest, |c| c == ',' || c.is_whitespace()) {
            Some(sep) => {
                let width = rest[sep..].chars().next().map_or(1, char::len_utf8);
                (&rest[..sep], &rest[sep + width..])
            }
            None => (rest, ""),
        };
        rest = tail;
        if token.is_empty() {
            continue;
        }
        let parsed = SheetRange::parse(token)?;
        if let Some(prefix) = parsed.sheet.as_deref() {
            if !crate::sheet_name::sheet_name_eq_case_insensitive(prefix, sheet) {
                return Err(RangeParseError::CrossSheet);
            }
        }
        out.push(parsed.range);
    }
    if out.is_empty() {
        return Err(RangeParseError::Empty);
    }
    Ok(out)
}

/// Format a list of ranges as a space-separated `sqref` string.
pub fn format_sqref(ranges: &[Range]) -> String {
    ranges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Errors that can occur when parsing an A1 cell reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum A1ParseError {
    Empty,
    MissingColumn,
    MissingRow,
    InvalidColumn,
    InvalidRow,
    TrailingCharacters,
}

impl fmt::Display for A1ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            A1ParseError::Empty => "empty A1 reference",
            A1ParseError::MissingColumn => "missing column in A1 reference",
            A1ParseError::MissingRow => "missing row in A1 reference",
            A1ParseError::InvalidColumn => "invalid column in A1 reference",
            A1ParseError::InvalidRow => "invalid row in A1 reference",
            A1ParseError::TrailingCharacters => "trailing characters in A1 reference",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for A1ParseError {}

/// Errors that can occur when parsing an A1 range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeParseError {
    Empty,
    Cell(A1ParseError),
    InvalidSheetPrefix,
    CrossSheet,
}

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeParseError::Empty => f.write_str("empty A1 range"),
            RangeParseError::Cell(e) => write!(f, "invalid cell reference in range: {e}"),
            RangeParseError::InvalidSheetPrefix => f.write_str("malformed sheet prefix in range"),
            RangeParseError::CrossSheet => f.write_str("range spans more than one sheet"),
        }
    }
}

impl std::error::Error for RangeParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RangeParseError::Cell(e) => Some(e),
            _ => None,
        }
    }
}

fn col_to_name(col: u32) -> String {
    // Excel columns are 1-based in A1 notation. We store 0-based internally.
    let mut n = col + 1;
    let mut out = Vec::<u8>::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

fn name_to_col(s: &str) -> Result<u32, A1ParseError> {
    let mut col: u32 = 0;
    for b in s.bytes() {
        if !b.is_ascii_alphabetic() {
            return Err(A1ParseError::InvalidColumn);
        }
        let v = (b.to_ascii_uppercase() - b'A') as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(v))
            .ok_or(A1ParseError::InvalidColumn)?;
    }
    if col == 0 {
        return Err(A1ParseError::InvalidColumn);
    }
    Ok(col - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_roundtrip() {
        let c = CellRef::new(0, 0);
        assert_eq!(c.to_a1(), "A1");
        assert_eq!(CellRef::from_a1("A1").unwrap(), c);
        assert_eq!(CellRef::from_a1("$A$1").unwrap(), c);

        let c2 = CellRef::new(31, 54); // BC32
        assert_eq!(c2.to_a1(), "BC32");
        assert_eq!(CellRef::from_a1("bc32").unwrap(), c2);
        assert_eq!(c2.excel_row(), 32);
        assert_eq!(c2.excel_col(), 55);
        assert_eq!(CellRef::from_excel(32, 55).unwrap(), c2);
    }

    #[test]
    fn one_based_constructor_rejects_zero() {
        assert_eq!(CellRef::from_excel(0, 1), Err(A1ParseError::InvalidRow));
        assert_eq!(CellRef::from_excel(1, 0), Err(A1ParseError::InvalidColumn));
    }

    #[test]
    fn a1_range_parsing_normalizes() {
        let r = Range::from_a1("B2:A1").unwrap();
        assert_eq!(r.start, CellRef::new(0, 0));
        assert_eq!(r.end, CellRef::new(1, 1));

        let single = Range::from_a1("C3").unwrap();
        assert!(single.is_single_cell());
        assert_eq!(single.start, CellRef::new(2, 2));
    }

    #[test]
    fn a1_bounds_are_excel_compatible() {
        assert!(CellRef::from_a1("XFD1048576").is_ok());
        assert!(CellRef::from_a1("XFE1").is_err());
        assert!(CellRef::from_a1("A1048577").is_err());
        assert!(CellRef::from_a1("A0").is_err());
    }

    #[test]
    fn sheet_prefixes() {
        let r = SheetRange::parse("'My ''Data'''!A1:$B$2").unwrap();
        assert_eq!(r.sheet.as_deref(), Some("My 'Data'"));
        assert_eq!(r.range, Range::from_a1("A1:B2").unwrap());

        assert_eq!(
            SheetRange::parse("Sheet1!A1:Sheet2!B2"),
            Err(RangeParseError::CrossSheet)
        );
        let same = SheetRange::parse("Sheet1!A1:Sheet1!B2").unwrap();
        assert_eq!(same.sheet.as_deref(), Some("Sheet1"));
        assert_eq!(same.range, Range::from_a1("A1:B2").unwrap());

        let quoted = SheetRange::parse("'Q1 !Plan'!C3:'Q1 !Plan'!D4").unwrap();
        assert_eq!(quoted.sheet.as_deref(), Some("Q1 !Plan"));
        assert_eq!(quoted.range, Range::from_a1("C3:D4").unwrap());

        assert_eq!(
            SheetRange::parse("A1:Sheet1!B2"),
            Err(RangeParseError::CrossSheet)
        );
        assert_eq!(
            SheetRange::parse("!A1"),
            Err(RangeParseError::InvalidSheetPrefix)
        );
    }

    #[test]
    fn sqref_lists() {
        let ranges = parse_sqref_for_sheet("A1:B2 D4,Sheet1!E5", "sheet1").unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(format_sqref(&ranges), "A1:B2 D4 E5");

        assert_eq!(
            parse_sqref_for_sheet("Other!A1", "Sheet1"),
            Err(RangeParseError::CrossSheet)
        );
        assert_eq!(
            parse_sqref_for_sheet("Sheet1!A1:sheet1!B2", "Sheet1"),
            Ok(vec![Range::from_a1("A1:B2").unwrap()])
        );
        assert_eq!(
            parse_sqref_for_sheet("'My Sheet'!A1:'My Sheet'!B2,'My Sheet'!D4", "my sheet"),
            Ok(vec![
                Range::from_a1("A1:B2").unwrap(),
                Range::from_a1("D4").unwrap()
            ])
        );
        assert_eq!(
            parse_sqref_for_sheet("  ", "Sheet1"),
            Err(RangeParseError::Empty)
        );
    }

    #[test]
    fn range_iteration_and_intersection() {
        let r = Range::from_a1("A1:B2").unwrap();
        let cells: Vec<String> = r.iter().map(CellRef::to_a1).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);

        let other = Range::from_a1("B2:C3").unwrap();
        assert!(r.intersects(&other));
        assert_eq!(r.intersection(&other), Some(Range::from_a1("B2").unwrap()));
        assert_eq!(r.intersection(&Range::from_a1("D4").unwrap()), None);
        assert!(Range::from_a1("A1:D4").unwrap().contains_range(&r));
    }
}
