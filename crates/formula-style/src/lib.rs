//! `formula-style` is the cell formatting core of a spreadsheet document.
//!
//! It owns:
//! - the style registry, which stores every font, fill, border, number format and
//!   alignment+protection record once and hands out composite [`StyleId`]s
//! - the per-attribute formatting accessors on [`Workbook`], which report Excel's defaults for
//!   cells that were never formatted
//! - conditional formatting rules, validated on entry and kept in priority order
//!
//! Everything is `serde`-serializable so documents round-trip through JSON.

#[macro_use]
mod macros;

mod address;
mod cell;
mod color;
pub mod conditional_formatting;
mod error;
mod format;
mod serde_defaults;
mod settings;
mod shared;
mod sheet_name;
mod style;
mod workbook;
mod worksheet;

pub use address::{
    format_sqref, parse_sqref_for_sheet, A1ParseError, CellAddress, CellRef, Range, RangeIter,
    RangeParseError, SheetRange, EXCEL_MAX_COLS, EXCEL_MAX_ROWS,
};
pub use cell::{Cell, CellContent, CellKey, Formula, FormulaKind};
pub use color::{Color, ColorParseError};
pub use conditional_formatting::*;
pub use error::FormatError;
pub use settings::{DefaultFont, WorkbookSettings};
pub use shared::SharedWorkbook;
pub use sheet_name::{
    sheet_name_casefold, sheet_name_eq_case_insensitive, validate_sheet_name, SheetNameError,
    EXCEL_MAX_SHEET_NAME_LEN,
};
pub use style::*;
pub use workbook::Workbook;
pub use worksheet::{Worksheet, WorksheetId};

/// Current serialization schema version.
///
/// This is embedded into [`Workbook`]; documents written by a newer version are rejected.
pub const SCHEMA_VERSION: u32 = 1;

fn new_uuid() -> uuid::Uuid {
    #[cfg(not(target_arch = "wasm32"))]
    {
        uuid::Uuid::new_v4()
    }

    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::atomic::{AtomicU64, Ordering};

        static COUNTER: AtomicU64 = AtomicU64::new(1);
        uuid::Uuid::from_u128(COUNTER.fetch_add(1, Ordering::Relaxed) as u128)
    }
}
