use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Cell, CellAddress, CellContent, CellKey, CellRef, ConditionalFormatting, FormatError, Range,
    StyleId, EXCEL_MAX_COLS, EXCEL_MAX_ROWS,
};

/// Identifier for a worksheet within its workbook.
pub type WorksheetId = u32;

/// A worksheet: a sparse grid of cells plus its conditional formatting rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Worksheet {
    pub id: WorksheetId,
    pub name: String,
    #[serde(default)]
    cells: BTreeMap<CellKey, Cell>,
    #[serde(default)]
    pub conditional_formatting: ConditionalFormatting,
}

impl Worksheet {
    pub fn new(id: WorksheetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cells: BTreeMap::new(),
            conditional_formatting: ConditionalFormatting::default(),
        }
    }

    /// The stored record for `cell`, if any.
    pub fn cell(&self, cell: CellRef) -> Option<&Cell> {
        self.cells.get(&CellKey::try_from_ref(cell)?)
    }

    /// The cell at `cell`, synthesizing an empty default-styled cell for unwritten addresses.
    pub fn get_cell(&self, cell: CellRef) -> Cell {
        self.cell(cell).cloned().unwrap_or_default()
    }

    pub fn style_id(&self, cell: CellRef) -> StyleId {
        self.cell(cell).map(|c| c.style_id).unwrap_or_default()
    }

    /// Replace the content of `cell`, keeping its style.
    pub fn set_content(&mut self, cell: CellRef, content: CellContent) -> Result<(), FormatError> {
        self.update_cell(cell, |c| c.content = content)
    }

    /// Clear the content of `cell`. Its style survives.
    pub fn clear_content(&mut self, cell: CellRef) -> Result<(), FormatError> {
        self.update_cell(cell, |c| c.content = CellContent::Empty)
    }

    pub fn set_style_id(&mut self, cell: CellRef, style_id: StyleId) -> Result<(), FormatError> {
        self.update_cell(cell, |c| c.style_id = style_id)
    }

    fn update_cell(
        &mut self,
        cell: CellRef,
        f: impl FnOnce(&mut Cell),
    ) -> Result<(), FormatError> {
        let key = CellKey::from_ref(cell.to_cell_ref()?);
        let mut record = self.cells.remove(&key).unwrap_or_default();
        f(&mut record);
        if !record.is_truly_empty() {
            self.cells.insert(key, record);
        }
        Ok(())
    }

    /// Number of stored (non-trivial) cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Stored cells in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells.iter().map(|(k, c)| (k.to_ref(), c))
    }

    /// Smallest range covering every stored cell.
    pub fn used_range(&self) -> Option<Range> {
        let mut iter = self.cells.keys();
        let first = iter.next()?.to_ref();
        let (mut min_col, mut max_col) = (first.col, first.col);
        let mut max_row = first.row;
        for key in iter {
            min_col = min_col.min(key.col());
            max_col = max_col.max(key.col());
            max_row = max_row.max(key.row());
        }
        Some(Range::new(
            CellRef::new(first.row, min_col),
            CellRef::new(max_row, max_col),
        ))
    }

    /// Move every cell of `src` (content and style) so its top-left lands on `dest`.
    ///
    /// Vacated addresses end up empty with the default style; cells already at the destination
    /// are overwritten. Overlapping source and destination are handled.
    pub fn move_range(&mut self, src: Range, dest: CellRef) -> Result<(), FormatError> {
        let last_row = u64::from(dest.row) + u64::from(src.height()) - 1;
        let last_col = u64::from(dest.col) + u64::from(src.width()) - 1;
        if last_row >= u64::from(EXCEL_MAX_ROWS) || last_col >= u64::from(EXCEL_MAX_COLS) {
            return Err(FormatError::invalid_range(
                &src.to_string(),
                format!("moving to {dest} would leave the Excel grid"),
            ));
        }
        if src.start == dest {
            return Ok(());
        }

        let moved: Vec<(CellRef, Cell)> = self
            .cells
            .iter()
            .filter(|(k, _)| src.contains(k.to_ref()))
            .map(|(k, c)| (k.to_ref(), c.clone()))
            .collect();
        for (at, _) in &moved {
            self.cells.remove(&CellKey::from_ref(*at));
        }

        let dest_range = Range::new(
            dest,
            CellRef::new(last_row as u32, last_col as u32),
        );
        self.cells.retain(|k, _| !dest_range.contains(k.to_ref()));

        for (at, cell) in moved {
            let target = CellRef::new(
                dest.row + (at.row - src.start.row),
                dest.col + (at.col - src.start.col),
            );
            self.cells.insert(CellKey::from_ref(target), cell);
        }
        log::debug!(
            "moved {src} to {dest} on sheet {:?} ({} cells)",
            self.name,
            self.cells.len()
        );
        Ok(())
    }
}
