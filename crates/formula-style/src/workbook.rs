use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::sheet_name::{sheet_name_eq_case_insensitive, validate_sheet_name};
use crate::{
    Cell, CellAddress, CellContent, Color, FormatError, Range, Style, StyleId, StyleRegistry,
    WorkbookSettings, Worksheet, WorksheetId,
};

fn default_schema_version() -> u32 {
    crate::SCHEMA_VERSION
}

/// A workbook: worksheets plus the shared style registry they reference.
///
/// Sheets are addressed by name, compared case-insensitively.
#[derive(Clone, Debug, Serialize)]
pub struct Workbook {
    /// Serialization schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    sheets: Vec<Worksheet>,
    pub(crate) styles: StyleRegistry,
    settings: WorkbookSettings,
    /// Next worksheet id to allocate (runtime-only).
    #[serde(skip)]
    next_sheet_id: WorksheetId,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// An empty workbook with Excel's defaults (Calibri 11).
    pub fn new() -> Self {
        Self {
            schema_version: crate::SCHEMA_VERSION,
            sheets: Vec::new(),
            styles: StyleRegistry::new(),
            settings: WorkbookSettings::default(),
            next_sheet_id: 1,
        }
    }

    /// An empty workbook whose default style uses `settings.default_font`.
    pub fn with_settings(settings: WorkbookSettings) -> Result<Self, FormatError> {
        let styles = StyleRegistry::with_default_font(settings.default_font.to_font())?;
        Ok(Self {
            styles,
            settings,
            ..Self::new()
        })
    }

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    /// Register an extra color name for the color setters.
    pub fn add_named_color(&mut self, name: impl Into<String>, color: Color) {
        self.settings.named_colors.insert(name.into(), color);
    }

    pub fn parse_color(&self, s: &str) -> Result<Color, FormatError> {
        self.settings.parse_color(s)
    }

    /// Add a worksheet, returning its id.
    pub fn add_sheet(&mut self, name: &str) -> Result<WorksheetId, FormatError> {
        self.check_new_sheet_name(name, None)?;
        let id = self.next_sheet_id;
        self.next_sheet_id = self.next_sheet_id.wrapping_add(1);
        self.sheets.push(Worksheet::new(id, name));
        log::debug!("added sheet {name:?} (id {id})");
        Ok(id)
    }

    pub fn remove_sheet(&mut self, name: &str) -> Result<Worksheet, FormatError> {
        let idx = self.sheet_index(name)?;
        let sheet = self.sheets.remove(idx);
        log::debug!("removed sheet {:?} (id {})", sheet.name, sheet.id);
        Ok(sheet)
    }

    /// Rename a worksheet. Changing only the case of a name is allowed.
    pub fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> Result<(), FormatError> {
        let idx = self.sheet_index(old_name)?;
        self.check_new_sheet_name(new_name, Some(idx))?;
        self.sheets[idx].name = new_name.to_string();
        Ok(())
    }

    fn check_new_sheet_name(&self, name: &str, renaming: Option<usize>) -> Result<(), FormatError> {
        validate_sheet_name(name).map_err(|reason| FormatError::InvalidSheetName {
            name: name.to_string(),
            reason,
        })?;
        let taken = self
            .sheets
            .iter()
            .enumerate()
            .any(|(i, s)| Some(i) != renaming && sheet_name_eq_case_insensitive(&s.name, name));
        if taken {
            return Err(FormatError::DuplicateSheetName(name.to_string()));
        }
        Ok(())
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheets
            .iter()
            .find(|s| sheet_name_eq_case_insensitive(&s.name, name))
    }

    pub(crate) fn sheet_index(&self, name: &str) -> Result<usize, FormatError> {
        self.sheets
            .iter()
            .position(|s| sheet_name_eq_case_insensitive(&s.name, name))
            .ok_or_else(|| FormatError::SheetNotFound(name.to_string()))
    }

    pub(crate) fn sheet_at_mut(&mut self, idx: usize) -> &mut Worksheet {
        &mut self.sheets[idx]
    }

    pub fn sheet(&self, name: &str) -> Result<&Worksheet, FormatError> {
        let idx = self.sheet_index(name)?;
        Ok(&self.sheets[idx])
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Worksheet, FormatError> {
        let idx = self.sheet_index(name)?;
        Ok(&mut self.sheets[idx])
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Intern a whole style for a consumer that attaches styles outside the cell grid.
    pub fn intern_style(&mut self, style: &Style) -> Result<StyleId, FormatError> {
        self.styles.intern_style(style)
    }

    pub fn style(&self, id: StyleId) -> Result<Style, FormatError> {
        self.styles.style(id)
    }

    /// The cell at `cell`; unwritten addresses yield an empty default-styled cell.
    pub fn get_cell(&self, sheet: &str, cell: impl CellAddress) -> Result<Cell, FormatError> {
        let sheet = self.sheet(sheet)?;
        Ok(sheet.get_cell(cell.to_cell_ref()?))
    }

    pub fn set_value(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        value: impl Into<CellContent>,
    ) -> Result<(), FormatError> {
        let idx = self.sheet_index(sheet)?;
        let cell = cell.to_cell_ref()?;
        let value = value.into();
        value.validate()?;
        self.sheets[idx].set_content(cell, value)
    }

    /// Clear the content of a cell, keeping its formatting.
    pub fn remove_value(&mut self, sheet: &str, cell: impl CellAddress) -> Result<(), FormatError> {
        let idx = self.sheet_index(sheet)?;
        let cell = cell.to_cell_ref()?;
        self.sheets[idx].clear_content(cell)
    }

    pub fn get_style_id(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<StyleId, FormatError> {
        let sheet = self.sheet(sheet)?;
        Ok(sheet.style_id(cell.to_cell_ref()?))
    }

    /// Bind a cell to an existing style.
    pub fn set_style_id(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        style_id: StyleId,
    ) -> Result<(), FormatError> {
        let idx = self.sheet_index(sheet)?;
        let cell = cell.to_cell_ref()?;
        self.styles.xf(style_id)?;
        self.sheets[idx].set_style_id(cell, style_id)
    }

    /// Move the cells of `src` (content and style) so its top-left lands on `dest`.
    pub fn move_range(
        &mut self,
        sheet: &str,
        src: &str,
        dest: impl CellAddress,
    ) -> Result<(), FormatError> {
        let idx = self.sheet_index(sheet)?;
        let src_range = Range::from_a1(src).map_err(|err| FormatError::invalid_range(src, err))?;
        let dest = dest.to_cell_ref()?;
        self.sheets[idx].move_range(src_range, dest)
    }
}

impl<'de> Deserialize<'de> for Workbook {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(default = "default_schema_version")]
            schema_version: u32,
            #[serde(default)]
            sheets: Vec<Worksheet>,
            #[serde(default)]
            styles: Option<StyleRegistry>,
            #[serde(default)]
            settings: WorkbookSettings,
        }

        let helper = Helper::deserialize(deserializer)?;

        let default_font = helper.settings.default_font.to_font();
        default_font
            .validate()
            .map_err(|err| D::Error::custom(format!("default font: {err}")))?;
        let styles = match helper.styles {
            Some(mut styles) => {
                styles.reseed_default_font(default_font);
                styles
            }
            None => StyleRegistry::with_default_font(default_font).map_err(D::Error::custom)?,
        };

        if helper.schema_version > crate::SCHEMA_VERSION {
            return Err(D::Error::custom(format!(
                "unsupported schema_version {} (max supported: {})",
                helper.schema_version,
                crate::SCHEMA_VERSION
            )));
        }

        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        for sheet in &helper.sheets {
            validate_sheet_name(&sheet.name)
                .map_err(|err| D::Error::custom(format!("sheet {:?}: {err}", sheet.name)))?;
            let key = crate::sheet_name::sheet_name_casefold(&sheet.name);
            if let Some(prev) = seen.insert(key, sheet.name.as_str()) {
                return Err(D::Error::custom(format!(
                    "duplicate sheet names {prev:?} and {:?}",
                    sheet.name
                )));
            }
            for (at, cell) in sheet.iter_cells() {
                if !styles.contains_style(cell.style_id) {
                    return Err(D::Error::custom(format!(
                        "{}!{at} references unknown style {}",
                        sheet.name, cell.style_id
                    )));
                }
            }
        }

        let next_sheet_id = helper
            .sheets
            .iter()
            .map(|s| s.id)
            .max()
            .unwrap_or(0)
            .wrapping_add(1);

        Ok(Workbook {
            schema_version: helper.schema_version,
            sheets: helper.sheets,
            styles,
            settings: helper.settings,
            next_sheet_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SheetNameError;

    #[test]
    fn sheet_lifecycle() {
        let mut wb = Workbook::new();
        let id = wb.add_sheet("Data").unwrap();
        assert_eq!(id, 1);
        assert_eq!(
            wb.add_sheet("DATA"),
            Err(FormatError::DuplicateSheetName("DATA".to_string()))
        );
        assert_eq!(
            wb.add_sheet("a:b"),
            Err(FormatError::InvalidSheetName {
                name: "a:b".to_string(),
                reason: SheetNameError::ForbiddenCharacter(':'),
            })
        );

        wb.add_sheet("Other").unwrap();
        wb.rename_sheet("data", "DATA").unwrap();
        assert_eq!(wb.sheet_names(), vec!["DATA", "Other"]);
        assert!(wb.rename_sheet("DATA", "other").is_err());

        let removed = wb.remove_sheet("other").unwrap();
        assert_eq!(removed.name, "Other");
        assert_eq!(
            wb.sheet("Other").unwrap_err(),
            FormatError::SheetNotFound("Other".to_string())
        );
    }

    #[test]
    fn set_style_id_rejects_foreign_ids() {
        let mut wb = Workbook::new();
        wb.add_sheet("Sheet1").unwrap();
        assert!(matches!(
            wb.set_style_id("Sheet1", "A1", StyleId(9)),
            Err(FormatError::UnknownId { kind: "style", id: 9 })
        ));
    }

    #[test]
    fn deserialize_rejects_newer_schema_and_dangling_styles() {
        let mut json = serde_json::to_value(Workbook::new()).unwrap();
        json["schema_version"] = serde_json::json!(crate::SCHEMA_VERSION + 1);
        assert!(serde_json::from_value::<Workbook>(json).is_err());

        let mut wb = Workbook::new();
        wb.add_sheet("Sheet1").unwrap();
        wb.set_value("Sheet1", "A1", 1.0).unwrap();
        let mut json = serde_json::to_value(&wb).unwrap();
        let cells = json["sheets"][0]["cells"].as_object_mut().unwrap();
        for cell in cells.values_mut() {
            cell["style_id"] = serde_json::json!(42);
        }
        assert!(serde_json::from_value::<Workbook>(json).is_err());
    }

    #[test]
    fn sheet_ids_continue_after_roundtrip() {
        let mut wb = Workbook::new();
        wb.add_sheet("A").unwrap();
        wb.add_sheet("B").unwrap();
        let json = serde_json::to_string(&wb).unwrap();
        let mut restored: Workbook = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.add_sheet("C").unwrap(), 3);
    }
}
