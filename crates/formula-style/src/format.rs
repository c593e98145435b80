//! Per-attribute get/set accessors.
//!
//! Every setter is a one-field [`StylePatch`]: the cell's current composite is read, the touched
//! facet is re-derived and resolved through the registry, and the cell is rebound. Getters fall
//! back to the default style for cells that were never formatted, so "never set" and "set to
//! the default" read the same.

use crate::style::{Alignment, BorderEdge, Protection};
use crate::{
    AlignmentPatch, BorderSide, BorderStyle, CellAddress, CellRef, CellXf, Color, EdgePatch,
    Fill, FillPatch, FillPatternType, Font, FontFamily, FontPatch, FontScheme, FormatError,
    GradientFill, HorizontalAlignment, NumFmtId, ProtectionPatch, Range, Style, StylePatch,
    TextRotation, Underline, VerticalAlignment, Workbook,
};

impl Workbook {
    /// Apply `patch` on top of a cell's current style.
    pub fn apply_style_patch(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        patch: &StylePatch,
    ) -> Result<(), FormatError> {
        let idx = self.sheet_index(sheet)?;
        let cell = cell.to_cell_ref()?;
        let current = self.sheets()[idx].style_id(cell);
        let next = self.styles.apply_patch(current, patch)?;
        if next != current {
            self.sheet_at_mut(idx).set_style_id(cell, next)?;
        }
        Ok(())
    }

    /// Apply `patch` to every cell of `range`, each on top of its own current style.
    ///
    /// Cells sharing a style before the call share one after it.
    pub fn apply_style_patch_to_range(
        &mut self,
        sheet: &str,
        range: &str,
        patch: &StylePatch,
    ) -> Result<(), FormatError> {
        let idx = self.sheet_index(sheet)?;
        let range = Range::from_a1(range).map_err(|err| FormatError::invalid_range(range, err))?;

        // Resolve every distinct source style first so a bad patch fails before any cell moves.
        let mut resolved = std::collections::HashMap::new();
        for cell in range.iter() {
            let current = self.sheets()[idx].style_id(cell);
            if !resolved.contains_key(&current) {
                let next = self.styles.apply_patch(current, patch)?;
                resolved.insert(current, next);
            }
        }
        let sheet = self.sheet_at_mut(idx);
        for cell in range.iter() {
            let current = sheet.style_id(cell);
            if let Some(next) = resolved.get(&current) {
                sheet.set_style_id(cell, *next)?;
            }
        }
        Ok(())
    }

    /// The fully expanded style of a cell.
    pub fn get_cell_style(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<Style, FormatError> {
        let id = self.get_style_id(sheet, cell)?;
        self.styles.style(id)
    }

    fn cell_xf(&self, sheet: &str, cell: impl CellAddress) -> Result<&CellXf, FormatError> {
        let id = self.get_style_id(sheet, cell)?;
        self.styles.xf(id)
    }

    fn cell_font(&self, sheet: &str, cell: impl CellAddress) -> Result<&Font, FormatError> {
        let xf = self.cell_xf(sheet, cell)?;
        self.styles.font(xf.font_id)
    }

    fn cell_fill(&self, sheet: &str, cell: impl CellAddress) -> Result<&Fill, FormatError> {
        let xf = self.cell_xf(sheet, cell)?;
        self.styles.fill(xf.fill_id)
    }

    fn cell_border_edge(
        &self,
        sheet: &str,
        cell: impl CellAddress,
        side: BorderSide,
    ) -> Result<BorderEdge, FormatError> {
        let xf = self.cell_xf(sheet, cell)?;
        let border = self.styles.border(xf.border_id)?;
        border.edge(side).copied().ok_or_else(|| {
            FormatError::invalid_parameters("border side `all` can only be used when setting")
        })
    }

    fn cell_alignment(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<&Alignment, FormatError> {
        let xf = self.cell_xf(sheet, cell)?;
        Ok(&self.styles.alignment(xf.alignment_id)?.alignment)
    }

    fn cell_protection(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<Protection, FormatError> {
        let xf = self.cell_xf(sheet, cell)?;
        Ok(self.styles.alignment(xf.alignment_id)?.protection)
    }

    /// Checks a color setter's inputs in accessor order: sheet, address, then the color.
    fn color_target(
        &self,
        sheet: &str,
        cell: impl CellAddress,
        color: &str,
    ) -> Result<(CellRef, Color), FormatError> {
        self.sheet_index(sheet)?;
        let cell = cell.to_cell_ref()?;
        Ok((cell, self.parse_color(color)?))
    }

    fn patch_font(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        font: FontPatch,
    ) -> Result<(), FormatError> {
        self.apply_style_patch(sheet, cell, &StylePatch::font(font))
    }

    fn patch_alignment(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        alignment: AlignmentPatch,
    ) -> Result<(), FormatError> {
        self.apply_style_patch(sheet, cell, &StylePatch::alignment(alignment))
    }

    // Font

    pub fn set_bold(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        bold: bool,
    ) -> Result<(), FormatError> {
        let patch = FontPatch {
            bold: Some(bold),
            ..FontPatch::default()
        };
        self.patch_font(sheet, cell, patch)
    }

    pub fn get_bold(&self, sheet: &str, cell: impl CellAddress) -> Result<bool, FormatError> {
        Ok(self.cell_font(sheet, cell)?.bold)
    }

    pub fn set_italic(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        italic: bool,
    ) -> Result<(), FormatError> {
        let patch = FontPatch {
            italic: Some(italic),
            ..FontPatch::default()
        };
        self.patch_font(sheet, cell, patch)
    }

    pub fn get_italic(&self, sheet: &str, cell: impl CellAddress) -> Result<bool, FormatError> {
        Ok(self.cell_font(sheet, cell)?.italic)
    }

    pub fn set_underline(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        underline: Underline,
    ) -> Result<(), FormatError> {
        let patch = FontPatch {
            underline: Some(underline),
            ..FontPatch::default()
        };
        self.patch_font(sheet, cell, patch)
    }

    pub fn get_underline(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<Underline, FormatError> {
        Ok(self.cell_font(sheet, cell)?.underline)
    }

    pub fn set_strikethrough(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        strikethrough: bool,
    ) -> Result<(), FormatError> {
        let patch = FontPatch {
            strikethrough: Some(strikethrough),
            ..FontPatch::default()
        };
        self.patch_font(sheet, cell, patch)
    }

    pub fn get_strikethrough(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<bool, FormatError> {
        Ok(self.cell_font(sheet, cell)?.strikethrough)
    }

    pub fn set_font_name(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        name: &str,
    ) -> Result<(), FormatError> {
        let patch = FontPatch {
            name: Some(name.to_string()),
            ..FontPatch::default()
        };
        self.patch_font(sheet, cell, patch)
    }

    pub fn get_font_name(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<String, FormatError> {
        Ok(self.cell_font(sheet, cell)?.name.clone())
    }

    /// Font size in points, in `(0, 409]`.
    pub fn set_font_size(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        size: f64,
    ) -> Result<(), FormatError> {
        let patch = FontPatch {
            size: Some(size),
            ..FontPatch::default()
        };
        self.patch_font(sheet, cell, patch)
    }

    pub fn get_font_size(&self, sheet: &str, cell: impl CellAddress) -> Result<f64, FormatError> {
        Ok(self.cell_font(sheet, cell)?.size.0)
    }

    pub fn set_font_family(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        family: FontFamily,
    ) -> Result<(), FormatError> {
        let patch = FontPatch {
            family: Some(family),
            ..FontPatch::default()
        };
        self.patch_font(sheet, cell, patch)
    }

    pub fn get_font_family(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<FontFamily, FormatError> {
        Ok(self.cell_font(sheet, cell)?.family)
    }

    pub fn set_font_scheme(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        scheme: FontScheme,
    ) -> Result<(), FormatError> {
        let patch = FontPatch {
            scheme: Some(scheme),
            ..FontPatch::default()
        };
        self.patch_font(sheet, cell, patch)
    }

    pub fn get_font_scheme(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<FontScheme, FormatError> {
        Ok(self.cell_font(sheet, cell)?.scheme)
    }

    /// Accepts `RRGGBB`, `AARRGGBB` (either with a leading `#`) or a color name.
    pub fn set_font_color(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        color: &str,
    ) -> Result<(), FormatError> {
        let (cell, color) = self.color_target(sheet, cell, color)?;
        let patch = FontPatch {
            color: Some(color),
            ..FontPatch::default()
        };
        self.patch_font(sheet, cell, patch)
    }

    pub fn get_font_color(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<Color, FormatError> {
        Ok(self.cell_font(sheet, cell)?.color)
    }

    // Fill

    /// Give the cell a solid background.
    pub fn set_background_color(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        color: &str,
    ) -> Result<(), FormatError> {
        let (cell, color) = self.color_target(sheet, cell, color)?;
        self.apply_style_patch(sheet, cell, &StylePatch::fill(FillPatch::solid(color)))
    }

    /// The visible background: the color of a solid fill, white otherwise.
    pub fn get_background_color(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<Color, FormatError> {
        Ok(self.cell_fill(sheet, cell)?.background_color())
    }

    pub fn set_fill_pattern(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        pattern: FillPatternType,
    ) -> Result<(), FormatError> {
        let patch = FillPatch {
            pattern_type: Some(pattern),
            ..FillPatch::default()
        };
        self.apply_style_patch(sheet, cell, &StylePatch::fill(patch))
    }

    /// The pattern type; gradient fills report `none`.
    pub fn get_fill_pattern(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<FillPatternType, FormatError> {
        Ok(self
            .cell_fill(sheet, cell)?
            .pattern()
            .map_or(FillPatternType::None, |p| p.pattern_type))
    }

    pub fn set_fill_foreground_color(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        color: &str,
    ) -> Result<(), FormatError> {
        let (cell, color) = self.color_target(sheet, cell, color)?;
        let patch = FillPatch {
            fg_color: Some(color),
            ..FillPatch::default()
        };
        self.apply_style_patch(sheet, cell, &StylePatch::fill(patch))
    }

    pub fn get_fill_foreground_color(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<Color, FormatError> {
        Ok(self
            .cell_fill(sheet, cell)?
            .pattern()
            .map_or(Color::black(), |p| p.fg_color))
    }

    pub fn set_fill_background_color(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        color: &str,
    ) -> Result<(), FormatError> {
        let (cell, color) = self.color_target(sheet, cell, color)?;
        let patch = FillPatch {
            bg_color: Some(color),
            ..FillPatch::default()
        };
        self.apply_style_patch(sheet, cell, &StylePatch::fill(patch))
    }

    pub fn get_fill_background_color(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<Color, FormatError> {
        Ok(self
            .cell_fill(sheet, cell)?
            .pattern()
            .map_or(Color::white(), |p| p.bg_color))
    }

    pub fn set_gradient_fill(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        gradient: GradientFill,
    ) -> Result<(), FormatError> {
        let patch = FillPatch {
            gradient: Some(gradient),
            ..FillPatch::default()
        };
        self.apply_style_patch(sheet, cell, &StylePatch::fill(patch))
    }

    pub fn get_fill(&self, sheet: &str, cell: impl CellAddress) -> Result<Fill, FormatError> {
        Ok(self.cell_fill(sheet, cell)?.clone())
    }

    // Border

    /// Set the line style of one side, or of all four outer sides at once.
    pub fn set_border(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        side: BorderSide,
        style: BorderStyle,
    ) -> Result<(), FormatError> {
        let patch = StylePatch::border_edge(side, EdgePatch::style(style));
        self.apply_style_patch(sheet, cell, &patch)
    }

    pub fn get_border_style(
        &self,
        sheet: &str,
        cell: impl CellAddress,
        side: BorderSide,
    ) -> Result<BorderStyle, FormatError> {
        Ok(self.cell_border_edge(sheet, cell, side)?.style)
    }

    pub fn set_border_color(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        side: BorderSide,
        color: &str,
    ) -> Result<(), FormatError> {
        let (cell, color) = self.color_target(sheet, cell, color)?;
        let patch = StylePatch::border_edge(side, EdgePatch::color(color));
        self.apply_style_patch(sheet, cell, &patch)
    }

    pub fn get_border_color(
        &self,
        sheet: &str,
        cell: impl CellAddress,
        side: BorderSide,
    ) -> Result<Color, FormatError> {
        Ok(self.cell_border_edge(sheet, cell, side)?.color)
    }

    // Alignment

    pub fn set_horizontal_alignment(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        horizontal: HorizontalAlignment,
    ) -> Result<(), FormatError> {
        let patch = AlignmentPatch {
            horizontal: Some(horizontal),
            ..AlignmentPatch::default()
        };
        self.patch_alignment(sheet, cell, patch)
    }

    pub fn get_horizontal_alignment(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<HorizontalAlignment, FormatError> {
        Ok(self.cell_alignment(sheet, cell)?.horizontal)
    }

    pub fn set_vertical_alignment(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        vertical: VerticalAlignment,
    ) -> Result<(), FormatError> {
        let patch = AlignmentPatch {
            vertical: Some(vertical),
            ..AlignmentPatch::default()
        };
        self.patch_alignment(sheet, cell, patch)
    }

    pub fn get_vertical_alignment(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<VerticalAlignment, FormatError> {
        Ok(self.cell_alignment(sheet, cell)?.vertical)
    }

    pub fn set_wrap_text(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        wrap: bool,
    ) -> Result<(), FormatError> {
        let patch = AlignmentPatch {
            wrap_text: Some(wrap),
            ..AlignmentPatch::default()
        };
        self.patch_alignment(sheet, cell, patch)
    }

    pub fn get_wrap_text(&self, sheet: &str, cell: impl CellAddress) -> Result<bool, FormatError> {
        Ok(self.cell_alignment(sheet, cell)?.wrap_text)
    }

    pub fn set_shrink_to_fit(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        shrink: bool,
    ) -> Result<(), FormatError> {
        let patch = AlignmentPatch {
            shrink_to_fit: Some(shrink),
            ..AlignmentPatch::default()
        };
        self.patch_alignment(sheet, cell, patch)
    }

    pub fn get_shrink_to_fit(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<bool, FormatError> {
        Ok(self.cell_alignment(sheet, cell)?.shrink_to_fit)
    }

    /// Rotation in `-90..=180` degrees, or [`TextRotation::Vertical`].
    ///
    /// `91..=180` is read as SpreadsheetML's encoding of `-1..=-90`, so setting `120` reads
    /// back as `-30`.
    pub fn set_text_rotation(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        rotation: TextRotation,
    ) -> Result<(), FormatError> {
        let patch = AlignmentPatch {
            rotation: Some(rotation),
            ..AlignmentPatch::default()
        };
        self.patch_alignment(sheet, cell, patch)
    }

    pub fn get_text_rotation(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<TextRotation, FormatError> {
        Ok(self.cell_alignment(sheet, cell)?.rotation)
    }

    pub fn set_indent(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        indent: u8,
    ) -> Result<(), FormatError> {
        let patch = AlignmentPatch {
            indent: Some(indent),
            ..AlignmentPatch::default()
        };
        self.patch_alignment(sheet, cell, patch)
    }

    pub fn get_indent(&self, sheet: &str, cell: impl CellAddress) -> Result<u8, FormatError> {
        Ok(self.cell_alignment(sheet, cell)?.indent)
    }

    // Number format

    pub fn set_number_format(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        code: &str,
    ) -> Result<(), FormatError> {
        self.apply_style_patch(sheet, cell, &StylePatch::number_format(code))
    }

    pub fn get_number_format(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<String, FormatError> {
        let xf = self.cell_xf(sheet, cell)?;
        Ok(self.styles.number_format(xf.num_fmt_id)?.to_string())
    }

    pub fn get_number_format_id(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<NumFmtId, FormatError> {
        Ok(self.cell_xf(sheet, cell)?.num_fmt_id)
    }

    // Protection

    pub fn set_cell_locked(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        locked: bool,
    ) -> Result<(), FormatError> {
        let patch = ProtectionPatch {
            locked: Some(locked),
            hidden: None,
        };
        self.apply_style_patch(sheet, cell, &StylePatch::protection(patch))
    }

    pub fn get_cell_locked(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<bool, FormatError> {
        Ok(self.cell_protection(sheet, cell)?.locked)
    }

    pub fn set_cell_hidden(
        &mut self,
        sheet: &str,
        cell: impl CellAddress,
        hidden: bool,
    ) -> Result<(), FormatError> {
        let patch = ProtectionPatch {
            locked: None,
            hidden: Some(hidden),
        };
        self.apply_style_patch(sheet, cell, &StylePatch::protection(patch))
    }

    pub fn get_cell_hidden(
        &self,
        sheet: &str,
        cell: impl CellAddress,
    ) -> Result<bool, FormatError> {
        Ok(self.cell_protection(sheet, cell)?.hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook() -> Workbook {
        let mut wb = Workbook::new();
        wb.add_sheet("Sheet1").unwrap();
        wb
    }

    #[test]
    fn setters_validate_before_touching_the_document() {
        let mut wb = workbook();
        let styles_before = wb.styles().style_count();
        assert!(wb.set_font_size("Sheet1", "A1", 0.0).is_err());
        assert!(wb.set_indent("Sheet1", "A1", 251).is_err());
        assert!(wb.set_font_color("Sheet1", "A1", "not-a-color").is_err());
        assert!(wb
            .set_text_rotation("Sheet1", "A1", TextRotation::Degrees(200))
            .is_err());
        assert_eq!(wb.styles().style_count(), styles_before);
        assert_eq!(wb.sheet("Sheet1").unwrap().cell_count(), 0);
    }

    #[test]
    fn missing_sheet_is_reported_before_bad_values() {
        let mut wb = workbook();
        assert_eq!(
            wb.set_font_color("Nope", "A1", "not-a-color"),
            Err(FormatError::SheetNotFound("Nope".to_string()))
        );
        assert_eq!(
            wb.get_bold("Nope", "A1"),
            Err(FormatError::SheetNotFound("Nope".to_string()))
        );
    }

    #[test]
    fn color_setters_check_the_address_before_the_color() {
        let mut wb = workbook();
        assert!(matches!(
            wb.set_font_color("Sheet1", "A0", "not-a-color"),
            Err(FormatError::InvalidRange { .. })
        ));
        assert!(matches!(
            wb.set_border_color("Sheet1", "XFE1", BorderSide::Top, "not-a-color"),
            Err(FormatError::InvalidRange { .. })
        ));
        assert!(matches!(
            wb.set_background_color("Sheet1", "B2", "not-a-color"),
            Err(FormatError::InvalidParameters(_))
        ));
    }

    #[test]
    fn border_all_is_setter_only() {
        let mut wb = workbook();
        wb.set_border("Sheet1", "B2", BorderSide::All, BorderStyle::Thin).unwrap();
        assert_eq!(
            wb.get_border_style("Sheet1", "B2", BorderSide::Left).unwrap(),
            BorderStyle::Thin
        );
        assert!(matches!(
            wb.get_border_style("Sheet1", "B2", BorderSide::All),
            Err(FormatError::InvalidParameters(_))
        ));
    }

    #[test]
    fn range_patch_keeps_shared_styles_shared() {
        let mut wb = workbook();
        wb.apply_style_patch_to_range(
            "Sheet1",
            "A1:C3",
            &StylePatch::font(FontPatch {
                italic: Some(true),
                ..FontPatch::default()
            }),
        )
        .unwrap();
        let a1 = wb.get_style_id("Sheet1", "A1").unwrap();
        let c3 = wb.get_style_id("Sheet1", "C3").unwrap();
        assert_eq!(a1, c3);
        assert!(wb.get_italic("Sheet1", "B2").unwrap());
        assert!(!wb.get_italic("Sheet1", "D4").unwrap());
    }
}
