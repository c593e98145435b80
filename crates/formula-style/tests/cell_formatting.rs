use formula_style::{
    BorderSide, BorderStyle, CellRef, Color, FillPatternType, FontPatch, FormatError,
    GradientFill, HorizontalAlignment, StyleId, StylePatch, TextRotation, Underline,
    VerticalAlignment, Workbook, WorkbookSettings,
};
use formula_style::{DefaultFont, Fill};
use pretty_assertions::assert_eq;

fn workbook() -> Workbook {
    let mut wb = Workbook::new();
    wb.add_sheet("Sheet1").unwrap();
    wb
}

#[test]
fn untouched_cells_report_excel_defaults() {
    let wb = workbook();
    assert!(!wb.get_bold("Sheet1", "A1").unwrap());
    assert!(!wb.get_italic("Sheet1", "A1").unwrap());
    assert_eq!(wb.get_underline("Sheet1", "A1").unwrap(), Underline::None);
    assert_eq!(wb.get_font_name("Sheet1", "A1").unwrap(), "Calibri");
    assert_eq!(wb.get_font_size("Sheet1", "A1").unwrap(), 11.0);
    assert_eq!(wb.get_font_color("Sheet1", "A1").unwrap(), Color::black());
    assert_eq!(wb.get_background_color("Sheet1", "A1").unwrap(), Color::white());
    assert_eq!(wb.get_fill_pattern("Sheet1", "A1").unwrap(), FillPatternType::None);
    assert_eq!(
        wb.get_border_style("Sheet1", "A1", BorderSide::Top).unwrap(),
        BorderStyle::None
    );
    assert_eq!(
        wb.get_horizontal_alignment("Sheet1", "A1").unwrap(),
        HorizontalAlignment::General
    );
    assert_eq!(
        wb.get_vertical_alignment("Sheet1", "A1").unwrap(),
        VerticalAlignment::Bottom
    );
    assert!(!wb.get_wrap_text("Sheet1", "A1").unwrap());
    assert_eq!(wb.get_text_rotation("Sheet1", "A1").unwrap(), TextRotation::Degrees(0));
    assert_eq!(wb.get_indent("Sheet1", "A1").unwrap(), 0);
    assert_eq!(wb.get_number_format("Sheet1", "A1").unwrap(), "General");
    assert!(wb.get_cell_locked("Sheet1", "A1").unwrap());
    assert!(!wb.get_cell_hidden("Sheet1", "A1").unwrap());

    // Reads never allocate storage.
    assert_eq!(wb.sheet("Sheet1").unwrap().cell_count(), 0);
}

#[test]
fn configured_default_font_is_reported_for_untouched_cells() {
    let settings = WorkbookSettings {
        default_font: DefaultFont {
            name: "Aptos".to_string(),
            size: 12.0,
        },
        ..WorkbookSettings::default()
    };
    let mut wb = Workbook::with_settings(settings).unwrap();
    wb.add_sheet("Sheet1").unwrap();
    assert_eq!(wb.get_font_name("Sheet1", "Z99").unwrap(), "Aptos");
    assert_eq!(wb.get_font_size("Sheet1", "Z99").unwrap(), 12.0);
}

#[test]
fn red_bold_cell_roundtrips_through_json() {
    let mut wb = workbook();
    wb.set_value("Sheet1", "B2", "Total").unwrap();
    wb.set_bold("Sheet1", "B2", true).unwrap();
    wb.set_font_color("Sheet1", "B2", "FF0000").unwrap();
    wb.set_background_color("Sheet1", "B2", "#FFFFFF").unwrap();
    wb.set_number_format("Sheet1", "B2", "0.00%").unwrap();

    let json = serde_json::to_string(&wb).unwrap();
    let restored: Workbook = serde_json::from_str(&json).unwrap();

    assert!(restored.get_bold("Sheet1", "B2").unwrap());
    assert_eq!(
        restored.get_font_color("Sheet1", "B2").unwrap(),
        Color::new_rgb(0xFF0000)
    );
    assert_eq!(
        restored.get_background_color("Sheet1", "B2").unwrap(),
        Color::white()
    );
    assert_eq!(restored.get_number_format("Sheet1", "B2").unwrap(), "0.00%");
    assert_eq!(
        restored.get_cell_style("Sheet1", "B2").unwrap(),
        wb.get_cell_style("Sheet1", "B2").unwrap()
    );
}

#[test]
fn setting_one_attribute_leaves_the_others_alone() {
    let mut wb = workbook();
    wb.set_italic("Sheet1", "C3", true).unwrap();
    wb.set_font_size("Sheet1", "C3", 14.0).unwrap();
    wb.set_background_color("Sheet1", "C3", "yellow").unwrap();
    wb.set_border("Sheet1", "C3", BorderSide::Bottom, BorderStyle::Double).unwrap();
    wb.set_wrap_text("Sheet1", "C3", true).unwrap();

    wb.set_bold("Sheet1", "C3", true).unwrap();

    assert!(wb.get_italic("Sheet1", "C3").unwrap());
    assert_eq!(wb.get_font_size("Sheet1", "C3").unwrap(), 14.0);
    assert_eq!(
        wb.get_background_color("Sheet1", "C3").unwrap(),
        Color::new_rgb(0xFFFF00)
    );
    assert_eq!(
        wb.get_border_style("Sheet1", "C3", BorderSide::Bottom).unwrap(),
        BorderStyle::Double
    );
    assert!(wb.get_wrap_text("Sheet1", "C3").unwrap());
}

#[test]
fn changing_one_cell_does_not_change_cells_sharing_its_style() {
    let mut wb = workbook();
    wb.set_bold("Sheet1", "A1", true).unwrap();
    wb.set_bold("Sheet1", "A2", true).unwrap();
    assert_eq!(
        wb.get_style_id("Sheet1", "A1").unwrap(),
        wb.get_style_id("Sheet1", "A2").unwrap()
    );

    wb.set_font_color("Sheet1", "A2", "blue").unwrap();
    assert_eq!(wb.get_font_color("Sheet1", "A1").unwrap(), Color::black());
    assert_eq!(
        wb.get_font_color("Sheet1", "A2").unwrap(),
        Color::new_rgb(0x0000FF)
    );
}

#[test]
fn resetting_an_attribute_returns_to_the_default_style() {
    let mut wb = workbook();
    wb.set_bold("Sheet1", "D4", true).unwrap();
    assert_ne!(wb.get_style_id("Sheet1", "D4").unwrap(), StyleId::DEFAULT);
    wb.set_bold("Sheet1", "D4", false).unwrap();
    assert_eq!(wb.get_style_id("Sheet1", "D4").unwrap(), StyleId::DEFAULT);
    assert_eq!(wb.sheet("Sheet1").unwrap().cell_count(), 0);
}

#[test]
fn border_all_creates_a_single_composite() {
    let mut wb = workbook();
    let before = wb.styles().style_count();
    wb.set_border("Sheet1", "B2", BorderSide::All, BorderStyle::Medium).unwrap();
    assert_eq!(wb.styles().style_count(), before + 1);

    for side in [BorderSide::Top, BorderSide::Bottom, BorderSide::Left, BorderSide::Right] {
        assert_eq!(
            wb.get_border_style("Sheet1", "B2", side).unwrap(),
            BorderStyle::Medium
        );
    }
    assert_eq!(
        wb.get_border_style("Sheet1", "B2", BorderSide::Diagonal).unwrap(),
        BorderStyle::None
    );

    wb.set_border_color("Sheet1", "B2", BorderSide::Left, "#00FF00").unwrap();
    assert_eq!(
        wb.get_border_color("Sheet1", "B2", BorderSide::Left).unwrap(),
        Color::new_rgb(0x00FF00)
    );
    assert_eq!(
        wb.get_border_color("Sheet1", "B2", BorderSide::Right).unwrap(),
        Color::black()
    );
}

#[test]
fn invalid_values_are_rejected_and_nothing_changes() {
    let mut wb = workbook();
    wb.set_bold("Sheet1", "A1", true).unwrap();
    let style = wb.get_style_id("Sheet1", "A1").unwrap();
    let count = wb.styles().style_count();

    assert!(matches!(
        wb.set_font_size("Sheet1", "A1", -3.0),
        Err(FormatError::InvalidParameters(_))
    ));
    assert!(matches!(
        wb.set_font_size("Sheet1", "A1", 410.0),
        Err(FormatError::InvalidParameters(_))
    ));
    assert!(matches!(
        wb.set_background_color("Sheet1", "A1", "#GGHHII"),
        Err(FormatError::InvalidParameters(_))
    ));
    assert!(matches!(
        wb.set_text_rotation("Sheet1", "A1", TextRotation::Degrees(-91)),
        Err(FormatError::InvalidParameters(_))
    ));
    assert!(matches!(
        wb.set_number_format("Sheet1", "A1", ""),
        Err(FormatError::InvalidParameters(_))
    ));

    assert_eq!(wb.get_style_id("Sheet1", "A1").unwrap(), style);
    assert_eq!(wb.styles().style_count(), count);
}

#[test]
fn bad_addresses_and_sheets_are_reported() {
    let mut wb = workbook();
    assert!(matches!(
        wb.set_bold("Sheet1", "A0", true),
        Err(FormatError::InvalidRange { .. })
    ));
    assert!(matches!(
        wb.get_bold("Sheet1", "XFE1"),
        Err(FormatError::InvalidRange { .. })
    ));
    assert!(matches!(
        wb.get_bold("Sheet1", CellRef::new(0, 16_384)),
        Err(FormatError::InvalidRange { .. })
    ));
    assert_eq!(
        wb.set_bold("Missing", "A1", true),
        Err(FormatError::SheetNotFound("Missing".to_string()))
    );
    // Sheet names are matched case-insensitively.
    wb.set_bold("sheet1", "A1", true).unwrap();
    assert!(wb.get_bold("SHEET1", "A1").unwrap());
}

#[test]
fn color_setters_report_a_bad_address_before_a_bad_color() {
    let mut wb = workbook();
    assert!(matches!(
        wb.set_background_color("Sheet1", "A0", "nope"),
        Err(FormatError::InvalidRange { .. })
    ));
    assert!(matches!(
        wb.set_fill_foreground_color("Sheet1", CellRef::new(0, 16_384), "nope"),
        Err(FormatError::InvalidRange { .. })
    ));
    assert_eq!(
        wb.set_font_color("Missing", "A0", "nope"),
        Err(FormatError::SheetNotFound("Missing".to_string()))
    );
    assert_eq!(wb.styles().style_count(), 1);
}

#[test]
fn rotations_past_ninety_are_stored_in_signed_form() {
    let mut wb = workbook();
    wb.set_text_rotation("Sheet1", "A1", TextRotation::Degrees(120))
        .unwrap();
    wb.set_text_rotation("Sheet1", "A2", TextRotation::Degrees(-30))
        .unwrap();

    assert_eq!(
        wb.get_text_rotation("Sheet1", "A1").unwrap(),
        TextRotation::Degrees(-30)
    );
    assert_eq!(
        wb.get_style_id("Sheet1", "A1").unwrap(),
        wb.get_style_id("Sheet1", "A2").unwrap()
    );

    for degrees in -90..=180 {
        let cell = CellRef::new(10, 0);
        wb.set_text_rotation("Sheet1", cell, TextRotation::Degrees(degrees))
            .unwrap();
        let stored = wb.get_text_rotation("Sheet1", cell).unwrap();
        assert_eq!(stored.to_ooxml(), TextRotation::Degrees(degrees).to_ooxml());
        assert_eq!(TextRotation::from_ooxml(stored.to_ooxml()), Some(stored));
    }

    let json = serde_json::to_value(&wb).unwrap();
    let restored: Workbook = serde_json::from_value(json).unwrap();
    assert_eq!(
        restored.get_text_rotation("Sheet1", "A1").unwrap(),
        TextRotation::Degrees(-30)
    );
}

#[test]
fn loading_without_a_font_table_uses_the_configured_default_font() {
    let settings = WorkbookSettings {
        default_font: DefaultFont {
            name: "Aptos".to_string(),
            size: 12.0,
        },
        ..WorkbookSettings::default()
    };
    let mut wb = Workbook::with_settings(settings).unwrap();
    wb.add_sheet("Sheet1").unwrap();

    let mut json = serde_json::to_value(&wb).unwrap();
    json["styles"]["fonts"] = serde_json::json!([]);
    let restored: Workbook = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(restored.get_font_name("Sheet1", "B2").unwrap(), "Aptos");
    assert_eq!(restored.get_font_size("Sheet1", "B2").unwrap(), 12.0);

    json.as_object_mut().unwrap().remove("styles");
    let restored: Workbook = serde_json::from_value(json).unwrap();
    assert_eq!(restored.get_font_name("Sheet1", "B2").unwrap(), "Aptos");
}

#[test]
fn alignment_and_protection_setters() {
    let mut wb = workbook();
    wb.set_horizontal_alignment("Sheet1", "E5", HorizontalAlignment::Center).unwrap();
    wb.set_vertical_alignment("Sheet1", "E5", VerticalAlignment::Top).unwrap();
    wb.set_text_rotation("Sheet1", "E5", TextRotation::Vertical).unwrap();
    wb.set_indent("Sheet1", "E5", 3).unwrap();
    wb.set_shrink_to_fit("Sheet1", "E5", true).unwrap();
    wb.set_cell_locked("Sheet1", "E5", false).unwrap();
    wb.set_cell_hidden("Sheet1", "E5", true).unwrap();

    assert_eq!(
        wb.get_horizontal_alignment("Sheet1", "E5").unwrap(),
        HorizontalAlignment::Center
    );
    assert_eq!(
        wb.get_vertical_alignment("Sheet1", "E5").unwrap(),
        VerticalAlignment::Top
    );
    assert_eq!(wb.get_text_rotation("Sheet1", "E5").unwrap(), TextRotation::Vertical);
    assert_eq!(wb.get_indent("Sheet1", "E5").unwrap(), 3);
    assert!(wb.get_shrink_to_fit("Sheet1", "E5").unwrap());
    assert!(!wb.get_cell_locked("Sheet1", "E5").unwrap());
    assert!(wb.get_cell_hidden("Sheet1", "E5").unwrap());
}

#[test]
fn pattern_and_gradient_fills() {
    let mut wb = workbook();
    wb.set_fill_pattern("Sheet1", "A1", FillPatternType::DarkGrid).unwrap();
    wb.set_fill_foreground_color("Sheet1", "A1", "red").unwrap();
    assert_eq!(wb.get_fill_pattern("Sheet1", "A1").unwrap(), FillPatternType::DarkGrid);
    assert_eq!(
        wb.get_fill_foreground_color("Sheet1", "A1").unwrap(),
        Color::new_rgb(0xFF0000)
    );
    // Only solid fills count as the background.
    assert_eq!(wb.get_background_color("Sheet1", "A1").unwrap(), Color::white());

    let gradient = GradientFill::linear(90.0, Color::white(), Color::new_rgb(0x4472C4));
    wb.set_gradient_fill("Sheet1", "A2", gradient.clone()).unwrap();
    assert_eq!(wb.get_fill("Sheet1", "A2").unwrap(), Fill::Gradient(gradient));
    assert_eq!(wb.get_fill_pattern("Sheet1", "A2").unwrap(), FillPatternType::None);
}

#[test]
fn range_patches_apply_on_top_of_each_cells_style() {
    let mut wb = workbook();
    wb.set_italic("Sheet1", "B2", true).unwrap();

    let patch = StylePatch::font(FontPatch {
        bold: Some(true),
        ..FontPatch::default()
    });
    wb.apply_style_patch_to_range("Sheet1", "A1:C3", &patch).unwrap();

    assert!(wb.get_bold("Sheet1", "A1").unwrap());
    assert!(wb.get_bold("Sheet1", "C3").unwrap());
    assert!(wb.get_italic("Sheet1", "B2").unwrap());
    assert!(!wb.get_italic("Sheet1", "A1").unwrap());
    assert!(!wb.get_bold("Sheet1", "D4").unwrap());

    assert!(matches!(
        wb.apply_style_patch_to_range("Sheet1", "A1:", &patch),
        Err(FormatError::InvalidRange { .. })
    ));
}

#[test]
fn named_colors_from_settings_are_accepted() {
    let mut wb = workbook();
    wb.add_named_color("brand", Color::new_rgb(0x1F4E79));
    wb.set_font_color("Sheet1", "A1", "Brand").unwrap();
    assert_eq!(
        wb.get_font_color("Sheet1", "A1").unwrap(),
        Color::new_rgb(0x1F4E79)
    );
}

#[test]
fn formatting_survives_content_changes() {
    let mut wb = workbook();
    wb.set_underline("Sheet1", "A1", Underline::Double).unwrap();
    wb.set_value("Sheet1", "A1", 42.0).unwrap();
    wb.remove_value("Sheet1", "A1").unwrap();
    assert_eq!(wb.get_underline("Sheet1", "A1").unwrap(), Underline::Double);
}
