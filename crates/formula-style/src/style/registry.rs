use std::collections::HashMap;
use std::hash::Hash;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::number_format::validate_format_code;
use super::{
    AlignmentId, AlignmentProtection, Border, BorderId, CellXf, Fill, FillId, Font, FontId,
    NumFmtId, NumberFormatTable, Style, StyleId, StylePatch,
};
use crate::FormatError;

/// Append-only table of unique facet records.
///
/// Record `0` is the facet default. Ids are positions and never change once handed out.
#[derive(Clone, Debug)]
struct FacetTable<T> {
    records: Vec<T>,
    index: HashMap<T, u32>,
    kind: &'static str,
    /// Record `0` was filled in because the deserialized table was empty.
    seeded_default: bool,
}

impl<T: Clone + Eq + Hash> FacetTable<T> {
    fn new(kind: &'static str, default: T) -> Self {
        let mut table = Self {
            records: vec![default],
            index: HashMap::new(),
            kind,
            seeded_default: false,
        };
        table.rebuild_index();
        table
    }

    fn from_records(kind: &'static str, records: Vec<T>, default: impl FnOnce() -> T) -> Self {
        let mut table = Self {
            records,
            index: HashMap::new(),
            kind,
            seeded_default: false,
        };
        if table.records.is_empty() {
            log::warn!("{kind} table was empty; seeding the default record");
            table.records.push(default());
            table.seeded_default = true;
        }
        table.rebuild_index();
        table
    }

    /// Insert (or reuse) a record, returning its id.
    fn intern(&mut self, value: T) -> u32 {
        if let Some(id) = self.index.get(&value) {
            return *id;
        }
        let id = self.records.len() as u32;
        self.records.push(value.clone());
        self.index.insert(value, id);
        log::debug!("registered {} {id}", self.kind);
        id
    }

    fn get(&self, id: u32) -> Option<&T> {
        self.records.get(id as usize)
    }

    fn contains(&self, id: u32) -> bool {
        (id as usize) < self.records.len()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    /// Swap a seeded record `0` for `default`. Tables loaded with their own record `0` keep it.
    fn reseed_default(&mut self, default: T) {
        if self.seeded_default {
            self.records[0] = default;
            self.rebuild_index();
        }
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, record) in self.records.iter().enumerate() {
            if self.index.contains_key(record) {
                log::warn!(
                    "duplicate {} record at index {i}; lookups resolve to the first",
                    self.kind
                );
                continue;
            }
            self.index.insert(record.clone(), i as u32);
        }
    }
}

impl<T: Serialize> Serialize for FacetTable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.records.serialize(serializer)
    }
}

/// Workbook-wide style registry.
///
/// Every font, fill, border, number format and alignment+protection record is stored once, and
/// composite styles are stored once as tuples of facet ids. Records are never mutated after
/// insertion: "changing" a style means resolving a new composite, leaving other cells that
/// share the old one untouched.
#[derive(Clone, Debug, Serialize)]
pub struct StyleRegistry {
    fonts: FacetTable<Font>,
    fills: FacetTable<Fill>,
    borders: FacetTable<Border>,
    number_formats: NumberFormatTable,
    alignments: FacetTable<AlignmentProtection>,
    cell_xfs: FacetTable<CellXf>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    /// A registry whose default font is Calibri 11.
    pub fn new() -> Self {
        Self::with_default_font_unchecked(Font::default())
    }

    /// A registry whose record `0` font is `font`.
    pub fn with_default_font(font: Font) -> Result<Self, FormatError> {
        font.validate()?;
        Ok(Self::with_default_font_unchecked(font))
    }

    fn with_default_font_unchecked(font: Font) -> Self {
        Self {
            fonts: FacetTable::new("font", font),
            fills: FacetTable::new("fill", Fill::default()),
            borders: FacetTable::new("border", Border::default()),
            number_formats: NumberFormatTable::new(),
            alignments: FacetTable::new("alignment", AlignmentProtection::default()),
            cell_xfs: FacetTable::new("style", CellXf::default()),
        }
    }

    pub const fn default_style_id(&self) -> StyleId {
        StyleId::DEFAULT
    }

    /// Use `font` as record `0` when the loaded font table had none.
    pub(crate) fn reseed_default_font(&mut self, font: Font) {
        self.fonts.reseed_default(font);
    }

    pub fn resolve_or_insert_font(&mut self, font: Font) -> Result<FontId, FormatError> {
        font.validate()?;
        Ok(FontId(self.fonts.intern(font)))
    }

    pub fn resolve_or_insert_fill(&mut self, fill: Fill) -> Result<FillId, FormatError> {
        fill.validate()?;
        Ok(FillId(self.fills.intern(fill)))
    }

    pub fn resolve_or_insert_border(&mut self, border: Border) -> BorderId {
        BorderId(self.borders.intern(border))
    }

    pub fn resolve_or_insert_number_format(&mut self, code: &str) -> Result<NumFmtId, FormatError> {
        self.number_formats.resolve_or_insert(code)
    }

    pub fn resolve_or_insert_alignment(
        &mut self,
        alignment: AlignmentProtection,
    ) -> Result<AlignmentId, FormatError> {
        alignment.validate()?;
        Ok(AlignmentId(self.alignments.intern(alignment.canonical())))
    }

    /// Resolve a composite. Every facet id must already exist in this registry.
    pub fn resolve_or_insert_xf(&mut self, xf: CellXf) -> Result<StyleId, FormatError> {
        self.check_xf(&xf)?;
        Ok(StyleId(self.cell_xfs.intern(xf)))
    }

    pub fn font(&self, id: FontId) -> Result<&Font, FormatError> {
        self.fonts.get(id.0).ok_or(FormatError::UnknownId {
            kind: "font",
            id: id.0,
        })
    }

    pub fn fill(&self, id: FillId) -> Result<&Fill, FormatError> {
        self.fills.get(id.0).ok_or(FormatError::UnknownId {
            kind: "fill",
            id: id.0,
        })
    }

    pub fn border(&self, id: BorderId) -> Result<&Border, FormatError> {
        self.borders.get(id.0).ok_or(FormatError::UnknownId {
            kind: "border",
            id: id.0,
        })
    }

    pub fn number_format(&self, id: NumFmtId) -> Result<&str, FormatError> {
        self.number_formats.code(id)
    }

    pub fn alignment(&self, id: AlignmentId) -> Result<&AlignmentProtection, FormatError> {
        self.alignments.get(id.0).ok_or(FormatError::UnknownId {
            kind: "alignment",
            id: id.0,
        })
    }

    pub fn xf(&self, id: StyleId) -> Result<&CellXf, FormatError> {
        self.cell_xfs.get(id.0).ok_or(FormatError::UnknownId {
            kind: "style",
            id: id.0,
        })
    }

    pub fn contains_style(&self, id: StyleId) -> bool {
        self.cell_xfs.contains(id.0)
    }

    pub fn fonts(&self) -> impl ExactSizeIterator<Item = (FontId, &Font)> {
        self.fonts
            .records
            .iter()
            .enumerate()
            .map(|(i, f)| (FontId(i as u32), f))
    }

    pub fn fills(&self) -> impl ExactSizeIterator<Item = (FillId, &Fill)> {
        self.fills
            .records
            .iter()
            .enumerate()
            .map(|(i, f)| (FillId(i as u32), f))
    }

    pub fn borders(&self) -> impl ExactSizeIterator<Item = (BorderId, &Border)> {
        self.borders
            .records
            .iter()
            .enumerate()
            .map(|(i, b)| (BorderId(i as u32), b))
    }

    pub fn alignments(&self) -> impl ExactSizeIterator<Item = (AlignmentId, &AlignmentProtection)> {
        self.alignments
            .records
            .iter()
            .enumerate()
            .map(|(i, a)| (AlignmentId(i as u32), a))
    }

    pub fn number_formats(&self) -> &NumberFormatTable {
        &self.number_formats
    }

    pub fn cell_xfs(&self) -> impl ExactSizeIterator<Item = (StyleId, &CellXf)> {
        self.cell_xfs
            .records
            .iter()
            .enumerate()
            .map(|(i, xf)| (StyleId(i as u32), xf))
    }

    pub fn style_count(&self) -> usize {
        self.cell_xfs.len()
    }

    /// Intern a fully expanded style, facet by facet.
    pub fn intern_style(&mut self, style: &Style) -> Result<StyleId, FormatError> {
        let alignment = AlignmentProtection {
            alignment: style.alignment.clone(),
            protection: style.protection,
        };
        style.font.validate()?;
        style.fill.validate()?;
        alignment.validate()?;
        validate_format_code(&style.number_format)?;

        let xf = CellXf {
            num_fmt_id: self.number_formats.resolve_or_insert(&style.number_format)?,
            font_id: FontId(self.fonts.intern(style.font.clone())),
            fill_id: FillId(self.fills.intern(style.fill.clone())),
            border_id: BorderId(self.borders.intern(style.border.clone())),
            alignment_id: AlignmentId(self.alignments.intern(alignment.canonical())),
        };
        Ok(StyleId(self.cell_xfs.intern(xf)))
    }

    /// Expand a composite into its facet values.
    pub fn style(&self, id: StyleId) -> Result<Style, FormatError> {
        let xf = self.xf(id)?;
        let alignment = self.alignment(xf.alignment_id)?;
        Ok(Style {
            font: self.font(xf.font_id)?.clone(),
            fill: self.fill(xf.fill_id)?.clone(),
            border: self.border(xf.border_id)?.clone(),
            number_format: self.number_format(xf.num_fmt_id)?.to_string(),
            alignment: alignment.alignment.clone(),
            protection: alignment.protection,
        })
    }

    /// The composite that results from applying `patch` on top of `base`.
    ///
    /// Only facets the patch touches are re-resolved; the rest keep their ids. The patch is fully
    /// validated before anything is interned, so an error leaves the registry unchanged.
    pub fn apply_patch(
        &mut self,
        base: StyleId,
        patch: &StylePatch,
    ) -> Result<StyleId, FormatError> {
        if patch.is_empty() {
            self.xf(base)?;
            return Ok(base);
        }
        let mut xf = *self.xf(base)?;

        let font = patch.font.apply(self.font(xf.font_id)?);
        let fill = patch.fill.apply(self.fill(xf.fill_id)?);
        let border = patch.border.apply(self.border(xf.border_id)?);
        let alignment = {
            let current = self.alignment(xf.alignment_id)?;
            let alignment = patch.alignment.apply(&current.alignment);
            let protection = patch.protection.apply(&current.protection);
            if alignment.is_some() || protection.is_some() {
                Some(AlignmentProtection {
                    alignment: alignment.unwrap_or_else(|| current.alignment.clone()),
                    protection: protection.unwrap_or(current.protection),
                })
            } else {
                None
            }
        };

        if let Some(font) = &font {
            font.validate()?;
        }
        if let Some(fill) = &fill {
            fill.validate()?;
        }
        if let Some(alignment) = &alignment {
            alignment.validate()?;
        }
        if let Some(code) = &patch.number_format {
            validate_format_code(code)?;
            xf.num_fmt_id = self.number_formats.resolve_or_insert(code)?;
        }

        if let Some(font) = font {
            xf.font_id = FontId(self.fonts.intern(font));
        }
        if let Some(fill) = fill {
            xf.fill_id = FillId(self.fills.intern(fill));
        }
        if let Some(border) = border {
            xf.border_id = BorderId(self.borders.intern(border));
        }
        if let Some(alignment) = alignment {
            xf.alignment_id = AlignmentId(self.alignments.intern(alignment.canonical()));
        }

        Ok(StyleId(self.cell_xfs.intern(xf)))
    }

    fn check_xf(&self, xf: &CellXf) -> Result<(), FormatError> {
        self.font(xf.font_id)?;
        self.fill(xf.fill_id)?;
        self.border(xf.border_id)?;
        self.number_format(xf.num_fmt_id)?;
        self.alignment(xf.alignment_id)?;
        Ok(())
    }
}

impl<'de> Deserialize<'de> for StyleRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(default)]
            fonts: Vec<Font>,
            #[serde(default)]
            fills: Vec<Fill>,
            #[serde(default)]
            borders: Vec<Border>,
            #[serde(default)]
            number_formats: NumberFormatTable,
            #[serde(default)]
            alignments: Vec<AlignmentProtection>,
            #[serde(default)]
            cell_xfs: Vec<CellXf>,
        }

        let mut helper = Helper::deserialize(deserializer)?;
        for (i, font) in helper.fonts.iter().enumerate() {
            font.validate()
                .map_err(|err| D::Error::custom(format!("font {i}: {err}")))?;
        }
        for (i, fill) in helper.fills.iter().enumerate() {
            fill.validate()
                .map_err(|err| D::Error::custom(format!("fill {i}: {err}")))?;
        }
        for (i, alignment) in helper.alignments.iter().enumerate() {
            alignment
                .validate()
                .map_err(|err| D::Error::custom(format!("alignment {i}: {err}")))?;
        }
        helper.alignments = helper
            .alignments
            .into_iter()
            .map(AlignmentProtection::canonical)
            .collect();

        let registry = StyleRegistry {
            fonts: FacetTable::from_records("font", helper.fonts, Font::default),
            fills: FacetTable::from_records("fill", helper.fills, Fill::default),
            borders: FacetTable::from_records("border", helper.borders, Border::default),
            number_formats: helper.number_formats,
            alignments: FacetTable::from_records(
                "alignment",
                helper.alignments,
                AlignmentProtection::default,
            ),
            cell_xfs: FacetTable::from_records("style", helper.cell_xfs, CellXf::default),
        };

        for (id, xf) in registry.cell_xfs() {
            registry
                .check_xf(xf)
                .map_err(|err| D::Error::custom(format!("style {id}: {err}")))?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BorderEdge, BorderSide, BorderStyle, EdgePatch, FontPatch};
    use crate::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_records_are_seeded() {
        let registry = StyleRegistry::new();
        assert_eq!(registry.fonts().len(), 1);
        assert_eq!(registry.fills().len(), 1);
        assert_eq!(registry.borders().len(), 1);
        assert_eq!(registry.alignments().len(), 1);
        assert_eq!(registry.style_count(), 1);
        assert_eq!(registry.style(StyleId(0)).unwrap(), Style::default());
    }

    #[test]
    fn equal_facets_share_one_record() {
        let mut registry = StyleRegistry::new();
        let bold = Font {
            bold: true,
            ..Font::default()
        };
        let a = registry.resolve_or_insert_font(bold.clone()).unwrap();
        let b = registry.resolve_or_insert_font(bold).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, FontId(1));
        assert_eq!(registry.resolve_or_insert_font(Font::default()).unwrap(), FontId(0));
    }

    #[test]
    fn patches_only_touch_changed_facets() {
        let mut registry = StyleRegistry::new();
        let bold = registry
            .apply_patch(
                StyleId(0),
                &StylePatch {
                    font: FontPatch {
                        bold: Some(true),
                        ..FontPatch::default()
                    },
                    ..StylePatch::default()
                },
            )
            .unwrap();
        let xf = *registry.xf(bold).unwrap();
        assert_eq!(xf.fill_id, FillId(0));
        assert_eq!(xf.border_id, BorderId(0));
        assert_ne!(xf.font_id, FontId(0));

        let outlined = registry
            .apply_patch(
                bold,
                &StylePatch::border_edge(
                    BorderSide::All,
                    EdgePatch {
                        style: Some(BorderStyle::Thin),
                        color: None,
                    },
                ),
            )
            .unwrap();
        let xf2 = *registry.xf(outlined).unwrap();
        assert_eq!(xf2.font_id, xf.font_id);
        assert_eq!(
            registry.border(xf2.border_id).unwrap(),
            &Border::outline(BorderEdge::new(BorderStyle::Thin, Color::black()))
        );
    }

    #[test]
    fn failed_patch_leaves_registry_unchanged() {
        let mut registry = StyleRegistry::new();
        let patch = StylePatch {
            font: FontPatch {
                bold: Some(true),
                size: Some(0.0),
                ..FontPatch::default()
            },
            ..StylePatch::default()
        };
        assert!(registry.apply_patch(StyleId(0), &patch).is_err());
        assert_eq!(registry.fonts().len(), 1);
        assert_eq!(registry.style_count(), 1);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut registry = StyleRegistry::new();
        assert_eq!(
            registry.xf(StyleId(7)),
            Err(FormatError::UnknownId {
                kind: "style",
                id: 7
            })
        );
        let bad = CellXf {
            fill_id: FillId(3),
            ..CellXf::default()
        };
        assert!(registry.resolve_or_insert_xf(bad).is_err());
    }

    #[test]
    fn deserialize_rejects_dangling_facet_ids() {
        let json = r#"{"cell_xfs":[{"font_id":0},{"font_id":4}]}"#;
        assert!(serde_json::from_str::<StyleRegistry>(json).is_err());

        let restored: StyleRegistry = serde_json::from_str("{}").unwrap();
        assert_eq!(restored.style_count(), 1);
    }
}
