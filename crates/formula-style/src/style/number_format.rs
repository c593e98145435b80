use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

use super::NumFmtId;
use crate::FormatError;

/// First id SpreadsheetML leaves free for workbook-defined number formats.
pub const FIRST_CUSTOM_NUM_FMT_ID: u16 = 164;

/// The format code for the default (`General`) number format.
pub const GENERAL_FORMAT: &str = "General";

/// Built-in number formats (en-US rendering of the locale-dependent ones).
const BUILTIN_NUMBER_FORMATS: &[(u16, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (5, "$#,##0_);($#,##0)"),
    (6, "$#,##0_);[Red]($#,##0)"),
    (7, "$#,##0.00_);($#,##0.00)"),
    (8, "$#,##0.00_);[Red]($#,##0.00)"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (41, r#"_(* #,##0_);_(* \(#,##0\);_(* "-"_);_(@_)"#),
    (42, r#"_("$"* #,##0_);_("$"* \(#,##0\);_("$"* "-"_);_(@_)"#),
    (43, r#"_(* #,##0.00_);_(* \(#,##0.00\);_(* "-"??_);_(@_)"#),
    (44, r#"_("$"* #,##0.00_);_("$"* \(#,##0.00\);_("$"* "-"??_);_(@_)"#),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

/// Format code of a built-in number format id.
pub fn builtin_format_code(id: u16) -> Option<&'static str> {
    BUILTIN_NUMBER_FORMATS
        .iter()
        .find(|(builtin_id, _)| *builtin_id == id)
        .map(|(_, code)| *code)
}

/// Built-in id of a format code, if the code is one of the built-ins.
///
/// `General` matches case-insensitively; every other code must match exactly.
pub fn builtin_format_id(code: &str) -> Option<u16> {
    if code.eq_ignore_ascii_case(GENERAL_FORMAT) {
        return Some(0);
    }
    BUILTIN_NUMBER_FORMATS
        .iter()
        .find(|(_, builtin)| *builtin == code)
        .map(|(id, _)| *id)
}

/// Number format facet table.
///
/// Built-in codes resolve to their fixed ids; anything else is assigned the next free id at or
/// above [`FIRST_CUSTOM_NUM_FMT_ID`]. Custom ids are never reused within a workbook.
#[derive(Clone, Debug, Serialize)]
pub struct NumberFormatTable {
    custom: BTreeMap<u16, String>,
    #[serde(skip)]
    id_by_code: HashMap<String, u16>,
    #[serde(skip)]
    next_custom_id: u16,
}

impl Default for NumberFormatTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberFormatTable {
    pub fn new() -> Self {
        Self {
            custom: BTreeMap::new(),
            id_by_code: HashMap::new(),
            next_custom_id: FIRST_CUSTOM_NUM_FMT_ID,
        }
    }

    /// Look up (or allocate) the id for `code`.
    pub fn resolve_or_insert(&mut self, code: &str) -> Result<NumFmtId, FormatError> {
        validate_format_code(code)?;

        if let Some(id) = builtin_format_id(code) {
            return Ok(NumFmtId(id));
        }
        if let Some(id) = self.id_by_code.get(code) {
            return Ok(NumFmtId(*id));
        }

        let id = self.next_custom_id;
        if id == u16::MAX {
            return Err(FormatError::invalid_parameters(
                "no custom number format ids left",
            ));
        }
        self.next_custom_id += 1;
        self.custom.insert(id, code.to_string());
        self.id_by_code.insert(code.to_string(), id);
        log::debug!("registered custom number format {id}: {code:?}");
        Ok(NumFmtId(id))
    }

    /// Format code for `id`, built-in or custom.
    pub fn code(&self, id: NumFmtId) -> Result<&str, FormatError> {
        builtin_format_code(id.0)
            .or_else(|| self.custom.get(&id.0).map(String::as_str))
            .ok_or(FormatError::UnknownId {
                kind: "number format",
                id: u32::from(id.0),
            })
    }

    pub fn contains(&self, id: NumFmtId) -> bool {
        self.code(id).is_ok()
    }

    /// Workbook-defined formats in id order.
    pub fn custom_formats(&self) -> impl Iterator<Item = (NumFmtId, &str)> {
        self.custom
            .iter()
            .map(|(id, code)| (NumFmtId(*id), code.as_str()))
    }

    fn rebuild_index(&mut self) {
        self.id_by_code.clear();
        for (id, code) in &self.custom {
            if self.id_by_code.contains_key(code) {
                log::warn!(
                    "number format {code:?} is registered more than once; keeping the lowest id"
                );
                continue;
            }
            self.id_by_code.insert(code.clone(), *id);
        }
        self.next_custom_id = self
            .custom
            .keys()
            .next_back()
            .map(|max| max.saturating_add(1))
            .unwrap_or(FIRST_CUSTOM_NUM_FMT_ID)
            .max(FIRST_CUSTOM_NUM_FMT_ID);
    }
}

pub(crate) fn validate_format_code(code: &str) -> Result<(), FormatError> {
    if code.trim().is_empty() {
        return Err(FormatError::invalid_parameters(
            "number format code cannot be empty",
        ));
    }
    Ok(())
}

impl<'de> Deserialize<'de> for NumberFormatTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(default)]
            custom: BTreeMap<u16, String>,
        }

        let helper = Helper::deserialize(deserializer)?;
        let mut table = NumberFormatTable {
            custom: helper.custom,
            ..NumberFormatTable::new()
        };
        table.custom.retain(|id, code| {
            let keep = *id >= FIRST_CUSTOM_NUM_FMT_ID;
            if !keep {
                log::warn!("dropping custom number format {code:?} with reserved id {id}");
            }
            keep
        });
        table.rebuild_index();
        Ok(table)
    }
}
