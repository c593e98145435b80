use core::fmt;

use unicode_normalization::UnicodeNormalization;

/// Excel limits worksheet names to 31 characters.
pub const EXCEL_MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Why a worksheet name was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetNameError {
    Empty,
    TooLong,
    ForbiddenCharacter(char),
    LeadingOrTrailingApostrophe,
}

impl fmt::Display for SheetNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetNameError::Empty => f.write_str("sheet name cannot be empty"),
            SheetNameError::TooLong => write!(
                f,
                "sheet name cannot exceed {EXCEL_MAX_SHEET_NAME_LEN} characters"
            ),
            SheetNameError::ForbiddenCharacter(ch) => {
                write!(f, "sheet name cannot contain '{ch}'")
            }
            SheetNameError::LeadingOrTrailingApostrophe => {
                f.write_str("sheet name cannot begin or end with an apostrophe")
            }
        }
    }
}

impl std::error::Error for SheetNameError {}

/// Validate a worksheet name against Excel's rules.
pub fn validate_sheet_name(name: &str) -> Result<(), SheetNameError> {
    if name.trim().is_empty() {
        return Err(SheetNameError::Empty);
    }
    // Excel counts UTF-16 code units.
    if name.encode_utf16().count() > EXCEL_MAX_SHEET_NAME_LEN {
        return Err(SheetNameError::TooLong);
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_SHEET_NAME_CHARS.contains(c)) {
        return Err(SheetNameError::ForbiddenCharacter(ch));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(SheetNameError::LeadingOrTrailingApostrophe);
    }
    Ok(())
}

/// Case-folded key used for sheet name comparisons.
///
/// Excel treats sheet names case-insensitively across Unicode, and compatibility-equivalent
/// forms (e.g. full-width Latin letters) collide.
pub fn sheet_name_casefold(name: &str) -> String {
    if name.is_ascii() {
        return name.to_ascii_uppercase();
    }
    name.nfkc().flat_map(char::to_uppercase).collect()
}

pub fn sheet_name_eq_case_insensitive(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    sheet_name_casefold(a) == sheet_name_casefold(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_excel_invalid_names() {
        assert_eq!(validate_sheet_name(""), Err(SheetNameError::Empty));
        assert_eq!(
            validate_sheet_name("a/b"),
            Err(SheetNameError::ForbiddenCharacter('/'))
        );
        assert_eq!(
            validate_sheet_name("'quoted"),
            Err(SheetNameError::LeadingOrTrailingApostrophe)
        );
        assert_eq!(
            validate_sheet_name(&"x".repeat(32)),
            Err(SheetNameError::TooLong)
        );
        assert!(validate_sheet_name("Budget 2024").is_ok());
    }

    #[test]
    fn comparison_is_unicode_case_insensitive() {
        assert!(sheet_name_eq_case_insensitive("Sheet1", "SHEET1"));
        assert!(sheet_name_eq_case_insensitive("Straße", "STRASSE"));
        assert!(sheet_name_eq_case_insensitive("ＡＢＣ", "abc"));
        assert!(!sheet_name_eq_case_insensitive("Sheet1", "Sheet2"));
    }
}
