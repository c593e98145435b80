use crate::{ColorParseError, SheetNameError};

/// Errors returned by workbook formatting operations.
///
/// Every failure is recoverable: operations validate their inputs before mutating, so an `Err`
/// leaves the workbook exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
    #[error("invalid range {range:?}: {reason}")]
    InvalidRange { range: String, reason: String },
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: u32 },
    #[error("a sheet named {0:?} already exists")]
    DuplicateSheetName(String),
    #[error("invalid sheet name {name:?}: {reason}")]
    InvalidSheetName {
        name: String,
        reason: SheetNameError,
    },
}

impl FormatError {
    pub(crate) fn invalid_parameters(msg: impl Into<String>) -> Self {
        FormatError::InvalidParameters(msg.into())
    }

    pub(crate) fn invalid_range(range: &str, reason: impl ToString) -> Self {
        FormatError::InvalidRange {
            range: range.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<ColorParseError> for FormatError {
    fn from(err: ColorParseError) -> Self {
        FormatError::InvalidParameters(err.to_string())
    }
}
