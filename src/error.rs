use thiserror::Error;

/// Failures of the table core: loading, column lookup and filtering.
///
/// Every variant is scoped to the single call that produced it. Nothing here
/// is retried and nothing is swallowed into an empty table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// The filename extension matches neither the delimited-text nor the
    /// spreadsheet family.
    #[error("Unsupported file extension: .{extension}")]
    UnsupportedFormat { extension: String },

    /// The content does not conform to its declared format (malformed CSV,
    /// corrupt workbook, duplicate header names, ragged columns, ...).
    #[error("Parse error: {0}")]
    Parse(String),

    /// A referenced column is not part of the table.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// The operation needs a different column type.
    #[error("Column '{column}' is {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A session operation was attempted before any table was loaded.
    #[error("No table loaded")]
    NoTable,
}

pub type Result<T, E = TableError> = std::result::Result<T, E>;

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        TableError::Parse(err.to_string())
    }
}

impl From<calamine::Error> for TableError {
    fn from(err: calamine::Error) -> Self {
        TableError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Parse(err.to_string())
    }
}
