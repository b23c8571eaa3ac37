//! Error types for the statement cleaner.

use thiserror::Error;

/// Result type alias for cleaner operations
pub type Result<T> = std::result::Result<T, CleanerError>;

/// Errors that can occur while opening or cleaning a workbook.
#[derive(Error, Debug)]
pub enum CleanerError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook is not a readable zip container
    #[error("workbook archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A workbook part is not well-formed XML
    #[error("workbook XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A part the workbook refers to is absent or unusable
    #[error("workbook part {part}: {message}")]
    MissingPart { part: String, message: String },

    /// A cell or range reference could not be decoded
    #[error("invalid cell reference {reference:?} in sheet {sheet}")]
    InvalidCellRef { sheet: String, reference: String },

    /// A structural row operation addressed a row that does not exist
    #[error("row {row} out of range in sheet {sheet} ({len} rows)")]
    RowOutOfRange { sheet: String, row: usize, len: usize },

    /// Layout addresses a column the row-width guard does not cover
    #[error("every column index must be below --min-row-width ({min_row_width})")]
    InvalidLayout { min_row_width: usize },

    /// Neither bucket received a record
    #[error("No data processed from the file")]
    EmptyResult,
}

impl CleanerError {
    /// Returns `true` for errors that mean the workbook itself could not be
    /// opened or restructured, as opposed to an empty but valid result.
    pub fn is_format_error(&self) -> bool {
        !matches!(
            self,
            CleanerError::EmptyResult | CleanerError::InvalidLayout { .. }
        )
    }
}

impl From<quick_xml::events::attributes::AttrError> for CleanerError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        CleanerError::Xml(quick_xml::Error::InvalidAttr(err))
    }
}
