//! ExportError for delimited text output

/// Error type for export operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The delimiter cannot be encoded as a single byte.
    #[error("Delimiter '{0}' is not a single-byte ASCII character")]
    InvalidDelimiter(char),

    /// The CSV writer rejected a record.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The produced bytes were not valid UTF-8.
    #[error("Export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
