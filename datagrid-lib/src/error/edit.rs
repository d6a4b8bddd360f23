//! EditError for the inline-edit session

/// Error type for inline-edit operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// There is no cell in edit mode.
    #[error("No cell is being edited")]
    NoSession,

    /// The row addressed by the edit is not in the current row set.
    #[error("Row '{row_key}' not found")]
    UnknownRow { row_key: String },
}
