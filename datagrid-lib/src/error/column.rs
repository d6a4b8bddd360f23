//! ColumnError for registry lookups and capability checks

/// Error type for operations addressed to a column by field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    /// No column is registered under this field.
    #[error("Column '{field}' not found")]
    Unknown { field: String },

    /// The column does not allow sorting.
    #[error("Column '{field}' is not sortable")]
    NotSortable { field: String },

    /// The column does not allow filtering.
    #[error("Column '{field}' is not filterable")]
    NotFilterable { field: String },

    /// The column does not allow inline editing.
    #[error("Column '{field}' is not editable")]
    NotEditable { field: String },
}

impl ColumnError {
    /// Creates a new unknown column error.
    pub fn unknown(field: impl Into<String>) -> Self {
        Self::Unknown {
            field: field.into(),
        }
    }

    /// Returns the field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::Unknown { field }
            | Self::NotSortable { field }
            | Self::NotFilterable { field }
            | Self::NotEditable { field } => field,
        }
    }
}
