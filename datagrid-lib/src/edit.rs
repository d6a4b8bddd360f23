//! Inline-edit session.
//!
//! At most one cell is in edit mode. Entering edit copies the current value
//! into a scratch buffer; committing hands the scratch value out as a
//! [`CellEdit`], cancelling drops it.

use crate::columns::ColumnRegistry;
use crate::error::{ColumnError, EditError};
use crate::model::{CellValue, ColumnType, parse_number, parse_timestamp};

/// Scratch editor presented for a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    Text,
    Number,
    Boolean,
    Date,
    /// Choice among the column's enumerated options.
    Status,
}

impl EditorKind {
    pub fn for_column(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Number | ColumnType::Currency => Self::Number,
            ColumnType::Boolean => Self::Boolean,
            ColumnType::Date => Self::Date,
            ColumnType::Status => Self::Status,
            ColumnType::Text | ColumnType::Link => Self::Text,
        }
    }

    /// Interprets raw editor input.
    ///
    /// Input the editor cannot interpret is kept as text so the commit still
    /// carries exactly what the user typed.
    pub fn parse_input(self, input: &str) -> CellValue {
        let trimmed = input.trim();
        match self {
            Self::Number => match parse_number(trimmed) {
                Some(n) => CellValue::Number(n),
                None if trimmed.is_empty() => CellValue::Missing,
                None => CellValue::Text(input.to_string()),
            },
            Self::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => CellValue::Boolean(true),
                "false" | "no" | "0" => CellValue::Boolean(false),
                "" => CellValue::Missing,
                _ => CellValue::Text(input.to_string()),
            },
            Self::Date => match parse_timestamp(trimmed) {
                Some(ts) => CellValue::Timestamp(ts),
                None if trimmed.is_empty() => CellValue::Missing,
                None => CellValue::Text(input.to_string()),
            },
            Self::Text | Self::Status => CellValue::Text(input.to_string()),
        }
    }
}

/// A committed edit, ready for the edit callback.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub row_key: String,
    pub field: String,
    pub value: CellValue,
}

/// The cell currently in edit mode.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub row_key: String,
    pub field: String,
    pub editor: EditorKind,
    /// Value as it was when editing began.
    pub original: CellValue,
    /// Value the commit will carry.
    pub scratch: CellValue,
}

impl EditSession {
    pub fn is_dirty(&self) -> bool {
        self.scratch != self.original
    }
}

/// Holds the single active [`EditSession`].
#[derive(Debug, Default)]
pub struct InlineEditor {
    session: Option<EditSession>,
}

impl InlineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters edit mode on a cell.
    ///
    /// Re-entering the active cell keeps its scratch buffer. Entering a
    /// different cell commits the active one first; that commit is returned
    /// so the caller can forward it.
    pub fn begin(
        &mut self,
        registry: &ColumnRegistry,
        row_key: &str,
        field: &str,
        current: CellValue,
    ) -> Result<Option<CellEdit>, ColumnError> {
        let column = registry.require(field)?;
        if !column.editable {
            return Err(ColumnError::NotEditable {
                field: field.to_string(),
            });
        }

        if let Some(active) = &self.session
            && active.row_key == row_key
            && active.field == field
        {
            return Ok(None);
        }

        let previous = self.commit().ok();
        let editor = EditorKind::for_column(column.column_type);
        let original = current.coerce(column.column_type);
        log::debug!("Editing {}.{} with {:?} editor", row_key, field, editor);
        self.session = Some(EditSession {
            row_key: row_key.to_string(),
            field: field.to_string(),
            editor,
            scratch: original.clone(),
            original,
        });
        Ok(previous)
    }

    pub fn active(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_editing(&self, row_key: &str, field: &str) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.row_key == row_key && s.field == field)
    }

    /// Replaces the scratch value.
    pub fn update(&mut self, value: CellValue) -> Result<(), EditError> {
        let session = self.session.as_mut().ok_or(EditError::NoSession)?;
        session.scratch = value;
        Ok(())
    }

    /// Replaces the scratch value with parsed editor input.
    pub fn update_text(&mut self, input: &str) -> Result<(), EditError> {
        let session = self.session.as_mut().ok_or(EditError::NoSession)?;
        session.scratch = session.editor.parse_input(input);
        Ok(())
    }

    /// Ends the session, returning the scratch value for the edit callback.
    pub fn commit(&mut self) -> Result<CellEdit, EditError> {
        let session = self.session.take().ok_or(EditError::NoSession)?;
        log::debug!("Committed edit on {}.{}", session.row_key, session.field);
        Ok(CellEdit {
            row_key: session.row_key,
            field: session.field,
            value: session.scratch,
        })
    }

    /// Ends the session without producing an edit.
    pub fn cancel(&mut self) -> Option<EditSession> {
        let session = self.session.take();
        if let Some(session) = &session {
            log::debug!("Cancelled edit on {}.{}", session.row_key, session.field);
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    fn registry() -> ColumnRegistry {
        ColumnRegistry::new(vec![
            Column::new("name", "Name").editable(true),
            Column::new("age", "Age")
                .column_type(ColumnType::Number)
                .editable(true),
            Column::new("id", "ID"),
        ])
    }

    #[test]
    fn test_number_input_parsing() {
        assert_eq!(EditorKind::Number.parse_input(" 42 "), CellValue::Number(42.0));
        assert_eq!(EditorKind::Number.parse_input(""), CellValue::Missing);
        assert_eq!(
            EditorKind::Number.parse_input("abc"),
            CellValue::Text("abc".to_string())
        );
    }

    #[test]
    fn test_begin_rejects_read_only_column() {
        let mut editor = InlineEditor::new();
        let err = editor
            .begin(&registry(), "1", "id", CellValue::from("x"))
            .unwrap_err();
        assert!(matches!(err, ColumnError::NotEditable { .. }));
        assert!(editor.active().is_none());
    }

    #[test]
    fn test_switching_cells_commits_previous() {
        let registry = registry();
        let mut editor = InlineEditor::new();
        editor.begin(&registry, "1", "name", CellValue::from("Ann")).unwrap();
        editor.update_text("Anne").unwrap();

        let previous = editor
            .begin(&registry, "1", "age", CellValue::from(30))
            .unwrap()
            .unwrap();
        assert_eq!(previous.field, "name");
        assert_eq!(previous.value, CellValue::from("Anne"));
        assert!(editor.is_editing("1", "age"));
    }

    #[test]
    fn test_cancel_produces_no_edit() {
        let registry = registry();
        let mut editor = InlineEditor::new();
        editor.begin(&registry, "1", "name", CellValue::from("Ann")).unwrap();
        assert!(editor.cancel().is_some());
        assert_eq!(editor.commit(), Err(EditError::NoSession));
    }
}
