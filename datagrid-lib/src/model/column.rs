//! Column descriptors

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::CellValue;

/// Default width for a column created without an explicit width.
pub const DEFAULT_COLUMN_WIDTH: f64 = 150.0;

/// Column data type.
///
/// Drives value coercion, comparator selection and display formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Boolean,
    Date,
    Currency,
    Status,
    Link,
}

impl ColumnType {
    /// Returns `true` for types compared as plain numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Number | ColumnType::Currency)
    }

    /// Returns the lowercase type name.
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Currency => "currency",
            ColumnType::Status => "status",
            ColumnType::Link => "link",
        }
    }
}

/// Caller-supplied comparator. Replaces type-aware comparison and null
/// placement for its column; the sort direction is still applied on top.
pub type Comparator = Arc<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;

/// Column descriptor.
///
/// Columns are seeded once into the [`ColumnRegistry`](crate::columns::ColumnRegistry).
/// Descriptors deserialize from JSON with every capability defaulting to
/// enabled except `editable` and `sticky`.
///
/// # Examples
///
/// ```
/// use datagrid_lib::model::{Column, ColumnType};
///
/// let columns = vec![
///     Column::new("id", "ID").width(80.0).sticky(true),
///     Column::new("name", "Name").editable(true),
///     Column::new("age", "Age").column_type(ColumnType::Number),
///     Column::new("notes", "Notes").searchable(false).visible(false),
/// ];
/// assert_eq!(columns.len(), 4);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Column {
    /// Field name read from each row.
    pub field: String,
    /// Header text.
    pub header: String,
    /// Data type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Width in pixels.
    pub width: f64,
    /// Whether the column is shown.
    pub visible: bool,
    /// Initial order key. Ties and absent keys fall back to registration order.
    pub order: Option<i64>,
    pub sortable: bool,
    pub filterable: bool,
    pub searchable: bool,
    pub editable: bool,
    /// Pinned to a fixed horizontal offset during horizontal scroll.
    pub sticky: bool,
    /// Allowed values for `status` columns, offered by the status editor.
    pub options: Vec<String>,
    /// Custom comparator, not serialized.
    #[serde(skip)]
    pub comparator: Option<Comparator>,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            field: String::new(),
            header: String::new(),
            column_type: ColumnType::Text,
            width: DEFAULT_COLUMN_WIDTH,
            visible: true,
            order: None,
            sortable: true,
            filterable: true,
            searchable: true,
            editable: false,
            sticky: false,
            options: Vec::new(),
            comparator: None,
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("field", &self.field)
            .field("header", &self.header)
            .field("column_type", &self.column_type)
            .field("width", &self.width)
            .field("visible", &self.visible)
            .field("order", &self.order)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("searchable", &self.searchable)
            .field("editable", &self.editable)
            .field("sticky", &self.sticky)
            .field("options", &self.options)
            .field("comparator", &self.comparator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Column {
    /// Creates a text column with default width and capabilities.
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
            ..Default::default()
        }
    }

    /// Set the column type.
    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Set the width in pixels.
    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Set the initial order key.
    pub fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    /// Set the allowed values for a status column.
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Install a custom comparator.
    pub fn comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }
}
