//! Free-text search across searchable columns.

use crate::columns::ColumnRegistry;
use crate::model::{Column, GridRow};

/// A case-insensitive substring query.
///
/// A row matches if any searchable column's string form contains the query.
/// Search is always an OR across columns, independent of the filter logic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    needle: String,
}

impl SearchQuery {
    /// Creates a query. An empty query matches every row.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let needle = text.to_lowercase();
        Self { text, needle }
    }

    /// The query as typed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns `true` if any of `columns` contains the query.
    pub fn matches<R: GridRow>(&self, row: &R, columns: &[&Column]) -> bool {
        if self.is_empty() {
            return true;
        }
        columns.iter().any(|column| {
            row.value(&column.field)
                .to_text()
                .to_lowercase()
                .contains(&self.needle)
        })
    }
}

/// Columns that take part in search, in display order.
pub fn searchable_columns(registry: &ColumnRegistry) -> Vec<&Column> {
    registry.ordered().filter(|c| c.searchable).collect()
}

/// The subset of `indices` whose rows match the query, order preserved.
pub fn search_indices<R: GridRow>(
    rows: &[R],
    indices: &[usize],
    registry: &ColumnRegistry,
    query: &SearchQuery,
) -> Vec<usize> {
    if query.is_empty() {
        return indices.to_vec();
    }
    let columns = searchable_columns(registry);
    indices
        .iter()
        .copied()
        .filter(|&i| rows.get(i).is_some_and(|row| query.matches(row, &columns)))
        .collect()
}
