//! Column registry.
//!
//! Columns live in an arena in registration order. Display order is a
//! separate permutation over that arena, so every reorder is a single
//! remove/insert on the permutation and the order keys stay a strict total
//! order without renumbering.

use crate::error::ColumnError;
use crate::model::Column;

/// Minimum column width in pixels unless configured otherwise.
pub const DEFAULT_MIN_WIDTH: f64 = 50.0;

/// Holds the column descriptors for one grid.
#[derive(Debug, Clone)]
pub struct ColumnRegistry {
    /// Columns in registration order.
    columns: Vec<Column>,
    /// Display order: `order[position]` is an index into `columns`.
    order: Vec<usize>,
    min_width: f64,
}

impl ColumnRegistry {
    /// Seeds a registry with the default minimum width.
    pub fn new(columns: Vec<Column>) -> Self {
        Self::with_min_width(columns, DEFAULT_MIN_WIDTH)
    }

    /// Seeds a registry.
    ///
    /// Later duplicates of a field are dropped. Widths are clamped to
    /// `min_width`. Display order follows each column's `order` key, ties and
    /// absent keys broken by registration index.
    pub fn with_min_width(columns: Vec<Column>, min_width: f64) -> Self {
        let min_width = if min_width.is_finite() {
            min_width.max(0.0)
        } else {
            DEFAULT_MIN_WIDTH
        };

        let mut seeded: Vec<Column> = Vec::with_capacity(columns.len());
        for mut column in columns {
            if seeded.iter().any(|c| c.field == column.field) {
                log::warn!("Dropping duplicate column '{}'", column.field);
                continue;
            }
            column.width = clamp_width(column.width, min_width);
            seeded.push(column);
        }

        let mut order: Vec<usize> = (0..seeded.len()).collect();
        // Registration index is the secondary key, so a stable sort is enough.
        order.sort_by_key(|&i| seeded[i].order.unwrap_or(i as i64));

        Self {
            columns: seeded,
            order,
            min_width,
        }
    }

    /// Minimum column width.
    pub fn min_width(&self) -> f64 {
        self.min_width
    }

    /// Number of registered columns, visible or not.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if no columns are registered.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns `true` if a column is registered under this field.
    pub fn contains(&self, field: &str) -> bool {
        self.arena_index(field).is_some()
    }

    /// Looks up a column by field.
    pub fn get(&self, field: &str) -> Option<&Column> {
        self.arena_index(field).map(|i| &self.columns[i])
    }

    /// Looks up a column, failing with [`ColumnError::Unknown`].
    pub fn require(&self, field: &str) -> Result<&Column, ColumnError> {
        self.get(field).ok_or_else(|| ColumnError::unknown(field))
    }

    /// Looks up a column that allows sorting.
    pub fn require_sortable(&self, field: &str) -> Result<&Column, ColumnError> {
        let column = self.require(field)?;
        if !column.sortable {
            return Err(ColumnError::NotSortable {
                field: field.to_string(),
            });
        }
        Ok(column)
    }

    /// Looks up a column that allows filtering.
    pub fn require_filterable(&self, field: &str) -> Result<&Column, ColumnError> {
        let column = self.require(field)?;
        if !column.filterable {
            return Err(ColumnError::NotFilterable {
                field: field.to_string(),
            });
        }
        Ok(column)
    }

    /// All columns in display order.
    pub fn ordered(&self) -> impl Iterator<Item = &Column> {
        self.order.iter().map(|&i| &self.columns[i])
    }

    /// Visible columns in display order.
    pub fn visible(&self) -> Vec<&Column> {
        self.ordered().filter(|c| c.visible).collect()
    }

    /// Order key of a column: its position in the display order.
    pub fn position(&self, field: &str) -> Option<usize> {
        let index = self.arena_index(field)?;
        self.order.iter().position(|&i| i == index)
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Sets a column width, clamped to `[min_width, ∞)`. Returns the width applied.
    pub fn set_width(&mut self, field: &str, width: f64) -> Result<f64, ColumnError> {
        let min_width = self.min_width;
        let column = self.get_mut(field)?;
        column.width = clamp_width(width, min_width);
        Ok(column.width)
    }

    /// Shows or hides a column. The registry entry and its order are kept.
    pub fn set_visible(&mut self, field: &str, visible: bool) -> Result<(), ColumnError> {
        self.get_mut(field)?.visible = visible;
        Ok(())
    }

    /// Moves `dragged` into `target`'s slot.
    ///
    /// Every column between the two old positions, the target included, shifts
    /// one slot toward the dragged column's old position.
    pub fn reorder(&mut self, dragged: &str, target: &str) -> Result<(), ColumnError> {
        let to = self
            .position(target)
            .ok_or_else(|| ColumnError::unknown(target))?;
        self.move_to(dragged, to)
    }

    /// Places `field` immediately before `target`.
    pub fn move_before(&mut self, field: &str, target: &str) -> Result<(), ColumnError> {
        let from = self.position(field).ok_or_else(|| ColumnError::unknown(field))?;
        let to = self
            .position(target)
            .ok_or_else(|| ColumnError::unknown(target))?;
        // Removing `field` first shifts a later target one slot left.
        let to = if from < to { to - 1 } else { to };
        self.move_to(field, to)
    }

    /// Places `field` immediately after `target`.
    pub fn move_after(&mut self, field: &str, target: &str) -> Result<(), ColumnError> {
        let from = self.position(field).ok_or_else(|| ColumnError::unknown(field))?;
        let to = self
            .position(target)
            .ok_or_else(|| ColumnError::unknown(target))?;
        let to = if from < to { to } else { to + 1 };
        self.move_to(field, to)
    }

    /// Moves a column to a display position, clamped to the last slot.
    pub fn move_to(&mut self, field: &str, position: usize) -> Result<(), ColumnError> {
        let from = self.position(field).ok_or_else(|| ColumnError::unknown(field))?;
        let to = position.min(self.order.len().saturating_sub(1));
        if from != to {
            let index = self.order.remove(from);
            self.order.insert(to, index);
            log::debug!("Moved column '{}' from {} to {}", field, from, to);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    /// Cumulative width of the visible sticky columns preceding `field`.
    ///
    /// `None` for unknown or non-sticky columns.
    pub fn sticky_offset(&self, field: &str) -> Option<f64> {
        if !self.get(field)?.sticky {
            return None;
        }
        let mut offset = 0.0;
        for column in self.ordered() {
            if column.field == field {
                return Some(offset);
            }
            if column.visible && column.sticky {
                offset += column.width;
            }
        }
        None
    }

    /// Sum of visible column widths.
    pub fn total_width(&self) -> f64 {
        self.ordered()
            .filter(|c| c.visible)
            .map(|c| c.width)
            .sum()
    }

    /// Finds the visible column under an x-coordinate measured from the grid's
    /// left content edge.
    pub fn column_at_x(&self, x: f64) -> Option<&Column> {
        if x < 0.0 {
            return None;
        }
        let mut left = 0.0;
        for column in self.ordered().filter(|c| c.visible) {
            let right = left + column.width;
            if x >= left && x < right {
                return Some(column);
            }
            left = right;
        }
        None
    }

    fn arena_index(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    fn get_mut(&mut self, field: &str) -> Result<&mut Column, ColumnError> {
        self.columns
            .iter_mut()
            .find(|c| c.field == field)
            .ok_or_else(|| ColumnError::unknown(field))
    }
}

fn clamp_width(width: f64, min_width: f64) -> f64 {
    if width.is_finite() {
        width.max(min_width)
    } else {
        min_width
    }
}
