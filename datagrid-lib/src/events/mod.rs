//! Grid output events and the listener subscription service

mod listeners;

pub use listeners::*;

use crate::model::CellValue;
use crate::query::{FilterSet, SortState};

/// Notification emitted by a [`Grid`](crate::Grid) for its host.
///
/// Events are queued while the grid processes input and drained with
/// [`Grid::take_events`](crate::Grid::take_events).
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent<R> {
    /// Sort state changed. Only emitted in server-side processing mode.
    SortChanged(SortState),
    /// Filter map changed. Only emitted in server-side processing mode.
    FilterChanged(FilterSet),
    /// Selection changed; carries the currently selected rows.
    RowSelect(Vec<R>),
    /// An inline edit was committed. `row` is the row as it was before the edit.
    CellEdit {
        row: R,
        field: String,
        value: CellValue,
    },
    /// A row was clicked.
    RowClick(R),
    /// The infinite-scroll controller wants the next page.
    LoadMore,
}
