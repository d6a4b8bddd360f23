//! The grid facade.
//!
//! [`Grid`] owns every piece of grid state and is the only type a host needs
//! to drive. User-interaction methods never fail: unknown fields and
//! operations a column does not support are ignored and logged, and the
//! method reports whether anything changed.

use std::time::Instant;

use crate::columns::{ColumnRegistry, DragController};
use crate::config::GridConfig;
use crate::edit::{CellEdit, EditSession, InlineEditor};
use crate::error::{EditError, ExportError};
use crate::events::{GridEvent, ListenerKind, ListenerRegistry, Subscription};
use crate::export::{ExportArtifact, ExportFormat, ExportOrder, Exporter};
use crate::model::{Column, GridRow, Record, rows_from_json};
use crate::pipeline::{DerivedRows, PipelineInputs, PipelineStats, Revision, RowIndices};
use crate::query::{FilterLogic, FilterPredicate, FilterSet, SearchQuery, SortGesture, SortState};
use crate::render::{CellDisplay, format_cell, header_label};
use crate::selection::{Selection, SelectionMode};
use crate::viewport::{
    InfiniteScroll, LoadFlags, LoadState, ScrollDirection, ScrollMetrics, ViewportState,
    VisibleWindow,
};

/// A virtualized data grid over rows of type `R`.
///
/// # Example
///
/// ```
/// use datagrid_lib::{Grid, GridConfig};
/// use datagrid_lib::model::{Column, ColumnType, GridRow, Record};
/// use datagrid_lib::query::FilterPredicate;
///
/// let columns = vec![Column::new("age", "Age").column_type(ColumnType::Number)];
/// let mut grid = Grid::new(columns, GridConfig::default());
/// grid.set_rows(vec![
///     Record::new("a").set("age", 5),
///     Record::new("b").set("age", "x"),
///     Record::new("c"),
/// ]);
/// grid.set_filter(FilterPredicate::gt("age", "3"));
///
/// let keys: Vec<_> = grid.derived_rows().iter().map(|r| r.key().to_string()).collect();
/// assert_eq!(keys, vec!["a"]);
/// ```
#[derive(Debug)]
pub struct Grid<R: GridRow> {
    config: GridConfig,
    registry: ColumnRegistry,

    rows: Vec<R>,
    rows_rev: Revision,
    filters: FilterSet,
    filters_rev: Revision,
    filter_logic: FilterLogic,
    search: SearchQuery,
    search_rev: Revision,
    sort: SortState,
    sort_rev: Revision,
    derived: DerivedRows,

    viewport: ViewportState,
    infinite: InfiniteScroll,
    load_flags: LoadFlags,

    listeners: ListenerRegistry,
    /// Scroll and resize subscriptions held while mounted.
    mounted: Vec<Subscription>,
    drag: DragController,
    editor: InlineEditor,
    selection: Selection<String>,

    events: Vec<GridEvent<R>>,
}

impl<R: GridRow> Grid<R> {
    /// Creates a grid with its own listener registry.
    pub fn new(columns: Vec<Column>, config: GridConfig) -> Self {
        Self::with_listeners(columns, config, ListenerRegistry::new())
    }

    /// Creates a grid that takes its subscriptions from a shared registry.
    pub fn with_listeners(
        columns: Vec<Column>,
        config: GridConfig,
        listeners: ListenerRegistry,
    ) -> Self {
        let registry = ColumnRegistry::with_min_width(columns, config.min_column_width);
        let viewport = ViewportState::new(config.row_height, 0.0, config.buffer);
        let infinite = InfiniteScroll::new(config.load_threshold, config.load_debounce());
        log::debug!(
            "Grid created with {} columns (server_side: {})",
            registry.len(),
            config.server_side
        );

        Self {
            filter_logic: config.filter_logic,
            selection: Selection::new(config.selection_mode),
            registry,
            rows: Vec::new(),
            rows_rev: Revision::default(),
            filters: FilterSet::new(),
            filters_rev: Revision::default(),
            search: SearchQuery::default(),
            search_rev: Revision::default(),
            sort: SortState::Unsorted,
            sort_rev: Revision::default(),
            derived: DerivedRows::new(),
            viewport,
            infinite,
            load_flags: LoadFlags::default(),
            drag: DragController::new(listeners.clone()),
            listeners,
            mounted: Vec::new(),
            editor: InlineEditor::new(),
            events: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    /// Visible columns in display order.
    pub fn columns(&self) -> Vec<&Column> {
        self.registry.visible()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Drains the queued output events.
    pub fn take_events(&mut self) -> Vec<GridEvent<R>> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Attaches the scroll and resize listeners. Idempotent.
    pub fn mount(&mut self) {
        if self.is_mounted() {
            return;
        }
        self.mounted = vec![
            self.listeners.attach(ListenerKind::Scroll),
            self.listeners.attach(ListenerKind::Resize),
        ];
        log::debug!("Grid mounted");
    }

    /// Releases every listener and clears transient interaction state.
    pub fn unmount(&mut self) {
        self.drag.cancel();
        self.infinite.cancel();
        self.editor.cancel();
        if self.is_mounted() {
            self.mounted.clear();
            log::debug!("Grid unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.mounted.is_empty()
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Replaces the row set.
    ///
    /// A new row set resets scrolling, selection and any edit in progress.
    /// In client-side mode it also clears filters, search and sort; in
    /// server-side mode those describe the query that produced the rows and
    /// are kept.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        log::debug!("Replacing {} rows with {}", self.rows.len(), rows.len());
        self.rows = rows;
        self.rows_rev.bump();

        if self.config.server_side {
            let keys: std::collections::HashSet<String> =
                self.rows.iter().map(|r| r.key()).collect();
            self.selection.retain(|k| keys.contains(k));
        } else {
            if !self.filters.is_empty() {
                self.filters.clear();
                self.filters_rev.bump();
            }
            if !self.search.is_empty() {
                self.search = SearchQuery::default();
                self.search_rev.bump();
            }
            if self.sort.is_sorted() {
                self.sort = SortState::Unsorted;
                self.sort_rev.bump();
            }
            self.selection.clear();
        }

        self.editor.cancel();
        self.infinite.reset();
        self.viewport.scroll_offset = 0.0;
    }

    /// Appends a page of rows, keeping every piece of view state.
    pub fn append_rows(&mut self, rows: impl IntoIterator<Item = R>) {
        let before = self.rows.len();
        self.rows.extend(rows);
        if self.rows.len() != before {
            log::debug!("Appended {} rows", self.rows.len() - before);
            self.rows_rev.bump();
        }
    }

    /// Raw rows in source order.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn row_by_key(&self, key: &str) -> Option<&R> {
        self.rows.iter().find(|r| r.key() == key)
    }

    fn row_position(&self, key: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.key() == key)
    }

    // =========================================================================
    // Derived rows
    // =========================================================================

    fn inputs(&self) -> PipelineInputs<'_, R> {
        PipelineInputs {
            rows: &self.rows,
            rows_rev: self.rows_rev,
            registry: &self.registry,
            filters: &self.filters,
            filters_rev: self.filters_rev,
            logic: self.filter_logic,
            search: &self.search,
            search_rev: self.search_rev,
            sort: &self.sort,
            sort_rev: self.sort_rev,
            server_side: self.config.server_side,
        }
    }

    /// Indices of the filtered and searched rows, in source order.
    pub fn filtered_indices(&mut self) -> RowIndices {
        let mut derived = std::mem::take(&mut self.derived);
        let indices = derived.searched(&self.inputs());
        self.derived = derived;
        indices
    }

    /// Indices of the derived rows in display order.
    pub fn derived_indices(&mut self) -> RowIndices {
        let mut derived = std::mem::take(&mut self.derived);
        let indices = derived.sorted(&self.inputs());
        self.derived = derived;
        indices
    }

    /// Derived rows in display order.
    pub fn derived_rows(&mut self) -> Vec<&R> {
        let indices = self.derived_indices();
        indices.iter().filter_map(|&i| self.rows.get(i)).collect()
    }

    pub fn derived_len(&mut self) -> usize {
        self.derived_indices().len()
    }

    pub fn pipeline_stats(&self) -> PipelineStats {
        self.derived.stats()
    }

    // =========================================================================
    // Filter and search
    // =========================================================================

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Sets the predicate for a column. An inactive predicate (one that
    /// needs a value but has none) removes the column's filter.
    pub fn set_filter(&mut self, predicate: FilterPredicate) -> bool {
        if let Err(e) = self.registry.require_filterable(&predicate.field) {
            log::debug!("Ignoring filter: {}", e);
            return false;
        }

        let changed = if predicate.is_active() {
            let previous = self.filters.insert(predicate.clone());
            previous.as_ref() != Some(&predicate)
        } else {
            self.filters.remove(&predicate.field).is_some()
        };
        if changed {
            self.filters_changed();
        }
        changed
    }

    pub fn clear_filter(&mut self, field: &str) -> bool {
        let changed = self.filters.remove(field).is_some();
        if changed {
            self.filters_changed();
        }
        changed
    }

    pub fn clear_filters(&mut self) -> bool {
        if self.filters.is_empty() {
            return false;
        }
        self.filters.clear();
        self.filters_changed();
        true
    }

    pub fn filter_logic(&self) -> FilterLogic {
        self.filter_logic
    }

    pub fn set_filter_logic(&mut self, logic: FilterLogic) -> bool {
        if self.filter_logic == logic {
            return false;
        }
        self.filter_logic = logic;
        self.filters_changed();
        true
    }

    fn filters_changed(&mut self) {
        self.filters_rev.bump();
        self.scroll_to_top();
        if self.config.server_side {
            self.events.push(GridEvent::FilterChanged(self.filters.clone()));
        }
    }

    pub fn search(&self) -> &SearchQuery {
        &self.search
    }

    /// Sets the free-text search. Search is local only and ignored by
    /// server-side processing.
    pub fn set_search(&mut self, text: impl Into<String>) -> bool {
        let query = SearchQuery::new(text);
        if query == self.search {
            return false;
        }
        self.search = query;
        self.search_rev.bump();
        self.scroll_to_top();
        true
    }

    /// Jumps back to the first row after the derived rows changed shape.
    fn scroll_to_top(&mut self) {
        self.viewport.scroll_offset = 0.0;
        self.infinite.rewind();
    }

    // =========================================================================
    // Sort
    // =========================================================================

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Applies a header gesture to a column's sort.
    pub fn sort_by(&mut self, field: &str, gesture: SortGesture) -> bool {
        let next = self.sort.toggle(field, gesture, self.config.sort_policy);
        self.set_sort(next)
    }

    /// Replaces the sort state. Ignored if any key names an unknown or
    /// non-sortable column.
    pub fn set_sort(&mut self, sort: SortState) -> bool {
        for key in sort.keys() {
            if let Err(e) = self.registry.require_sortable(&key.field) {
                log::debug!("Ignoring sort: {}", e);
                return false;
            }
        }
        if sort == self.sort {
            return false;
        }
        self.sort = sort;
        self.sort_rev.bump();
        if self.config.server_side {
            self.events.push(GridEvent::SortChanged(self.sort.clone()));
        }
        true
    }

    pub fn clear_sort(&mut self) -> bool {
        self.set_sort(SortState::Unsorted)
    }

    /// Sorts by the visible column under a header x-coordinate.
    pub fn header_click_at(&mut self, x: f64, gesture: SortGesture) -> bool {
        let Some(field) = self.registry.column_at_x(x).map(|c| c.field.clone()) else {
            return false;
        };
        self.sort_by(&field, gesture)
    }

    /// Header text with the sort indicator.
    pub fn header_label(&self, field: &str) -> Option<String> {
        self.registry
            .get(field)
            .map(|column| header_label(column, &self.sort))
    }

    // =========================================================================
    // Viewport and infinite scroll
    // =========================================================================

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Viewport resized.
    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport.viewport_height = if height.is_finite() { height.max(0.0) } else { 0.0 };
    }

    /// Scrolls to an offset, clamped to the content.
    ///
    /// While mounted the scroll also feeds the infinite-scroll controller,
    /// which may arm a load request delivered by [`Grid::tick`].
    pub fn scroll_to(&mut self, offset: f64, now: Instant) -> ScrollDirection {
        let total = self.derived_len();
        let offset = self.viewport.clamped_offset(offset, total);
        self.viewport.scroll_offset = offset;
        if !self.is_mounted() {
            return ScrollDirection::Still;
        }
        let metrics = ScrollMetrics {
            scroll_offset: offset,
            viewport_height: self.viewport.viewport_height,
            content_height: self.viewport.content_height(total),
        };
        self.infinite.on_scroll(metrics, self.load_flags, now)
    }

    /// Brings a derived row into view. Returns `false` if the index is out
    /// of range.
    pub fn scroll_to_row(&mut self, index: usize) -> bool {
        let total = self.derived_len();
        if index >= total {
            return false;
        }
        let offset = self.viewport.offset_to_reveal(index);
        self.viewport.scroll_offset = self.viewport.clamped_offset(offset, total);
        true
    }

    pub fn content_height(&mut self) -> f64 {
        let total = self.derived_len();
        self.viewport.content_height(total)
    }

    /// The rendered window over the derived rows.
    pub fn visible_window(&mut self) -> VisibleWindow {
        let total = self.derived_len();
        if self.config.virtualize {
            self.viewport.window(total)
        } else {
            VisibleWindow::full(total)
        }
    }

    /// Rows of the rendered window with their derived positions.
    pub fn visible_rows(&mut self) -> Vec<(usize, &R)> {
        let window = self.visible_window();
        let indices = self.derived_indices();
        window
            .rows
            .filter_map(|pos| {
                let raw = *indices.get(pos)?;
                Some((pos, self.rows.get(raw)?))
            })
            .collect()
    }

    /// Derived row under a y-coordinate measured from the viewport top.
    pub fn row_at_y(&mut self, y: f64) -> Option<&R> {
        let indices = self.derived_indices();
        let pos = self.viewport.index_at(y, indices.len())?;
        self.rows.get(*indices.get(pos)?)
    }

    pub fn set_has_more(&mut self, has_more: bool) {
        self.load_flags.has_more = has_more;
    }

    /// Mirrors the loader's `loading` flag. Clearing it releases a pending
    /// request lock.
    pub fn set_loading(&mut self, loading: bool) {
        self.load_flags.loading = loading;
        self.infinite.loading_changed(loading);
    }

    pub fn load_state(&self) -> LoadState {
        self.infinite.state()
    }

    /// Fires a settled load request. Returns `true` and queues
    /// [`GridEvent::LoadMore`] when the host must fetch the next page.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.infinite.poll(self.load_flags, now) {
            return false;
        }
        self.events.push(GridEvent::LoadMore);
        true
    }

    /// When [`Grid::tick`] next needs to run, if a request is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.infinite.next_deadline()
    }

    // =========================================================================
    // Columns
    // =========================================================================

    pub fn set_column_width(&mut self, field: &str, width: f64) -> bool {
        match self.registry.set_width(field, width) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Ignoring width change: {}", e);
                false
            }
        }
    }

    pub fn set_column_visible(&mut self, field: &str, visible: bool) -> bool {
        match self.registry.set_visible(field, visible) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Ignoring visibility change: {}", e);
                false
            }
        }
    }

    /// Moves `dragged` into `target`'s slot.
    pub fn move_column(&mut self, dragged: &str, target: &str) -> bool {
        match self.registry.reorder(dragged, target) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Ignoring reorder: {}", e);
                false
            }
        }
    }

    pub fn sticky_offset(&self, field: &str) -> Option<f64> {
        self.registry.sticky_offset(field)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    pub fn begin_resize(&mut self, field: &str, x: f64) -> bool {
        self.drag.begin_resize(&self.registry, field, x)
    }

    pub fn resize_to(&mut self, x: f64) -> Option<f64> {
        self.drag.resize_to(&mut self.registry, x)
    }

    pub fn end_resize(&mut self) -> Option<String> {
        self.drag.end_resize()
    }

    pub fn begin_reorder(&mut self, field: &str) -> bool {
        self.drag.begin_reorder(&self.registry, field)
    }

    pub fn drag_over(&mut self, field: &str) {
        self.drag.drag_over(field);
    }

    pub fn drop_reorder(&mut self) -> bool {
        self.drag.drop_reorder(&mut self.registry)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    // =========================================================================
    // Inline edit
    // =========================================================================

    /// Enters edit mode on a cell. A different cell already in edit mode is
    /// committed first.
    pub fn begin_edit(&mut self, row_key: &str, field: &str) -> bool {
        let Some(current) = self.row_by_key(row_key).map(|r| r.value(field)) else {
            log::debug!("Ignoring edit on unknown row '{}'", row_key);
            return false;
        };
        match self.editor.begin(&self.registry, row_key, field, current) {
            Ok(previous) => {
                if let Some(edit) = previous {
                    self.apply_edit(edit);
                }
                true
            }
            Err(e) => {
                log::debug!("Ignoring edit: {}", e);
                false
            }
        }
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editor.active()
    }

    /// Replaces the scratch value with parsed editor input.
    pub fn update_edit(&mut self, input: &str) -> bool {
        self.editor.update_text(input).is_ok()
    }

    /// Commits the active edit, echoing the value into the local row and
    /// queueing [`GridEvent::CellEdit`].
    pub fn commit_edit(&mut self) -> bool {
        match self.editor.commit() {
            Ok(edit) => self.apply_edit(edit),
            Err(EditError::NoSession) => false,
            Err(e) => {
                log::warn!("Edit commit failed: {}", e);
                false
            }
        }
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.editor.cancel().is_some()
    }

    fn apply_edit(&mut self, edit: CellEdit) -> bool {
        let Some(position) = self.row_position(&edit.row_key) else {
            let err = EditError::UnknownRow {
                row_key: edit.row_key,
            };
            log::warn!("Dropping edit: {}", err);
            return false;
        };
        let row = &mut self.rows[position];
        let before = row.clone();
        row.set_value(&edit.field, edit.value.clone());
        self.rows_rev.bump();
        self.events.push(GridEvent::CellEdit {
            row: before,
            field: edit.field,
            value: edit.value,
        });
        true
    }

    // =========================================================================
    // Selection and clicks
    // =========================================================================

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection.mode()
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        if self.selection.set_mode(mode) {
            self.selection_changed();
        }
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selection.is_selected(&key.to_string())
    }

    /// Selected rows in source order.
    pub fn selected_rows(&self) -> Vec<R> {
        self.rows
            .iter()
            .filter(|r| self.selection.is_selected(&r.key()))
            .cloned()
            .collect()
    }

    pub fn toggle_selection(&mut self, key: &str) -> bool {
        if self.row_by_key(key).is_none() {
            return false;
        }
        let changed = self.selection.toggle(key.to_string());
        if changed {
            self.selection_changed();
        }
        changed
    }

    pub fn select_row(&mut self, key: &str) -> bool {
        if self.row_by_key(key).is_none() {
            return false;
        }
        let changed = self.selection.select(key.to_string());
        if changed {
            self.selection_changed();
        }
        changed
    }

    /// Selects from the anchor to `key` along the derived order.
    pub fn select_range(&mut self, key: &str, extend: bool) -> bool {
        let ordered: Vec<String> = self.derived_rows().iter().map(|r| r.key()).collect();
        let changed = self.selection.range_select(key.to_string(), &ordered, extend);
        if changed {
            self.selection_changed();
        }
        changed
    }

    /// Selects every derived row.
    pub fn select_all(&mut self) -> bool {
        let keys: Vec<String> = self.derived_rows().iter().map(|r| r.key()).collect();
        let changed = self.selection.select_all(&keys);
        if changed {
            self.selection_changed();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.selection_changed();
        }
        changed
    }

    fn selection_changed(&mut self) {
        let rows = self.selected_rows();
        self.events.push(GridEvent::RowSelect(rows));
    }

    /// Row clicked.
    pub fn click_row(&mut self, key: &str) -> bool {
        let Some(row) = self.row_by_key(key).cloned() else {
            return false;
        };
        self.events.push(GridEvent::RowClick(row));
        true
    }

    // =========================================================================
    // Display and export
    // =========================================================================

    /// Formatted content of a cell, if the column exists.
    pub fn cell_display(&self, row: &R, field: &str) -> Option<CellDisplay> {
        let column = self.registry.get(field)?;
        Some(format_cell(column, &row.value(field), &self.config))
    }

    /// Exports the filtered rows over the visible columns.
    pub fn export(
        &mut self,
        base_name: &str,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        let exporter = Exporter::new(self.config.delimiter)?;
        let indices = match self.config.export_order {
            ExportOrder::Filtered => self.filtered_indices(),
            ExportOrder::Sorted => self.derived_indices(),
        };
        let columns = self.registry.visible();
        exporter.export(
            base_name,
            format,
            &columns,
            indices.iter().filter_map(|&i| self.rows.get(i)),
        )
    }
}

impl Grid<Record> {
    /// Replaces the rows from a JSON array of objects. Anything other than an
    /// array yields an empty grid.
    pub fn set_rows_json(&mut self, value: &serde_json::Value, key_field: &str) {
        self.set_rows(rows_from_json(value, key_field));
    }
}

impl<R: GridRow> Drop for Grid<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}
