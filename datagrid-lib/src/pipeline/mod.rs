//! Derived-rows pipeline: filter → search → sort.
//!
//! Each stage is a pure function over row indices, memoized on the revisions
//! of exactly the state it reads. Changing the sort therefore reuses the
//! filtered and searched sets untouched.

mod cache;

pub use cache::*;

use std::sync::Arc;

use crate::columns::ColumnRegistry;
use crate::model::GridRow;
use crate::query::{
    FilterLogic, FilterSet, SearchQuery, SortState, filter_indices, search_indices, sort_indices,
};

/// Row indices produced by a stage, shared with callers without copying.
pub type RowIndices = Arc<Vec<usize>>;

/// Everything the pipeline reads, with the revision of each piece of state.
pub struct PipelineInputs<'a, R> {
    pub rows: &'a [R],
    pub rows_rev: Revision,
    pub registry: &'a ColumnRegistry,
    pub filters: &'a FilterSet,
    pub filters_rev: Revision,
    pub logic: FilterLogic,
    pub search: &'a SearchQuery,
    pub search_rev: Revision,
    pub sort: &'a SortState,
    pub sort_rev: Revision,
    /// Rows arrive already processed; every stage passes them through.
    pub server_side: bool,
}

type FilterDeps = (Revision, Revision, FilterLogic, bool);
type SearchDeps = (FilterDeps, Revision);
type SortDeps = (SearchDeps, Revision);

/// Stage run counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStats {
    pub filter_runs: u64,
    pub search_runs: u64,
    pub sort_runs: u64,
}

/// Memoized filter → search → sort composition.
#[derive(Debug, Default)]
pub struct DerivedRows {
    filtered: Memo<FilterDeps, RowIndices>,
    searched: Memo<SearchDeps, RowIndices>,
    sorted: Memo<SortDeps, RowIndices>,
}

impl DerivedRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows passing the active filters, in source order.
    pub fn filtered<R: GridRow>(&mut self, inputs: &PipelineInputs<'_, R>) -> RowIndices {
        let deps = filter_deps(inputs);
        self.filtered.get_or_compute(deps, || {
            log::trace!("Recomputing filter stage over {} rows", inputs.rows.len());
            if inputs.server_side {
                return Arc::new((0..inputs.rows.len()).collect());
            }
            Arc::new(filter_indices(
                inputs.rows,
                inputs.registry,
                inputs.filters,
                inputs.logic,
            ))
        })
    }

    /// Filtered rows that also match the search query, in source order.
    pub fn searched<R: GridRow>(&mut self, inputs: &PipelineInputs<'_, R>) -> RowIndices {
        let filtered = self.filtered(inputs);
        let deps = (filter_deps(inputs), inputs.search_rev);
        self.searched.get_or_compute(deps, || {
            log::trace!("Recomputing search stage over {} rows", filtered.len());
            if inputs.server_side || inputs.search.is_empty() {
                return filtered;
            }
            Arc::new(search_indices(
                inputs.rows,
                &filtered,
                inputs.registry,
                inputs.search,
            ))
        })
    }

    /// Final derived order: searched rows sorted by the sort state.
    pub fn sorted<R: GridRow>(&mut self, inputs: &PipelineInputs<'_, R>) -> RowIndices {
        let searched = self.searched(inputs);
        let deps = ((filter_deps(inputs), inputs.search_rev), inputs.sort_rev);
        self.sorted.get_or_compute(deps, || {
            log::trace!("Recomputing sort stage over {} rows", searched.len());
            if inputs.server_side || !inputs.sort.is_sorted() {
                return searched;
            }
            let mut indices = searched.as_ref().clone();
            sort_indices(inputs.rows, &mut indices, inputs.sort, inputs.registry);
            Arc::new(indices)
        })
    }

    /// How many times each stage has run.
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            filter_runs: self.filtered.computations(),
            search_runs: self.searched.computations(),
            sort_runs: self.sorted.computations(),
        }
    }

    /// Drops every cached stage.
    pub fn invalidate(&mut self) {
        self.filtered.invalidate();
        self.searched.invalidate();
        self.sorted.invalidate();
    }
}

fn filter_deps<R>(inputs: &PipelineInputs<'_, R>) -> FilterDeps {
    (
        inputs.rows_rev,
        inputs.filters_rev,
        inputs.logic,
        inputs.server_side,
    )
}
