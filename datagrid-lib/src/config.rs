//! Grid configuration

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::export::ExportOrder;
use crate::query::{FilterLogic, SortPolicy};
use crate::selection::SelectionMode;

/// Configuration for a [`Grid`](crate::Grid).
///
/// Every field has a default, so a partial JSON object deserializes cleanly.
///
/// # Example
///
/// ```
/// use datagrid_lib::GridConfig;
///
/// let config = GridConfig::default()
///     .with_row_height(32.0)
///     .with_buffer(10)
///     .with_server_side(true);
/// assert_eq!(config.row_height, 32.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Constant row height in pixels.
    ///
    /// Default: 40
    pub row_height: f64,

    /// Rows rendered above and below the visible range.
    ///
    /// Default: 5
    pub buffer: usize,

    /// Render only the visible window instead of every derived row.
    ///
    /// Default: true
    pub virtualize: bool,

    /// Lower bound for column widths.
    ///
    /// Default: 50
    pub min_column_width: f64,

    /// Distance from the bottom, in pixels, that triggers a load request.
    ///
    /// Default: 200
    pub load_threshold: f64,

    /// Quiet period before a load request fires, in milliseconds.
    ///
    /// Default: 100
    pub load_debounce_ms: u64,

    /// How active filter predicates combine.
    ///
    /// Default: AND
    pub filter_logic: FilterLogic,

    /// Rows arrive already filtered and sorted by an external source.
    ///
    /// Default: false
    pub server_side: bool,

    pub selection_mode: SelectionMode,

    /// Which derived rows an export writes.
    ///
    /// Default: filtered (unsorted)
    pub export_order: ExportOrder,

    pub sort_policy: SortPolicy,

    /// Field separator for exports.
    ///
    /// Default: ','
    pub delimiter: char,

    /// Prefix for currency cells.
    ///
    /// Default: "$"
    pub currency_symbol: String,

    /// `chrono` format string for date cells.
    ///
    /// Default: "%Y-%m-%d"
    pub date_format: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height: 40.0,
            buffer: 5,
            virtualize: true,
            min_column_width: 50.0,
            load_threshold: 200.0,
            load_debounce_ms: 100,
            filter_logic: FilterLogic::And,
            server_side: false,
            selection_mode: SelectionMode::None,
            export_order: ExportOrder::Filtered,
            sort_policy: SortPolicy::ResetToSingle,
            delimiter: ',',
            currency_symbol: "$".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl GridConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load debounce as a [`Duration`].
    pub fn load_debounce(&self) -> Duration {
        Duration::from_millis(self.load_debounce_ms)
    }

    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_virtualize(mut self, virtualize: bool) -> Self {
        self.virtualize = virtualize;
        self
    }

    pub fn with_min_column_width(mut self, min_column_width: f64) -> Self {
        self.min_column_width = min_column_width;
        self
    }

    pub fn with_load_threshold(mut self, threshold: f64) -> Self {
        self.load_threshold = threshold;
        self
    }

    /// Sets the load debounce. Sub-millisecond precision is dropped.
    pub fn with_load_debounce(mut self, debounce: Duration) -> Self {
        self.load_debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_filter_logic(mut self, logic: FilterLogic) -> Self {
        self.filter_logic = logic;
        self
    }

    pub fn with_server_side(mut self, server_side: bool) -> Self {
        self.server_side = server_side;
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn with_export_order(mut self, order: ExportOrder) -> Self {
        self.export_order = order;
        self
    }

    pub fn with_sort_policy(mut self, policy: SortPolicy) -> Self {
        self.sort_policy = policy;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }
}
