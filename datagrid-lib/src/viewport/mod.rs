//! Viewport virtualization.
//!
//! Maps a scroll offset over fixed-height rows to the window of row indices
//! that must be materialized, plus the spacer heights standing in for the
//! rows above and below it.

mod infinite;

pub use infinite::*;

use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

/// Scroll position and geometry of the row viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    /// Constant height of every row.
    pub row_height: f64,
    /// Extra rows rendered above and below the visible range.
    pub buffer: usize,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height: 0.0,
            row_height: 40.0,
            buffer: 5,
        }
    }
}

/// The materialized slice of the derived rows.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleWindow {
    /// First row intersecting the viewport.
    pub first_visible: usize,
    /// Rows needed to cover the viewport height.
    pub visible_count: usize,
    /// Rendered rows, buffer included.
    pub rows: Range<usize>,
    /// Height standing in for the rows before `rows`.
    pub top_spacer: f64,
    /// Height standing in for the rows after `rows`.
    pub bottom_spacer: f64,
}

impl VisibleWindow {
    fn empty() -> Self {
        Self {
            first_visible: 0,
            visible_count: 0,
            rows: 0..0,
            top_spacer: 0.0,
            bottom_spacer: 0.0,
        }
    }

    /// Window covering every row, used when virtualization is off.
    pub fn full(total_rows: usize) -> Self {
        Self {
            first_visible: 0,
            visible_count: total_rows,
            rows: 0..total_rows,
            top_spacer: 0.0,
            bottom_spacer: 0.0,
        }
    }

    /// First rendered index.
    pub fn start_index(&self) -> usize {
        self.rows.start
    }

    /// Last rendered index (inclusive). `None` when nothing is rendered.
    pub fn end_index(&self) -> Option<usize> {
        if self.rows.is_empty() {
            None
        } else {
            Some(self.rows.end - 1)
        }
    }

    /// Number of rendered rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ViewportState {
    pub fn new(row_height: f64, viewport_height: f64, buffer: usize) -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height,
            row_height,
            buffer,
        }
    }

    fn has_row_height(&self) -> bool {
        self.row_height.is_finite() && self.row_height > 0.0
    }

    /// Computes the rendered window over `total_rows` rows.
    ///
    /// `start..=end` always covers the fully visible range, clamped to the
    /// row set, and `top_spacer + len * row_height + bottom_spacer` equals
    /// `total_rows * row_height`.
    pub fn window(&self, total_rows: usize) -> VisibleWindow {
        if total_rows == 0 || !self.has_row_height() {
            return VisibleWindow::empty();
        }
        let first_visible = (self.scroll_offset.max(0.0) / self.row_height).floor() as usize;
        let visible_count = (self.viewport_height.max(0.0) / self.row_height).ceil() as usize;

        let last = total_rows - 1;
        let end = first_visible
            .saturating_add(visible_count)
            .saturating_add(self.buffer)
            .min(last);
        let start = first_visible.saturating_sub(self.buffer).min(end);

        VisibleWindow {
            first_visible,
            visible_count,
            rows: start..end + 1,
            top_spacer: start as f64 * self.row_height,
            bottom_spacer: (last - end) as f64 * self.row_height,
        }
    }

    /// Total scrollable height of `total_rows` rows.
    pub fn content_height(&self, total_rows: usize) -> f64 {
        total_rows as f64 * self.row_height
    }

    /// Largest meaningful scroll offset.
    pub fn max_scroll_offset(&self, total_rows: usize) -> f64 {
        (self.content_height(total_rows) - self.viewport_height).max(0.0)
    }

    /// Scroll offset clamped to `[0, max_scroll_offset]`.
    pub fn clamped_offset(&self, offset: f64, total_rows: usize) -> f64 {
        if !offset.is_finite() {
            return 0.0;
        }
        offset.clamp(0.0, self.max_scroll_offset(total_rows))
    }

    /// Distance from the viewport's bottom edge to the end of the content.
    pub fn remaining_distance(&self, total_rows: usize) -> f64 {
        (self.content_height(total_rows) - self.scroll_offset - self.viewport_height).max(0.0)
    }

    /// Offset that brings row `index` fully into view with minimal movement.
    pub fn offset_to_reveal(&self, index: usize) -> f64 {
        let row_top = index as f64 * self.row_height;
        let row_bottom = row_top + self.row_height;
        if row_top < self.scroll_offset {
            row_top
        } else if row_bottom > self.scroll_offset + self.viewport_height {
            (row_bottom - self.viewport_height).max(0.0)
        } else {
            self.scroll_offset
        }
    }

    /// Row index under a y-coordinate measured from the viewport top.
    pub fn index_at(&self, y: f64, total_rows: usize) -> Option<usize> {
        if y < 0.0 || !self.has_row_height() {
            return None;
        }
        let index = ((self.scroll_offset + y) / self.row_height).floor() as usize;
        (index < total_rows).then_some(index)
    }
}
