//! Virtualized data-grid engine
//!
//! The headless state engine behind a table component. It owns the column
//! registry, runs the filter → search → sort pipeline over the current row set,
//! decides which window of rows is materialized for a fixed-height viewport,
//! requests further pages as the user nears the bottom, and handles column
//! drags, inline edits and CSV export.
//!
//! Rendering is left to the host. The host feeds pointer, scroll and keyboard
//! input into a [`Grid`] and drains the resulting [`GridEvent`]s.

pub mod columns;
pub mod config;
pub mod edit;
pub mod error;
pub mod events;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod render;
pub mod selection;
pub mod viewport;

mod grid;

pub use config::GridConfig;
pub use events::GridEvent;
pub use grid::*;
