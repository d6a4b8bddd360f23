//! Filter, search and sort state with their row predicates and comparators

mod filter;
mod search;
mod sort;

pub use filter::*;
pub use search::*;
pub use sort::*;
