//! Error types

mod column;
mod edit;
mod export;

pub use column::*;
pub use edit::*;
pub use export::*;
