//! Column registry and the pointer-driven resize/reorder controller

mod drag;
mod registry;

pub use drag::*;
pub use registry::*;
