//! Application module: exposes the UI state model used by the TUI and runtime.

mod model;

pub use model::*;
