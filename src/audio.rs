//! Audio module: the backend seam driven by the queue controller and its
//! `rodio` implementation.

mod sink;
mod types;

#[cfg(test)]
pub mod fake;

pub use sink::{RodioBackend, RodioSession};
pub use types::*;
