//! In-terminal file picker used by the "Add songs" action.

mod browser;

pub use browser::{Entry, FilePicker};
