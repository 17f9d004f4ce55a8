//! Track metadata: tag parsing with `lofty` and the background loader that
//! feeds the now-playing view.

mod loader;
mod tags;

pub use loader::{MetadataLoader, MetadataReply};
pub use tags::*;
