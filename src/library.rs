//! Filesystem helpers shared by the picker and command-line seeding.

mod scan;

pub use scan::{expand_args, is_audio_file, is_hidden, scan};
