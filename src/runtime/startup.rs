use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config;
use crate::library::expand_args;

/// Tracks named on the command line, expanded and made absolute.
pub fn initial_tracks<I>(args: I, cwd: &Path, settings: &config::Settings) -> Vec<PathBuf>
where
    I: IntoIterator<Item = OsString>,
{
    let tracks = expand_args(args, cwd, &settings.library, &settings.picker.extensions);
    if !tracks.is_empty() {
        info!(count = tracks.len(), "seeded queue from command line");
    }
    tracks
}

/// Directory the picker opens in.
pub fn picker_start_dir(settings: &config::Settings, cwd: &Path) -> PathBuf {
    settings
        .picker
        .start_dir
        .clone()
        .unwrap_or_else(|| cwd.to_path_buf())
}
