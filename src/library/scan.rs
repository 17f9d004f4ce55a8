use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

/// Return true when `path` has one of `extensions` (case-insensitive, dot optional).
pub fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.'))
                .any(|e| !e.is_empty() && e.eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Collect audio files under `dir`, sorted case-insensitively by path.
pub fn scan(dir: &Path, settings: &LibrarySettings, extensions: &[String]) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut tracks: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_audio_file(path, extensions))
        .collect();

    tracks.sort_by_key(|p| p.to_string_lossy().to_lowercase());
    tracks
}

/// Turn command-line arguments into queue entries.
///
/// Directories are scanned, audio files are taken as-is and anything else is
/// skipped with a warning. Relative paths are resolved against `cwd`.
pub fn expand_args<I, S>(
    args: I,
    cwd: &Path,
    settings: &LibrarySettings,
    extensions: &[String],
) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
{
    let mut out = Vec::new();
    for arg in args {
        let path = cwd.join(arg.as_ref());
        if path.is_dir() {
            out.extend(scan(&path, settings, extensions));
        } else if path.is_file() && is_audio_file(&path, extensions) {
            out.push(path);
        } else {
            warn!(path = %path.display(), "skipping argument: not a directory or audio file");
        }
    }
    out
}
