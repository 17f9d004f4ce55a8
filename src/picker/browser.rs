use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::PickerSettings;
use crate::library::{is_audio_file, is_hidden};

/// One row of the picker listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

/// Modal file browser answering "pick some audio files".
///
/// Lists the subdirectories and audio files of one directory at a time.
/// Files can be multi-selected across directories; confirming hands back
/// absolute paths in the order they were selected.
#[derive(Debug)]
pub struct FilePicker {
    dir: PathBuf,
    entries: Vec<Entry>,
    highlighted: usize,
    selected: Vec<PathBuf>,
    extensions: Vec<String>,
    include_hidden: bool,
    error: Option<String>,
}

impl FilePicker {
    pub fn open(start: &Path, settings: &PickerSettings) -> Self {
        let dir = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());
        let mut picker = Self {
            dir,
            entries: Vec::new(),
            highlighted: 0,
            selected: Vec::new(),
            extensions: settings.extensions.clone(),
            include_hidden: settings.include_hidden,
            error: None,
        };
        picker.reload();
        picker
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    #[cfg(test)]
    pub fn highlighted_entry(&self) -> Option<&Entry> {
        self.entries.get(self.highlighted)
    }

    pub fn selected(&self) -> &[PathBuf] {
        &self.selected
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selected.iter().any(|p| p == path)
    }

    /// Why the current directory could not be listed, if it couldn't.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn move_down(&mut self) {
        if self.highlighted + 1 < self.entries.len() {
            self.highlighted += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    pub fn move_top(&mut self) {
        self.highlighted = 0;
    }

    pub fn move_bottom(&mut self) {
        self.highlighted = self.entries.len().saturating_sub(1);
    }

    /// Toggle selection of the highlighted file. Directories are ignored.
    pub fn toggle(&mut self) {
        let Some(entry) = self.entries.get(self.highlighted) else {
            return;
        };
        if entry.is_dir {
            return;
        }
        match self.selected.iter().position(|p| p == &entry.path) {
            Some(pos) => {
                self.selected.remove(pos);
            }
            None => self.selected.push(entry.path.clone()),
        }
    }

    /// Select every file in the current directory, keeping earlier picks first.
    pub fn select_all(&mut self) {
        for entry in self.entries.iter().filter(|e| !e.is_dir) {
            if !self.selected.contains(&entry.path) {
                self.selected.push(entry.path.clone());
            }
        }
    }

    /// Open the highlighted directory, or confirm when a file is highlighted.
    pub fn enter(&mut self) -> Option<Vec<PathBuf>> {
        let entry = self.entries.get(self.highlighted)?.clone();
        if entry.is_dir {
            self.dir = entry.path;
            self.highlighted = 0;
            self.reload();
            None
        } else {
            Some(self.confirm())
        }
    }

    /// Go up one directory, highlighting the one we came from.
    pub fn parent(&mut self) {
        let Some(parent) = self.dir.parent().map(Path::to_path_buf) else {
            return;
        };
        let came_from = std::mem::replace(&mut self.dir, parent);
        self.reload();
        self.highlighted = self
            .entries
            .iter()
            .position(|e| e.path == came_from)
            .unwrap_or(0);
    }

    /// The picked files: the selection, or the highlighted file when nothing
    /// is selected.
    pub fn confirm(&mut self) -> Vec<PathBuf> {
        if !self.selected.is_empty() {
            return std::mem::take(&mut self.selected);
        }
        match self.entries.get(self.highlighted) {
            Some(entry) if !entry.is_dir => vec![entry.path.clone()],
            _ => Vec::new(),
        }
    }

    /// Dismiss the picker. Always the empty list.
    pub fn cancel(&mut self) -> Vec<PathBuf> {
        self.selected.clear();
        Vec::new()
    }

    fn reload(&mut self) {
        self.error = None;
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for item in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match item {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    self.error = Some(e.to_string());
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            if !self.include_hidden && is_hidden(path) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().is_dir() {
                dirs.push(Entry {
                    path: path.to_path_buf(),
                    name,
                    is_dir: true,
                });
            } else if is_audio_file(path, &self.extensions) {
                files.push(Entry {
                    path: path.to_path_buf(),
                    name,
                    is_dir: false,
                });
            }
        }

        dirs.sort_by_key(|e| e.name.to_lowercase());
        files.sort_by_key(|e| e.name.to_lowercase());
        dirs.extend(files);
        self.entries = dirs;
        if self.highlighted >= self.entries.len() {
            self.highlighted = self.entries.len().saturating_sub(1);
        }
    }
}
