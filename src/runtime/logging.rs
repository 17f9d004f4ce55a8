use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_path};

/// Where log lines go: `log.file`, else the XDG state directory.
pub fn log_path(settings: &LogSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(default_log_path)
}

/// `ENCORE_LOG` wins over `log.level`; a bad directive falls back to `info`.
pub fn build_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_env("ENCORE_LOG")
        .ok()
        .or_else(|| EnvFilter::try_new(&settings.level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber writing to the log file.
///
/// The terminal belongs to the UI, so nothing is ever written to stdout or
/// stderr once this returns.
pub fn init(settings: &LogSettings) -> io::Result<PathBuf> {
    let path = log_path(settings)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no log directory (HOME unset)"))?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(settings))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(path)
}
