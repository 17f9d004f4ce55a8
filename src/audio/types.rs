//! Audio-related small types and the backend seam.
//!
//! This module defines the playback state, the error type and the two
//! traits the queue controller drives: an `AudioBackend` that loads files
//! and the `Session` it hands back for a single track.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// The playback state of the current session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    /// Label for the play/pause control.
    pub fn button_label(self) -> &'static str {
        match self {
            Self::Playing => "Pause",
            Self::Stopped | Self::Paused => "Play",
        }
    }
}

/// Errors raised while opening, decoding or seeking a track.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file was opened but could not be decoded.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    /// The session rejected a seek.
    #[error("seek failed: {0}")]
    Seek(String),
    /// No usable output device.
    #[error("audio output unavailable: {0}")]
    Output(String),
}

/// A live binding between one track and the audio output.
///
/// Sessions start paused. Dropping a session releases it.
pub trait Session {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Move the playhead to `to`.
    fn seek(&mut self, to: Duration) -> Result<(), AudioError>;
    /// Total length when the decoder or tags report one.
    fn duration(&self) -> Option<Duration>;
    fn position(&self) -> Duration;
    /// True once the track has played out to its end.
    fn is_finished(&self) -> bool;
}

/// Loads tracks into playable sessions.
pub trait AudioBackend {
    type Session: Session;

    /// Open `path` and return a paused session for it.
    fn load(&mut self, path: &Path) -> Result<Self::Session, AudioError>;
}
