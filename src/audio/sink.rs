//! `rodio` implementation of the audio backend.
//!
//! One `OutputStream` is opened for the lifetime of the backend; every
//! session is a fresh `Sink` connected to the stream's mixer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::debug;

use super::types::{AudioBackend, AudioError, Session};

pub struct RodioBackend {
    stream: OutputStream,
    volume: f32,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn open_default(volume: f32) -> Result<Self, AudioError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| AudioError::Output(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which tears through the TUI.
        stream.log_on_drop(false);
        Ok(Self { stream, volume })
    }
}

impl AudioBackend for RodioBackend {
    type Session = RodioSession;

    fn load(&mut self, path: &Path) -> Result<RodioSession, AudioError> {
        let file = File::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // VBR mp3 and friends often don't know their length up front; the tag
        // reader's audio properties are a good second opinion.
        let duration = source
            .total_duration()
            .or_else(|| tagged_duration(path))
            .filter(|d| !d.is_zero());

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();

        debug!(path = %path.display(), ?duration, "loaded session");
        Ok(RodioSession { sink, duration })
    }
}

fn tagged_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
}

pub struct RodioSession {
    sink: Sink,
    duration: Option<Duration>,
}

impl Session for RodioSession {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn seek(&mut self, to: Duration) -> Result<(), AudioError> {
        self.sink
            .try_seek(to)
            .map_err(|e| AudioError::Seek(e.to_string()))
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

impl Drop for RodioSession {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
